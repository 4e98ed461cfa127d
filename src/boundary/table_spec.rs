use super::ControlCode;
use crate::base::parse_leg_number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the meaning of the time column of a table
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum TimeColumn {
    /// Absolute time
    Time,

    /// Time increment (accumulated row after row)
    Dt,
}

/// Defines the quantity prescribed by the rows of a table
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum TableKind {
    StrainRate,
    Strain,
    StressRate,
    Stress,
    DeformationGradient,
    ElectricField,
    Displacement,
    VolumetricStrain,
}

impl TableKind {
    /// Returns the kind given its name in the `using` line
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "strain rate" => Some(TableKind::StrainRate),
            "strain" => Some(TableKind::Strain),
            "stress rate" => Some(TableKind::StressRate),
            "stress" => Some(TableKind::Stress),
            "deformation gradient" => Some(TableKind::DeformationGradient),
            "electric field" => Some(TableKind::ElectricField),
            "displacement" => Some(TableKind::Displacement),
            "vstrain" => Some(TableKind::VolumetricStrain),
            _ => None,
        }
    }

    /// Returns the number of values in each row (excluding the time)
    pub fn width(self) -> usize {
        match self {
            TableKind::StrainRate => 6,
            TableKind::Strain => 6,
            TableKind::StressRate => 6,
            TableKind::Stress => 6,
            TableKind::DeformationGradient => 9,
            TableKind::ElectricField => 3,
            TableKind::Displacement => 3,
            TableKind::VolumetricStrain => 1,
        }
    }

    /// Returns the control code applied to every value
    pub fn code(self) -> ControlCode {
        match self {
            TableKind::StrainRate => ControlCode::StrainRate,
            TableKind::Strain => ControlCode::Strain,
            TableKind::StressRate => ControlCode::StressRate,
            TableKind::Stress => ControlCode::Stress,
            TableKind::DeformationGradient => ControlCode::DeformationGradient,
            TableKind::ElectricField => ControlCode::ElectricField,
            TableKind::Displacement => ControlCode::Displacement,
            TableKind::VolumetricStrain => ControlCode::Strain,
        }
    }

    /// Returns the control codes of one row
    pub fn codes(self) -> Vec<ControlCode> {
        vec![self.code(); self.width()]
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::StrainRate => "strain rate",
            TableKind::Strain => "strain",
            TableKind::StressRate => "stress rate",
            TableKind::Stress => "stress",
            TableKind::DeformationGradient => "deformation gradient",
            TableKind::ElectricField => "electric field",
            TableKind::Displacement => "displacement",
            TableKind::VolumetricStrain => "vstrain",
        };
        write!(f, "{}", name)
    }
}

/// Holds the header of a tabular legs block
///
/// The header reads
///
/// ```text
/// using <time|dt> <kind> [from columns <spec>]
/// ```
///
/// where `<spec>` lists 1-indexed columns: explicit indices optionally followed by
/// one inclusive range written as `a:b` or `a-b`. For example, `1,5-10` selects the
/// zero-indexed columns `[0, 4, 5, 6, 7, 8, 9]`. The first selected column holds the time.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TableSpec {
    /// Meaning of the time column
    pub time_column: TimeColumn,

    /// Quantity prescribed by the rows
    pub kind: TableKind,

    /// Zero-indexed columns (time first)
    pub columns: Vec<usize>,
}

impl TableSpec {
    /// Parses the first record of the legs block
    ///
    /// Returns `Ok(None)` if the record does not start with `using` (explicit form).
    pub fn parse(tokens: &[String]) -> Result<Option<Self>, String> {
        match tokens.first() {
            Some(first) if first.to_lowercase().contains("using") => (),
            _ => return Ok(None),
        }
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let time_column = match tokens.get(1).map(|t| t.as_str()) {
            Some("time") => TimeColumn::Time,
            Some("dt") => TimeColumn::Dt,
            other => {
                return Err(format!(
                    "requested bad time type {} in '{}', expected one of [time, dt]",
                    other.unwrap_or(""),
                    tokens.join(" ")
                ))
            }
        };

        let keywords: Vec<usize> = (2..tokens.len())
            .filter(|&i| tokens[i].contains("from") || tokens[i].contains("column"))
            .collect();

        if keywords.is_empty() {
            let kind = parse_kind(&tokens[2..])?;
            let columns = (0..=kind.width()).collect();
            return Ok(Some(TableSpec {
                time_column,
                kind,
                columns,
            }));
        }
        if keywords.len() != 2 {
            return Err(format!(
                "expected {} <kind> from columns ..., got '{}'",
                tokens[1],
                tokens.join(" ")
            ));
        }

        let kind = parse_kind(&tokens[2..keywords[0]])?;
        let spec = tokens[keywords[1] + 1..].join(" ");
        let columns = parse_columns(&spec).map_err(|e| format!("{} in '{}'", e, tokens.join(" ")))?;
        let expected = kind.width() + 1;
        if columns.len() > expected {
            return Err(format!("too many columns specified for {}; expected {}", kind, expected));
        }
        if columns.len() < expected {
            return Err(format!("too few columns specified for {}; expected {}", kind, expected));
        }
        Ok(Some(TableSpec {
            time_column,
            kind,
            columns,
        }))
    }

    /// Extracts the time and the values from one row of the table
    pub fn extract(&self, row: &[String]) -> Result<(f64, Vec<f64>), String> {
        let mut selected = Vec::with_capacity(self.columns.len());
        for &col in &self.columns {
            let token = row
                .get(col)
                .ok_or_else(|| format!("row has {} columns but column {} was requested", row.len(), col + 1))?;
            selected.push(parse_leg_number(token)?);
        }
        let values = selected.split_off(1);
        Ok((selected[0], values))
    }
}

fn parse_kind(words: &[String]) -> Result<TableKind, String> {
    let name = words.join(" ");
    TableKind::from_name(&name).ok_or_else(|| format!("requested bad control type '{}'", name))
}

/// Parses a column specification such as `1, 2:7` into zero-indexed columns
fn parse_columns(spec: &str) -> Result<Vec<usize>, String> {
    // "1 - 6" and "1 : 6" are the same as "1:6"
    let spec = spec.replace('-', ":");
    let spec = spec.split(':').map(|s| s.trim()).collect::<Vec<_>>().join(":");
    let items: Vec<&str> = spec.split_whitespace().collect();
    if items.is_empty() {
        return Err("no columns specified".to_string());
    }

    let n_ranges = items.iter().filter(|s| s.contains(':')).count();
    if n_ranges > 1 || spec.matches(':').count() > 1 {
        return Err("only one column range supported".to_string());
    }
    if n_ranges == 1 && !items[items.len() - 1].contains(':') {
        return Err("bad column range specifier".to_string());
    }
    if items.len() == 1 && n_ranges == 0 {
        return Err("not enough columns specified".to_string());
    }

    let index = |s: &str| -> Result<usize, String> {
        match s.parse::<usize>() {
            Ok(i) if i >= 1 => Ok(i - 1),
            _ => Err(format!("bad column index '{}'", s)),
        }
    };

    let mut columns = Vec::new();
    for item in &items {
        match item.split_once(':') {
            Some((a, b)) => {
                let (first, last) = (index(a)?, index(b)?);
                if last < first {
                    return Err(format!("bad column range '{}'", item));
                }
                columns.extend(first..=last);
            }
            None => columns.push(index(item)?),
        }
    }
    Ok(columns)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
