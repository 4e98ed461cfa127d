use super::{normalize_name, ParameterDef, ParameterTable};
use crate::base::{parse_number, Diagnostics, Error, Result};
use russell_lab::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Holds named material parameterizations (label → parameter name → value)
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MaterialDatabase {
    pub materials: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MaterialDatabase {
    /// Reads a database from a JSON string
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a database from a JSON file
    pub fn read_json<P>(full_path: &P) -> Result<Self>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path)?;
        let buffered = BufReader::new(input);
        Ok(serde_json::from_reader(buffered)?)
    }

    /// Returns the (name, value) pairs of a material (label is case-insensitive)
    pub fn parameterization(&self, label: &str) -> Option<Vec<(String, f64)>> {
        let key = normalize_name(label);
        self.materials
            .iter()
            .find(|(l, _)| normalize_name(l) == key)
            .map(|(_, params)| params.iter().map(|(n, v)| (n.clone(), *v)).collect())
    }

    /// Returns the labels of all materials
    pub fn labels(&self) -> Vec<&str> {
        self.materials.keys().map(|k| k.as_str()).collect()
    }
}

/// Holds the data shared by all constitutive models
#[derive(Debug)]
pub struct ModelBase {
    /// Canonical name of the model
    pub name: String,

    /// Registered parameters
    pub parameters: ParameterTable,

    /// Parameters as given by the user (overlaid on the defaults)
    pub ui0: Vec<f64>,

    /// Parameters as checked (and possibly adjusted) by the model
    pub ui: Vec<f64>,

    /// Derived constants
    pub dc: Vec<f64>,

    /// Bulk modulus K
    pub bulk_modulus: f64,

    /// Shear modulus G
    pub shear_modulus: f64,

    /// Initial Jacobian (6×6)
    pub j0: Option<Matrix>,

    /// Parameter (name, value) pairs read from the user input
    pub user_input: Vec<(String, f64)>,

    /// Material database used by the `material` and `matlabel` shortcuts
    pub database: Option<MaterialDatabase>,

    /// Indicates that the model responds to the electric field
    pub electric_field_model: bool,

    /// Initial density
    pub initial_density: f64,

    /// Errors and warnings found while setting up
    pub diagnostics: Diagnostics,
}

impl ModelBase {
    /// Allocates a new instance
    pub fn new(name: &str) -> Self {
        ModelBase {
            name: name.to_string(),
            parameters: ParameterTable::new(),
            ui0: Vec::new(),
            ui: Vec::new(),
            dc: Vec::new(),
            bulk_modulus: 0.0,
            shear_modulus: 0.0,
            j0: None,
            user_input: Vec::new(),
            database: None,
            electric_field_model: false,
            initial_density: 1.0,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Registers a parameter
    pub fn register_parameter(&mut self, def: ParameterDef) -> Result<()> {
        self.parameters.register(def)
    }

    /// Reads the user parameters
    ///
    /// Each line holds `name value`, where the name may have several words (joined by
    /// underscores) and the separators `=`, `:` and `,` are accepted. The lines
    /// `material <label>` and `matlabel <label>` load all parameters of the labeled
    /// material from the database.
    pub fn parse_user_params(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::parse(format!("no parameters found for {}", self.name)));
        }
        let mut diag = Diagnostics::new();
        for line in text.lines() {
            let line = line.replace(['=', ':', ','], " ");
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            // material shortcuts
            let first = tokens[0].to_lowercase();
            if first == "material" || first == "matlabel" {
                let label = tokens[1..].join(" ");
                if label.is_empty() {
                    return Err(Error::parse("empty material label encountered"));
                }
                let database = self.database.as_ref().ok_or_else(|| {
                    Error::parse(format!(
                        "requested material {} but {} does not provide a material database",
                        label, self.name
                    ))
                })?;
                let pairs = database.parameterization(&label).ok_or_else(|| {
                    Error::parse(format!(
                        "material {} not found in database; available materials are: {}",
                        label,
                        database.labels().join(", ")
                    ))
                })?;
                debug!("{}: loaded material {}", self.name, label);
                for (name, value) in pairs {
                    self.user_input.push((name.to_uppercase(), value));
                }
                continue;
            }

            let (last, rest) = match tokens.split_last() {
                Some(split) => split,
                None => continue,
            };
            if rest.is_empty() {
                diag.error(Error::parse(format!("no value for parameter '{}' found", last)));
                continue;
            }
            let name = rest.join("_");
            match parse_number(last) {
                Some(value) => self.user_input.push((name.to_uppercase(), value)),
                None => diag.error(Error::parse(format!(
                    "could not convert {} for parameter {} to float",
                    last, name
                ))),
            }
        }
        if diag.error_count() > 0 {
            warn!("{}: stopping due to previous errors", self.name);
        }
        diag.finish()
    }

    /// Fills `ui0` and `ui` with the defaults and overlays the user parameters
    pub fn parse_parameters(&mut self) {
        let nprop = self.parameters.nprop();
        self.ui0 = vec![0.0; nprop];
        for param in self.parameters.sorted() {
            self.ui0[param.index] = param.default;
        }
        let mut ignored = Vec::new();
        let mut not_parseable = Vec::new();
        for (name, value) in &self.user_input {
            if name.eq_ignore_ascii_case("units") {
                continue;
            }
            match self.parameters.find(name) {
                Some(param) if param.parseable => self.ui0[param.index] = *value,
                Some(_) => not_parseable.push(name.clone()),
                None => ignored.push(name.clone()),
            }
        }
        if !ignored.is_empty() {
            self.diagnostics
                .warn(&format!("ignoring unregistered parameters: {}", ignored.join(", ")));
        }
        if !not_parseable.is_empty() {
            self.diagnostics
                .warn(&format!("ignoring unparseable parameters: {}", not_parseable.join(", ")));
        }
        self.ui = self.ui0.clone();
    }

    /// Returns the value of a parameter (from `ui`) given its name or alias
    pub fn param(&self, name: &str) -> Option<f64> {
        self.parameters.index_of(name).and_then(|i| self.ui.get(i).copied())
    }

    /// Returns the (name, initial value, adjusted value) triplets sorted by index
    pub fn parameter_values(&self) -> Vec<(String, f64, f64)> {
        self.parameters
            .sorted()
            .iter()
            .map(|p| {
                let initial = self.ui0.get(p.index).copied().unwrap_or(p.default);
                let adjusted = self.ui.get(p.index).copied().unwrap_or(initial);
                (p.full_name.clone(), initial, adjusted)
            })
            .collect()
    }

    /// Computes the isotropic initial Jacobian from the bulk and shear moduli
    pub fn isotropic_jacobian(&self) -> Matrix {
        let threek = 3.0 * self.bulk_modulus;
        let twog = 2.0 * self.shear_modulus;
        let nu = (threek - twog) / (2.0 * threek + twog);
        let c1 = (1.0 - nu) / (1.0 + nu);
        let c2 = nu / (1.0 + nu);
        let mut j0 = Matrix::new(6, 6);
        for i in 0..3 {
            for j in 0..3 {
                j0.set(i, j, if i == j { threek * c1 } else { threek * c2 });
            }
        }
        for i in 3..6 {
            j0.set(i, i, twog);
        }
        j0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{MaterialDatabase, ModelBase};
    use crate::base::Error;
    use crate::material::ParameterDef;
    use russell_lab::approx_eq;

    fn sample_base() -> ModelBase {
        let mut base = ModelBase::new("elastic");
        base.register_parameter(ParameterDef::new("K", 0).aliases(&["BKMOD"]).units("PRESSURE_UNITS"))
            .unwrap();
        base.register_parameter(ParameterDef::new("G", 1).aliases(&["SHMOD"]).units("PRESSURE_UNITS"))
            .unwrap();
        base.register_parameter(ParameterDef::new("A1", 2).default(3.0).parseable(false))
            .unwrap();
        base
    }

    #[test]
    fn parse_user_params_works() {
        let mut base = sample_base();
        base.parse_user_params("K = 1.0E+10\nshmod: 4.0+100\n\n")
            .unwrap();
        assert_eq!(base.user_input.len(), 2);
        base.parse_parameters();
        assert_eq!(base.ui0, &[1.0e10, 4.0e100, 3.0]);
        assert_eq!(base.param("bkmod"), Some(1.0e10));
    }

    #[test]
    fn parse_user_params_joins_names() {
        let mut base = sample_base();
        base.parse_user_params("yield stress 2.5\nA1 7").unwrap();
        assert_eq!(base.user_input[0], ("YIELD_STRESS".to_string(), 2.5));
        base.parse_parameters();
        assert_eq!(base.ui0, &[0.0, 0.0, 3.0]);
        assert_eq!(base.diagnostics.warning_count(), 2);
    }

    #[test]
    fn parse_user_params_captures_errors() {
        let mut base = sample_base();
        assert!(matches!(base.parse_user_params("  "), Err(Error::Parse(_))));
        assert!(matches!(base.parse_user_params("K abc"), Err(Error::Parse(_))));
        assert!(matches!(
            base.parse_user_params("K abc\n2.0\nG 1"),
            Err(Error::Multiple(all)) if all.len() == 2
        ));
        assert!(base.parse_user_params("material steel").is_err());
    }

    #[test]
    fn material_database_works() {
        let mut base = sample_base();
        base.database = Some(
            MaterialDatabase::from_json(r#"{"materials": {"Soft Rock": {"K": 2.0, "G": 1.0}}}"#).unwrap(),
        );
        base.parse_user_params("matlabel soft rock").unwrap();
        base.parse_parameters();
        assert_eq!(base.ui0, &[2.0, 1.0, 3.0]);
        assert!(base.parse_user_params("material granite").is_err());
    }

    #[test]
    fn isotropic_jacobian_works() {
        let mut base = sample_base();
        base.bulk_modulus = 10.0;
        base.shear_modulus = 4.0;
        let j0 = base.isotropic_jacobian();
        let lambda = 10.0 - 2.0 * 4.0 / 3.0;
        approx_eq(j0.get(0, 0), lambda + 2.0 * 4.0, 1e-13);
        approx_eq(j0.get(0, 1), lambda, 1e-13);
        approx_eq(j0.get(2, 1), lambda, 1e-13);
        approx_eq(j0.get(3, 3), 8.0, 1e-15);
        approx_eq(j0.get(3, 4), 0.0, 1e-15);
        approx_eq(j0.get(0, 3), 0.0, 1e-15);
    }
}
