use super::{parse_control_codes, BoundaryControl, ControlCode, Leg, TableSpec, TimeColumn, N_EFIELD_SLOTS, N_LEG_SLOTS};
use crate::base::{determinant, has_rotation, parse_leg_number, tensor_to_matrix, Diagnostics, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tolerance on the sub-diagonal entries of F relative to the diagonal
const ROTATION_TOLERANCE: f64 = 1e-12;

/// Largest number of steps in one leg (after scaling by stepstar)
const MAX_STEPS: f64 = 1.0e9;

/// Smallest admissible end time of the first leg
const FIRST_LEG_MIN_TIME: f64 = -0.001;

/// Number of strain or stress components (symmetric tensor)
const N_SYM: usize = 6;

/// Holds the boundary control directives and the normalized legs
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Boundary {
    /// Boundary control directives (kappa is reset to zero under stress control)
    pub control: BoundaryControl,

    /// Legs in the order of the legs block
    pub legs: Vec<Leg>,
}

impl Boundary {
    /// Parses the boundary and legs blocks
    ///
    /// All problems found during the pass are reported together at the end.
    ///
    /// # Input
    ///
    /// * `boundary` -- the boundary control directives (`keyword = value` per line)
    /// * `legs` -- the legs block (explicit records or a table)
    pub fn parse(boundary: &str, legs: &str) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();
        let result = Boundary::parse_with(boundary, legs, &mut diagnostics);
        diagnostics.finish()?;
        Ok(result)
    }

    /// Parses the boundary and legs blocks recording errors and warnings into `diagnostics`
    pub fn parse_with(boundary: &str, legs: &str, diagnostics: &mut Diagnostics) -> Self {
        let mut control = BoundaryControl::parse_with(boundary, diagnostics);
        let mut parser = LegParser::new(&control);
        for line in legs.lines() {
            let tokens = tokenize(line);
            if tokens.is_empty() {
                continue;
            }
            if let Err(err) = parser.feed(&tokens) {
                diagnostics.error(err);
            }
        }
        let legs = parser.legs;
        if legs.is_empty() {
            diagnostics.error(Error::parse("no legs defined"));
        }
        if let Err(err) = check_monotonic_time(&legs) {
            diagnostics.error(err);
        }

        // stress control is only compatible with kappa = 0
        if legs.iter().any(|leg| leg.has_stress_control()) && control.kappa != 0.0 {
            diagnostics.warn(&format!(
                "stress control boundary conditions only compatible with kappa=0. kappa is being reset to 0 from {}",
                control.kappa
            ));
            control.kappa = 0.0;
        }
        debug!("parsed {} legs", legs.len());
        Boundary { control, legs }
    }

    /// Returns the time at the start of the simulation (end time of the first leg)
    pub fn initial_time(&self) -> f64 {
        self.legs.first().map_or(0.0, |leg| leg.time)
    }

    /// Returns the time at the end of the simulation
    pub fn final_time(&self) -> f64 {
        self.legs.last().map_or(0.0, |leg| leg.time)
    }
}

/// Splits one record of the legs block into tokens (commas are separators)
pub fn tokenize(line: &str) -> Vec<String> {
    line.replace(',', " ").split_whitespace().map(|s| s.to_string()).collect()
}

/// Defines the states of the leg parser
enum ParserState {
    /// Nothing read yet
    Start,

    /// Reading explicit records
    Explicit,

    /// Reading the rows of a table
    Table {
        spec: TableSpec,
        time: f64,
        next_number: i64,
    },
}

/// Converts the records of the legs block into legs
struct LegParser<'a> {
    control: &'a BoundaryControl,
    state: ParserState,
    legs: Vec<Leg>,
    n_records: usize,
}

impl<'a> LegParser<'a> {
    fn new(control: &'a BoundaryControl) -> Self {
        LegParser {
            control,
            state: ParserState::Start,
            legs: Vec::new(),
            n_records: 0,
        }
    }

    /// Consumes one record
    fn feed(&mut self, tokens: &[String]) -> Result<()> {
        if let ParserState::Start = self.state {
            match TableSpec::parse(tokens) {
                Ok(Some(spec)) => {
                    self.state = ParserState::Table {
                        spec,
                        time: 0.0,
                        next_number: 0,
                    };
                    return Ok(());
                }
                Ok(None) => self.state = ParserState::Explicit,
                Err(message) => {
                    // keep reading explicit records so that the remaining errors show up
                    self.state = ParserState::Explicit;
                    return Err(Error::leg(0, message));
                }
            }
        }
        let first = self.n_records == 0;
        self.n_records += 1;
        let leg = if let ParserState::Table {
            spec,
            time,
            next_number,
        } = &mut self.state
        {
            if tokens[0].to_lowercase() == "time" {
                return Ok(());
            }
            let number = *next_number;
            *next_number += 1;
            let (t, values) = spec.extract(tokens).map_err(|e| Error::leg(number, e))?;
            match spec.time_column {
                TimeColumn::Time => *time = t,
                TimeColumn::Dt => *time += t,
            }
            let steps = step_count(number, 1.0, self.control.stepstar)?;
            normalize_leg(self.control, number, self.control.tfac() * *time, steps, &spec.kind.codes(), &values)?
        } else {
            self.explicit_leg(tokens, first)?
        };
        self.legs.push(leg);
        Ok(())
    }

    /// Parses `number, time, steps, codes, values…`
    fn explicit_leg(&self, tokens: &[String], first: bool) -> Result<Leg> {
        let number = parse_leg_number(&tokens[0])
            .map(|n| n as i64)
            .unwrap_or(self.legs.len() as i64);
        if tokens.len() < 5 {
            return Err(Error::leg(
                number,
                "leg input must be of form: leg number, time, steps, type, c[ij]",
            ));
        }
        let time = parse_leg_number(&tokens[1]).map_err(|e| Error::leg(number, e))?;
        let steps = parse_leg_number(&tokens[2]).map_err(|e| Error::leg(number, e))?;
        let steps = step_count(number, steps, self.control.stepstar)?;
        if !first && steps == 0 {
            return Err(Error::leg(number, "leg has no steps"));
        }
        let codes = parse_control_codes(&tokens[3]).map_err(|_| {
            Error::leg(
                number,
                format!(
                    "leg control parameters can only be one of [{}]; got {}",
                    ControlCode::ALPHABET,
                    tokens[3]
                ),
            )
        })?;
        let values = tokens[4..]
            .iter()
            .map(|t| parse_leg_number(t))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::leg(number, format!("syntax error: {}", e)))?;
        normalize_leg(self.control, number, self.control.tfac() * time, steps, &codes, &values)
    }
}

/// Converts the number of steps of a leg, scaled by stepstar, into an integer
///
/// The given number must be a non-negative integer. The scaled number is truncated.
fn step_count(number: i64, steps: f64, stepstar: f64) -> Result<usize> {
    if steps.is_nan() || steps < 0.0 || steps.fract() != 0.0 {
        return Err(Error::leg(
            number,
            format!("number of steps must be a non-negative integer; got {}", steps),
        ));
    }
    let scaled = (stepstar * steps).trunc();
    if !scaled.is_finite() || scaled > MAX_STEPS {
        return Err(Error::leg(
            number,
            format!("number of steps {} exceeds the maximum of {}", scaled, MAX_STEPS),
        ));
    }
    Ok(scaled as usize)
}

/// Returns the Seth-Hill generalized strain
///
/// ```text
/// ε = (λᵏ - 1) / κ   (κ ≠ 0)
/// ε = ln(λ)          (κ = 0)
/// ```
fn seth_hill_strain(stretch: f64, kappa: f64) -> f64 {
    if kappa != 0.0 {
        (f64::powf(stretch, kappa) - 1.0) / kappa
    } else {
        f64::ln(stretch)
    }
}

/// Validates, converts and scales the control items of one leg
///
/// # Input
///
/// * `control` -- boundary control directives (scale factors and kappa)
/// * `number` -- leg number
/// * `time` -- end time (already scaled)
/// * `steps` -- number of steps (already scaled)
/// * `codes` -- one control code per value
/// * `values` -- the prescribed values as given by the user
pub fn normalize_leg(
    control: &BoundaryControl,
    number: i64,
    time: f64,
    steps: usize,
    codes: &[ControlCode],
    values: &[f64],
) -> Result<Leg> {
    if codes.len() != values.len() {
        return Err(Error::leg(number, "length of leg control != number of control items"));
    }
    let kappa = control.kappa;

    // electric field goes to its own slots
    let mut efield = [0.0; N_EFIELD_SLOTS];
    let mut n_efield = 0;
    let mut cc = Vec::with_capacity(codes.len());
    let mut vv = Vec::with_capacity(values.len());
    for (&code, &value) in codes.iter().zip(values) {
        if code == ControlCode::ElectricField {
            if n_efield == N_EFIELD_SLOTS {
                return Err(Error::leg(number, "at most 3 electric field components are allowed"));
            }
            efield[n_efield] = control.effac() * value;
            n_efield += 1;
        } else {
            cc.push(code);
            vv.push(value);
        }
    }

    let mut efac = control.efac();
    if cc.contains(&ControlCode::DeformationGradient) {
        if cc.iter().any(|&c| c != ControlCode::DeformationGradient) {
            return Err(Error::leg(
                number,
                "only components of deformation gradient are allowed with deformation gradient control",
            ));
        }
        if vv.len() != 9 {
            return Err(Error::leg(
                number,
                "all 9 components of deformation gradient must be specified",
            ));
        }
        let ff = tensor_to_matrix(&vv);
        let jacobian = determinant(&ff);
        if jacobian <= 0.0 {
            return Err(Error::InadmissibleDeformation { leg: number, jacobian });
        }
        if has_rotation(&ff, ROTATION_TOLERANCE) {
            return Err(Error::RotationUnsupported { leg: number });
        }
    } else if cc.contains(&ControlCode::Displacement) {
        if cc.iter().any(|&c| c != ControlCode::Displacement) {
            return Err(Error::leg(
                number,
                "only components of displacement are allowed with displacement control",
            ));
        }
        if vv.len() != 3 {
            return Err(Error::leg(number, "all 3 components of displacement must be specified"));
        }
        let dfac = control.dfac();
        for v in vv.iter_mut() {
            let stretch = dfac * *v + 1.0;
            if stretch <= 0.0 {
                return Err(Error::leg(number, format!("displacement gives a non-positive stretch {}", stretch)));
            }
            *v = seth_hill_strain(stretch, kappa);
        }
        cc = vec![ControlCode::Strain; 3];
    } else if vv.len() > N_SYM {
        return Err(Error::leg(number, "at most 6 strain or stress components are allowed"));
    }

    // a single strain value is a volumetric strain
    if cc == [ControlCode::Strain] {
        let ev = vv[0] * efac;
        if kappa * ev + 1.0 < 0.0 {
            return Err(Error::leg(number, "1 + kappa*ev must be positive"));
        }
        let e = if kappa == 0.0 {
            ev / 3.0
        } else {
            (f64::powf(kappa * ev + 1.0, 1.0 / 3.0) - 1.0) / kappa
        };
        cc = vec![ControlCode::Strain; 3];
        vv = vec![e; 3];
        efac = 1.0;
    }

    let mut leg = Leg {
        number,
        time,
        steps,
        codes: [ControlCode::Unused; N_LEG_SLOTS],
        values: [0.0; N_LEG_SLOTS],
        efield,
    };
    for (i, (&code, &value)) in cc.iter().zip(&vv).enumerate() {
        let scaled = match code {
            ControlCode::StrainRate | ControlCode::StressRate => control.ratfac * value,
            ControlCode::Strain => {
                let c = efac * value;
                if kappa * c + 1.0 < 0.0 {
                    return Err(Error::leg(number, format!("1 + kappa*c[{}] must be positive", i)));
                }
                c
            }
            ControlCode::Stress => control.sfac() * value,
            ControlCode::DeformationGradient => control.ffac() * value,
            _ => value,
        };
        leg.codes[i] = code;
        leg.values[i] = scaled;
    }
    Ok(leg)
}

/// Checks that the end times of the legs do not decrease
///
/// The error names the 1-indexed positions of the offending pair.
pub fn check_monotonic_time(legs: &[Leg]) -> Result<()> {
    let mut previous = FIRST_LEG_MIN_TIME;
    for (i, leg) in legs.iter().enumerate() {
        if leg.time < previous {
            return Err(Error::NonMonotonicTime { from: i, to: i + 1 });
        }
        previous = leg.time;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
