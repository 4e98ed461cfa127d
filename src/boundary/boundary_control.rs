use crate::base::{parse_number, Diagnostics, Error, Result};
use serde::{Deserialize, Serialize};

/// Defines how often output rows are written
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum Emit {
    /// Every step (honoring the number of prints)
    #[default]
    All,

    /// Only the last step of each leg
    Sparse,
}

/// Holds the directives of the boundary block
///
/// The starred values are the "units" of the prescribed quantities. All of them are
/// multiplied by the amplitude, except the time which is multiplied by |ampl|/ratfac.
/// Thus, `ampl` changes the peak values without changing the rates, and `ratfac` is
/// the multiplier on strain and stress rates.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BoundaryControl {
    /// Seth-Hill parameter (0 means logarithmic strain)
    pub kappa: f64,

    /// Unit of strain
    pub estar: f64,

    /// Unit of time
    pub tstar: f64,

    /// Amplitude
    pub ampl: f64,

    /// Unit of electric field
    pub efstar: f64,

    /// Rate factor
    pub ratfac: f64,

    /// Unit of stress
    pub sstar: f64,

    /// Unit of deformation gradient
    pub fstar: f64,

    /// Unit of displacement
    pub dstar: f64,

    /// Output frequency
    pub emit: Emit,

    /// Number of rows printed per leg (0 means every step)
    pub nprints: usize,

    /// Multiplier on the number of steps
    pub stepstar: f64,

    /// Echo the progress to the screen
    pub screenout: bool,
}

impl Default for BoundaryControl {
    fn default() -> Self {
        BoundaryControl {
            kappa: 0.0,
            estar: 1.0,
            tstar: 1.0,
            ampl: 1.0,
            efstar: 1.0,
            ratfac: 1.0,
            sstar: 1.0,
            fstar: 1.0,
            dstar: 1.0,
            emit: Emit::All,
            nprints: 0,
            stepstar: 1.0,
            screenout: false,
        }
    }
}

impl BoundaryControl {
    /// Parses the boundary block
    ///
    /// Each line holds one `keyword value` or `keyword = value` pair.
    /// Unknown keywords are ignored with a warning.
    pub fn parse(text: &str) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();
        let control = BoundaryControl::parse_with(text, &mut diagnostics);
        diagnostics.finish()?;
        Ok(control)
    }

    /// Parses the boundary block recording errors and warnings into `diagnostics`
    pub fn parse_with(text: &str, diagnostics: &mut Diagnostics) -> Self {
        let mut control = BoundaryControl::default();
        for line in text.lines() {
            let line = line.replace('=', " ");
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if tokens.len() != 2 {
                diagnostics.error(Error::parse(format!(
                    "boundary control items must be keyword = value pairs; got '{}'",
                    line.trim()
                )));
                continue;
            }
            let (keyword, value) = (tokens[0].to_lowercase(), tokens[1]);
            if let Err(message) = control.set(&keyword, value) {
                match message {
                    Some(message) => diagnostics.error(Error::parse(message)),
                    None => diagnostics.warn(&format!("unrecognized boundary control keyword '{}'", keyword)),
                }
            }
        }
        if control.stepstar <= 0.0 {
            diagnostics.error(Error::parse("stepstar must be > 0"));
        }
        if control.ratfac == 0.0 {
            diagnostics.error(Error::parse("ratfac must be non-zero"));
        }
        control
    }

    /// Sets one directive
    ///
    /// Returns `Err(None)` if the keyword is unknown and `Err(Some(message))` if the value is invalid.
    fn set(&mut self, keyword: &str, value: &str) -> std::result::Result<(), Option<String>> {
        let real = || parse_number(value).ok_or_else(|| Some(format!("invalid value '{}' for {}", value, keyword)));
        match keyword {
            "kappa" => self.kappa = real()?,
            "estar" => self.estar = real()?,
            "tstar" => self.tstar = real()?,
            "ampl" => self.ampl = real()?,
            "efstar" => self.efstar = real()?,
            "ratfac" => self.ratfac = real()?,
            "sstar" => self.sstar = real()?,
            "fstar" => self.fstar = real()?,
            "dstar" => self.dstar = real()?,
            "stepstar" => self.stepstar = real()?,
            "nprints" => {
                let n = real()?;
                if n < 0.0 {
                    return Err(Some("nprints must be non-negative".to_string()));
                }
                self.nprints = n as usize;
            }
            "emit" => {
                self.emit = match value.to_lowercase().as_str() {
                    "all" => Emit::All,
                    "sparse" => Emit::Sparse,
                    _ => return Err(Some(format!("emit must be one of [all, sparse]; got '{}'", value))),
                }
            }
            "screenout" => {
                self.screenout = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(Some(format!("invalid value '{}' for screenout", value))),
                }
            }
            _ => return Err(None),
        }
        Ok(())
    }

    /// Returns the time factor |ampl|·tstar/ratfac
    pub fn tfac(&self) -> f64 {
        f64::abs(self.ampl) * self.tstar / self.ratfac
    }

    /// Returns the strain factor ampl·estar
    pub fn efac(&self) -> f64 {
        self.ampl * self.estar
    }

    /// Returns the stress factor ampl·sstar
    pub fn sfac(&self) -> f64 {
        self.ampl * self.sstar
    }

    /// Returns the deformation gradient factor ampl·fstar
    pub fn ffac(&self) -> f64 {
        self.ampl * self.fstar
    }

    /// Returns the electric field factor ampl·efstar
    pub fn effac(&self) -> f64 {
        self.ampl * self.efstar
    }

    /// Returns the displacement factor ampl·dstar
    pub fn dfac(&self) -> f64 {
        self.ampl * self.dstar
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{BoundaryControl, Emit};
    use crate::base::{Diagnostics, Error};
    use russell_lab::approx_eq;

    #[test]
    fn default_works() {
        let control = BoundaryControl::parse("").unwrap();
        assert_eq!(control.kappa, 0.0);
        assert_eq!(control.emit, Emit::All);
        assert_eq!(control.nprints, 0);
        assert_eq!(control.tfac(), 1.0);
        assert_eq!(control.efac(), 1.0);
        assert!(!control.screenout);
    }

    #[test]
    fn parse_works() {
        let text = "kappa = 0.5\n ampl -2\nTSTAR=3\nratfac 4\nestar 0.1\nemit sparse\nnprints 10\nscreenout true\n";
        let control = BoundaryControl::parse(text).unwrap();
        assert_eq!(control.kappa, 0.5);
        assert_eq!(control.emit, Emit::Sparse);
        assert_eq!(control.nprints, 10);
        assert!(control.screenout);
        approx_eq(control.tfac(), 2.0 * 3.0 / 4.0, 1e-15);
        approx_eq(control.efac(), -0.2, 1e-15);
        approx_eq(control.sfac(), -2.0, 1e-15);
        approx_eq(control.dfac(), -2.0, 1e-15);
    }

    #[test]
    fn parse_captures_errors() {
        assert!(matches!(BoundaryControl::parse("kappa"), Err(Error::Parse(_))));
        assert!(matches!(BoundaryControl::parse("stepstar 0"), Err(Error::Parse(_))));
        assert!(matches!(BoundaryControl::parse("emit some"), Err(Error::Parse(_))));
        match BoundaryControl::parse("kappa 1 2\nampl abc") {
            Err(Error::Multiple(all)) => assert_eq!(all.len(), 2),
            _ => panic!("expected two errors"),
        }
    }

    #[test]
    fn unknown_keywords_are_warned() {
        let mut diagnostics = Diagnostics::new();
        let control = BoundaryControl::parse_with("color red\nkappa 1", &mut diagnostics);
        assert_eq!(control.kappa, 1.0);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 0);
    }
}
