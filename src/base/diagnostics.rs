use super::{Error, Result};
use tracing::{error, warn};

/// Collects errors and warnings during one set up pass
///
/// Errors are logged as they are found and returned together by [Diagnostics::finish],
/// so that all configuration problems can be seen in a single run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Holds the errors found so far
    errors: Vec<Error>,

    /// Number of warnings issued
    warnings: usize,
}

impl Diagnostics {
    /// Allocates a new instance
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Records an error
    pub fn error(&mut self, err: Error) {
        error!("{}", err);
        self.errors.push(err);
    }

    /// Records a warning
    pub fn warn(&mut self, message: &str) {
        warn!("{}", message);
        self.warnings += 1;
    }

    /// Returns the number of errors recorded so far
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings recorded so far
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Consumes the collected errors
    ///
    /// Returns the error itself if only one was found and [Error::Multiple] otherwise.
    pub fn finish(&mut self) -> Result<()> {
        let mut errors = std::mem::take(&mut self.errors);
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Diagnostics;
    use crate::base::Error;

    #[test]
    fn finish_works() {
        let mut diag = Diagnostics::new();
        diag.warn("negative Poisson's ratio");
        assert_eq!(diag.warning_count(), 1);
        assert!(diag.finish().is_ok());

        diag.error(Error::leg(1, "bad"));
        assert_eq!(diag.error_count(), 1);
        assert!(matches!(diag.finish(), Err(Error::Leg { leg: 1, .. })));
        assert_eq!(diag.error_count(), 0);

        diag.error(Error::leg(1, "bad"));
        diag.error(Error::leg(2, "worse"));
        match diag.finish() {
            Err(Error::Multiple(all)) => assert_eq!(all.len(), 2),
            _ => panic!("expected multiple errors"),
        }
    }
}
