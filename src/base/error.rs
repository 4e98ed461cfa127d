//! Error type shared by all modules

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while setting up or running a simulation
#[derive(Debug, Error)]
pub enum Error {
    /// A variable with the same (case-insensitive) name already exists
    #[error("variable {0} already registered")]
    DuplicateName(String),

    /// Unknown data type name
    #[error("unrecognized data type: {0}")]
    UnknownType(String),

    /// Value does not match the declared type or shape
    #[error("type error for {name}: {message}")]
    TypeMismatch { name: String, message: String },

    /// Variable (or option) not present in a container
    #[error("{name} not in {container}; registered names are: {available}")]
    NotRegistered {
        name: String,
        container: String,
        available: String,
    },

    /// Requested representation is not available for the variable type
    #[error("cannot return {name} in {form} form")]
    InvalidForm { name: String, form: String },

    /// Both stash and current slots were requested at once
    #[error("cannot select the stashed and current slots simultaneously")]
    SlotConflict,

    /// Parameter registration collision
    #[error("duplicate parameter registration: {0}")]
    DuplicateParameter(String),

    /// Units could not be resolved through the dimension alias table
    #[error("units '{units}' for {name} are not valid")]
    InvalidUnits { name: String, units: String },

    /// Failure while reading user parameters or input blocks
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed or invalid leg
    #[error("leg {leg}: {message}")]
    Leg { leg: i64, message: String },

    /// Leg times decrease between two consecutive legs (1-indexed positions)
    #[error("time must be monotonic in from leg {from} to leg {to}")]
    NonMonotonicTime { from: usize, to: usize },

    /// Deformation gradient with non-positive determinant
    #[error("inadmissible deformation gradient in leg {leg} gave a Jacobian of {jacobian}")]
    InadmissibleDeformation { leg: i64, jacobian: f64 },

    /// Deformation gradient carries a rotation
    #[error("rotation encountered in leg {leg}; rotations are not supported")]
    RotationUnsupported { leg: i64 },

    /// Failure of the material set up or of its post-conditions
    #[error("material set up failed: {0}")]
    Setup(String),

    /// Non-finite or inadmissible state while driving the model
    #[error("leg {leg}, step {step}: {message}")]
    Numerical { leg: i64, step: usize, message: String },

    /// Several errors collected during one pass
    #[error("{} errors encountered:\n{}", .0.len(), join_errors(.0))]
    Multiple(Vec<Error>),

    /// Error reported by the linear algebra routines
    #[error("{0}")]
    Lab(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<&'static str> for Error {
    fn from(message: &'static str) -> Self {
        Error::Lab(message)
    }
}

impl Error {
    /// Creates a leg error
    pub fn leg(leg: i64, message: impl Into<String>) -> Self {
        Error::Leg {
            leg,
            message: message.into(),
        }
    }

    /// Creates a type mismatch error
    pub fn type_mismatch(name: &str, message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Creates a set up error
    pub fn setup(message: impl Into<String>) -> Self {
        Error::Setup(message.into())
    }

    /// Creates a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors.iter().map(|e| format!("  {}", e)).collect::<Vec<_>>().join("\n")
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_carries_context() {
        let err = Error::NonMonotonicTime { from: 2, to: 3 };
        assert_eq!(format!("{}", err), "time must be monotonic in from leg 2 to leg 3");

        let err = Error::leg(4, "leg has no steps");
        assert_eq!(format!("{}", err), "leg 4: leg has no steps");

        let err = Error::Multiple(vec![Error::leg(1, "a"), Error::leg(2, "b")]);
        let msg = format!("{}", err);
        assert!(msg.starts_with("2 errors encountered"));
        assert!(msg.contains("leg 1: a"));
        assert!(msg.contains("leg 2: b"));
    }

    #[test]
    fn lab_errors_convert() {
        let err: Error = "cannot compute inverse due to zero determinant".into();
        assert!(matches!(err, Error::Lab(_)));
    }
}
