//! Implements the base structures shared by all modules

mod diagnostics;
mod error;
mod numbers;
mod tensor;
mod units;
pub use crate::base::diagnostics::*;
pub use crate::base::error::*;
pub use crate::base::numbers::*;
pub use crate::base::tensor::*;
pub use crate::base::units::*;
