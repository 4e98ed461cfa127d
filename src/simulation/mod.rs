//! Implements the driver of the material-point simulations

mod control;
mod driver;
mod output;
mod run_summary;
mod simulation;
pub use crate::simulation::control::*;
pub use crate::simulation::driver::*;
pub use crate::simulation::output::*;
pub use crate::simulation::run_summary::*;
pub use crate::simulation::simulation::*;
