//! Material point simulator
//!
//! Drives a constitutive model through a sequence of prescribed loading legs (strain, stress,
//! deformation gradient, or displacement, possibly mixed) and records the material state.

pub mod base;
pub mod boundary;
pub mod data;
pub mod input;
pub mod material;
pub mod simulation;
pub use crate::base::*;
pub use crate::boundary::*;
pub use crate::data::*;
pub use crate::input::*;
pub use crate::material::*;
pub use crate::simulation::*;
