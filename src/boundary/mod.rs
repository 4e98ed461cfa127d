//! Implements the boundary control directives and the legs parser

mod boundary_control;
mod control_code;
mod leg;
mod leg_parser;
mod table_spec;
pub use crate::boundary::boundary_control::*;
pub use crate::boundary::control_code::*;
pub use crate::boundary::leg::*;
pub use crate::boundary::leg_parser::*;
pub use crate::boundary::table_spec::*;
