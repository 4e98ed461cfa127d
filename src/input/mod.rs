//! Implements the reader of block-structured input files

mod input_parser;
mod material_input;
pub use crate::input::input_parser::*;
pub use crate::input::material_input::*;
