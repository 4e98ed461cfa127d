//! Implements the named, typed, three-slot data container

mod data_container;
mod value;
pub use crate::data::data_container::*;
pub use crate::data::value::*;
