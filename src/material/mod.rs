//! Implements the constitutive models and their shared machinery

mod constitutive_model;
mod elastic;
mod elastic_constants;
mod finite_elastic;
mod material;
mod model_base;
mod model_registry;
mod parameter_table;
mod plastic;
pub use crate::material::constitutive_model::*;
pub use crate::material::elastic::*;
pub use crate::material::elastic_constants::*;
pub use crate::material::finite_elastic::*;
pub use crate::material::material::*;
pub use crate::material::model_base::*;
pub use crate::material::model_registry::*;
pub use crate::material::parameter_table::*;
pub use crate::material::plastic::*;
