use super::{finish_setup, ConstitutiveModel, MaterialDatabase, ModelRegistry};
use crate::base::Result;
use crate::data::{DataContainer, DataType, Init, Value};
use russell_lab::Matrix;
use tracing::info;

/// Holds a constitutive model together with its data container
pub struct Material {
    /// Holds the actual model implementation
    pub model: Box<dyn ConstitutiveModel>,

    /// Material data (stress, strain, deformation, and the model variables)
    pub matdat: DataContainer,
}

impl Material {
    /// Allocates and sets up a new material
    ///
    /// # Input
    ///
    /// * `registry` -- the available models
    /// * `model_name` -- name or alias of the constitutive model
    /// * `user_params` -- parameters, one `name value` pair per line
    /// * `database` -- material database overriding the one provided by the model
    /// * `simdat` -- simulation data (used to compute the initial Jacobian)
    pub fn new(
        registry: &ModelRegistry,
        model_name: &str,
        user_params: &str,
        database: Option<MaterialDatabase>,
        simdat: &DataContainer,
    ) -> Result<Self> {
        let mut model = registry.create(model_name)?;
        if database.is_some() {
            model.base_mut().database = database;
        }
        let mut matdat = DataContainer::new(&model.base().name);
        register_default_data(&mut matdat, model.base().electric_field_model)?;

        model.base_mut().parse_user_params(user_params)?;
        model.set_up(&mut matdat)?;
        finish_setup(model.as_mut(), simdat, &mut matdat)?;
        model.initialize_state(&mut matdat)?;

        // parameter table
        let names: Vec<String> = model.base().parameter_values().into_iter().map(|p| p.0).collect();
        matdat.register_option("parameter table", Value::List(names))?;
        info!(
            "material {} set up with {} parameters",
            model.base().name,
            model.base().parameters.len()
        );
        Ok(Material { model, matdat })
    }

    /// Returns the name of the constitutive model
    pub fn name(&self) -> &str {
        &self.model.base().name
    }

    /// Updates the material state
    pub fn update_state(&mut self, simdat: &DataContainer) -> Result<()> {
        self.model.update_state(simdat, &mut self.matdat)
    }

    /// Returns the Jacobian submatrix for the given stress components
    pub fn jacobian(&mut self, simdat: &DataContainer, v: &[usize]) -> Result<Matrix> {
        self.model.jacobian(simdat, &mut self.matdat, v)
    }

    /// Returns the checked parameters as (name, value) pairs
    pub fn parameter_echo(&self) -> Vec<(String, f64)> {
        self.model
            .base()
            .parameter_values()
            .into_iter()
            .map(|(name, _, adjusted)| (name, adjusted))
            .collect()
    }
}

/// Registers the variables every material carries
fn register_default_data(matdat: &mut DataContainer, electric_field: bool) -> Result<()> {
    matdat.register("stress", DataType::SymTensor, Init::Default, Some("sig"))?;
    matdat.register("stress rate", DataType::SymTensor, Init::Default, Some("dsigdt"))?;
    matdat.register("strain", DataType::SymTensor, Init::Default, Some("eps"))?;
    matdat.register("deformation gradient", DataType::Tensor, Init::Identity, Some("F"))?;
    matdat.register("rate of deformation", DataType::SymTensor, Init::Default, Some("d"))?;
    matdat.register("equivalent strain", DataType::Scalar, Init::Default, Some("eqveps"))?;
    if electric_field {
        matdat.register("electric field", DataType::Vector, Init::Default, Some("efield"))?;
    }
    matdat.register("strain rate", DataType::SymTensor, Init::Default, None)?;
    matdat.register("prescribed stress", DataType::Array, Init::Default, None)?;
    matdat.register("prescribed stress components", DataType::IntegerArray, Init::Default, None)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
