use super::{j0_submatrix, ConstitutiveModel, ElasticConstants, MaterialDatabase, ModelBase, ParameterDef};
use crate::base::{new_sym_tensor, tensor_to_sym, Error, Result};
use crate::data::DataContainer;
use russell_lab::Matrix;
use russell_tensor::{t4_ddot_t2_update, LinElasticity};

/// Holds the built-in parameterizations of the elastic family (SI units)
const ELASTIC_DATABASE: &str = r#"{
  "materials": {
    "aluminum": { "K": 7.6e10, "G": 2.6e10, "RHO": 2700.0 },
    "copper": { "K": 1.4e11, "G": 4.8e10, "RHO": 8960.0 },
    "steel": { "K": 1.6e11, "G": 7.93e10, "RHO": 7850.0 }
  }
}"#;

/// Registers the parameters shared by the elastic family
pub(crate) fn register_elastic_parameters(base: &mut ModelBase) -> Result<()> {
    base.register_parameter(ParameterDef::new("LAM", 0).units("PRESSURE_UNITS"))?;
    base.register_parameter(
        ParameterDef::new("G", 1)
            .aliases(&["MU", "G0", "SHMOD"])
            .units("PRESSURE_UNITS")
            .description("Shear modulus"),
    )?;
    base.register_parameter(
        ParameterDef::new("E", 2)
            .aliases(&["YOUNGS"])
            .units("PRESSURE_UNITS")
            .description("Young's modulus"),
    )?;
    base.register_parameter(
        ParameterDef::new("NU", 3)
            .aliases(&["POISSONS", "POISSONS RATIO"])
            .description("Poisson's ratio"),
    )?;
    base.register_parameter(
        ParameterDef::new("K", 4)
            .aliases(&["B0", "BKMOD"])
            .units("PRESSURE_UNITS")
            .description("Bulk modulus"),
    )?;
    base.register_parameter(ParameterDef::new("H", 5).aliases(&["CONSTRAINED"]).units("PRESSURE_UNITS"))?;
    base.register_parameter(ParameterDef::new("KO", 6))?;
    base.register_parameter(ParameterDef::new("CL", 7).units("VELOCITY_UNITS"))?;
    base.register_parameter(ParameterDef::new("CT", 8).units("VELOCITY_UNITS"))?;
    base.register_parameter(ParameterDef::new("CO", 9).units("VELOCITY_UNITS"))?;
    base.register_parameter(ParameterDef::new("CR", 10).units("VELOCITY_UNITS"))?;
    base.register_parameter(ParameterDef::new("RHO", 11).aliases(&["DENSITY"]).units("DENSITY_UNITS"))?;
    Ok(())
}

/// Converts the given elastic constants into the full set and returns (K, G)
///
/// Records an error for non-positive moduli and a warning for a negative Poisson's ratio.
pub(crate) fn set_up_elastic_constants(base: &mut ModelBase) -> Result<(f64, f64)> {
    base.parse_parameters();
    let constants = ElasticConstants::from_ui(&base.ui0)?;
    base.ui0[..constants.to_ui().len()].copy_from_slice(&constants.to_ui());
    base.ui = base.ui0.clone();
    let (kk, gg) = (constants.k, constants.g);
    if kk <= 0.0 {
        base.diagnostics
            .error(Error::setup(format!("{}: bulk modulus K must be positive", base.name)));
    }
    if gg <= 0.0 {
        base.diagnostics
            .error(Error::setup(format!("{}: shear modulus G must be positive", base.name)));
    }
    if constants.nu < 0.0 {
        base.diagnostics.warn(&format!("{}: negative Poisson's ratio", base.name));
    }
    base.bulk_modulus = kk;
    base.shear_modulus = gg;
    Ok((kk, gg))
}

/// Implements a hypoelastic (linear elastic) model
///
/// ```text
/// σ = σ_old + D : Δε  with  Δε = d Δt
/// ```
pub struct Elastic {
    /// Shared data
    base: ModelBase,

    /// Linear elasticity (available after set up)
    model: Option<LinElasticity>,
}

impl Elastic {
    /// Allocates a new instance
    pub fn new() -> Result<Self> {
        let mut base = ModelBase::new("elastic");
        register_elastic_parameters(&mut base)?;
        base.database = Some(MaterialDatabase::from_json(ELASTIC_DATABASE)?);
        Ok(Elastic { base, model: None })
    }
}

impl ConstitutiveModel for Elastic {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    /// Converts the elastic constants and allocates the elasticity tensor
    fn set_up(&mut self, _matdat: &mut DataContainer) -> Result<()> {
        let (kk, gg) = set_up_elastic_constants(&mut self.base)?;
        if kk > 0.0 && gg > 0.0 {
            let young = 9.0 * kk * gg / (3.0 * kk + gg);
            let poisson = (3.0 * kk - 2.0 * gg) / (2.0 * (3.0 * kk + gg));
            self.model = Some(LinElasticity::new(young, poisson, false, false));
        }
        self.base.dc = vec![kk, gg];
        Ok(())
    }

    /// Updates the stress given the rate of deformation
    fn update_state(&mut self, simdat: &DataContainer, matdat: &mut DataContainer) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::setup("elastic: set_up must be called first"))?;
        let dt = simdat.scalar_cur("time step")?;
        let d = matdat.array_cur("rate of deformation")?;
        let de: Vec<f64> = d.iter().map(|x| x * dt).collect();
        let mut sigma = new_sym_tensor(&matdat.array_old("stress")?);
        let delta_strain = new_sym_tensor(&de);
        t4_ddot_t2_update(&mut sigma, 1.0, model.get_modulus(), &delta_strain, 1.0); // σ += D : Δε
        matdat.store("stress", tensor_to_sym(&sigma).to_vec())
    }

    /// Returns the constant Jacobian
    fn jacobian(&mut self, _simdat: &DataContainer, _matdat: &mut DataContainer, v: &[usize]) -> Result<Matrix> {
        j0_submatrix(&self.base, v)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
