use super::{ConstitutiveModel, ElasticConstants, ModelBase, ParameterDef};
use crate::base::{new_sym_tensor, tensor_to_sym, Error, Result};
use crate::data::DataContainer;
use russell_tensor::{t4_ddot_t2_update, LinElasticity, Mandel, Tensor2};

/// Holds the identity in Mandel representation
const I: [f64; 6] = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

/// Holds the name of the extra variable with the equivalent plastic strain
const EQPS: &str = "equivalent plastic strain";

/// Implements the von Mises plasticity model with linear isotropic hardening
///
/// The yield function is
///
/// ```text
/// f = σd - (Y₀ + H εp)
/// ```
///
/// where σd is the von Mises stress and εp is the equivalent plastic strain (an extra variable).
/// The stress is updated by the radial return algorithm.
pub struct Plastic {
    base: ModelBase,

    /// Linear elasticity (available after set up)
    lin_elasticity: Option<LinElasticity>,

    /// Initial size of the yield surface Y₀
    y0: f64,

    /// Hardening coefficient H
    hh: f64,

    /// Deviatoric stress: s = dev(σ)
    s: Tensor2,
}

impl Plastic {
    /// Allocates a new instance
    pub fn new() -> Result<Self> {
        let mut base = ModelBase::new("plastic");
        base.register_parameter(
            ParameterDef::new("K", 0)
                .aliases(&["B0", "BKMOD"])
                .units("PRESSURE_UNITS")
                .description("Bulk modulus"),
        )?;
        base.register_parameter(
            ParameterDef::new("G", 1)
                .aliases(&["MU", "G0", "SHMOD"])
                .units("PRESSURE_UNITS")
                .description("Shear modulus"),
        )?;
        base.register_parameter(ParameterDef::new("E", 2).aliases(&["YOUNGS"]).units("PRESSURE_UNITS"))?;
        base.register_parameter(ParameterDef::new("NU", 3).aliases(&["POISSONS", "POISSONS RATIO"]))?;
        base.register_parameter(
            ParameterDef::new("Y0", 4)
                .aliases(&["A1", "YIELD STRESS"])
                .units("PRESSURE_UNITS")
                .description("Initial yield stress in uniaxial tension"),
        )?;
        base.register_parameter(
            ParameterDef::new("H", 5)
                .aliases(&["HARDENING", "HARDENING MODULUS"])
                .units("PRESSURE_UNITS")
                .description("Linear hardening modulus"),
        )?;
        base.register_parameter(ParameterDef::new("RHO", 6).aliases(&["DENSITY"]).units("DENSITY_UNITS"))?;
        Ok(Plastic {
            base,
            lin_elasticity: None,
            y0: 0.0,
            hh: 0.0,
            s: Tensor2::new(Mandel::Symmetric),
        })
    }
}

impl ConstitutiveModel for Plastic {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn set_up(&mut self, matdat: &mut DataContainer) -> Result<()> {
        self.base.parse_parameters();
        let ui = &self.base.ui0;
        let mut elastic_ui = [0.0; 12];
        elastic_ui[1] = ui[1]; // G
        elastic_ui[2] = ui[2]; // E
        elastic_ui[3] = ui[3]; // NU
        elastic_ui[4] = ui[0]; // K
        elastic_ui[11] = ui[6]; // RHO
        let constants = ElasticConstants::from_ui(&elastic_ui)?;
        let (kk, gg) = (constants.k, constants.g);
        self.y0 = ui[4];
        self.hh = ui[5];
        self.base.ui0[0] = kk;
        self.base.ui0[1] = gg;
        self.base.ui0[2] = constants.e;
        self.base.ui0[3] = constants.nu;
        self.base.ui = self.base.ui0.clone();

        if kk <= 0.0 {
            self.base.diagnostics.error(Error::setup("plastic: bulk modulus K must be positive"));
        }
        if gg <= 0.0 {
            self.base.diagnostics.error(Error::setup("plastic: shear modulus G must be positive"));
        }
        if self.y0 <= 0.0 {
            self.base.diagnostics.error(Error::setup("plastic: yield stress Y0 must be positive"));
        }
        if self.hh < 0.0 {
            self.base.diagnostics.warn("plastic: negative hardening modulus (softening)");
        }
        if kk > 0.0 && gg > 0.0 {
            self.lin_elasticity = Some(LinElasticity::new(constants.e, constants.nu, false, false));
        }
        self.base.bulk_modulus = kk;
        self.base.shear_modulus = gg;
        self.base.dc = vec![kk, gg, self.y0, self.hh];
        matdat.register_xtra_vars(&[EQPS], &["EQPS"], &[0.0])
    }

    /// Checks that the initial stress is inside the yield surface
    fn initialize_state(&mut self, matdat: &mut DataContainer) -> Result<()> {
        let sigma = new_sym_tensor(&matdat.array_old("stress")?);
        if sigma.invariant_sigma_d() - self.y0 > 0.0 {
            return Err(Error::setup("plastic: stress is outside the yield surface"));
        }
        Ok(())
    }

    /// Updates the stress by the radial return algorithm
    fn update_state(&mut self, simdat: &DataContainer, matdat: &mut DataContainer) -> Result<()> {
        let lin_elasticity = self
            .lin_elasticity
            .as_ref()
            .ok_or_else(|| Error::setup("plastic: set_up must be called first"))?;
        let dt = simdat.scalar_cur("time step")?;
        let d = matdat.array_cur("rate of deformation")?;
        let eqps_old = matdat.scalar_old(EQPS)?;
        let de: Vec<f64> = d.iter().map(|x| x * dt).collect();

        // trial stress: σ ← σ_trial
        let mut stress = new_sym_tensor(&matdat.array_old("stress")?);
        let delta_strain = new_sym_tensor(&de);
        t4_ddot_t2_update(&mut stress, 1.0, lin_elasticity.get_modulus(), &delta_strain, 1.0); // σ += D : Δε

        // elastic update
        let z = self.y0 + self.hh * eqps_old;
        let f_trial = stress.invariant_sigma_d() - z;
        if f_trial <= 0.0 {
            matdat.store(EQPS, eqps_old)?;
            return matdat.store("stress", tensor_to_sym(&stress).to_vec());
        }

        // coefficients
        let gg = self.base.shear_modulus;
        let sigma_m_trial = stress.invariant_sigma_m();
        let sigma_d_trial = stress.invariant_sigma_d();
        let lambda = f_trial / (3.0 * gg + self.hh);
        let m = 1.0 - lambda * 3.0 * gg / sigma_d_trial;

        // s_trial = dev(σ_trial)
        stress.deviator(&mut self.s);

        // σ_new = m s_trial + σm_trial I
        let vec = stress.vector_mut();
        let s_trial = self.s.vector();
        for i in 0..6 {
            vec[i] = m * s_trial[i] + sigma_m_trial * I[i];
        }

        // elastoplastic update
        matdat.store(EQPS, eqps_old + lambda)?;
        matdat.store("stress", tensor_to_sym(&stress).to_vec())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Plastic;
    use crate::base::new_sym_tensor;
    use crate::data::{DataContainer, DataType, Init};
    use crate::material::{finish_setup, ConstitutiveModel};
    use russell_lab::approx_eq;

    fn set_up(params: &str) -> (Plastic, DataContainer, DataContainer) {
        let mut simdat = DataContainer::new("simulation data");
        simdat.register("time step", DataType::Scalar, Init::Default, None).unwrap();
        simdat.store("time step", 1.0).unwrap();
        let mut matdat = DataContainer::new("material data");
        matdat.register("stress", DataType::SymTensor, Init::Default, Some("sig")).unwrap();
        matdat.register("rate of deformation", DataType::SymTensor, Init::Default, Some("d")).unwrap();
        matdat.register("deformation gradient", DataType::Tensor, Init::Identity, Some("F")).unwrap();
        let mut model = Plastic::new().unwrap();
        model.base_mut().parse_user_params(params).unwrap();
        model.set_up(&mut matdat).unwrap();
        finish_setup(&mut model, &simdat, &mut matdat).unwrap();
        model.initialize_state(&mut matdat).unwrap();
        (model, simdat, matdat)
    }

    #[test]
    fn elastic_step_works() {
        let (mut model, simdat, mut matdat) = set_up("K 10\nG 4\nY0 1\nH 0.5");
        matdat.store("rate of deformation", vec![0.0, 0.0, 0.0, 0.01, 0.0, 0.0]).unwrap();
        model.update_state(&simdat, &mut matdat).unwrap();
        let sig = matdat.array_cur("stress").unwrap();
        approx_eq(sig[3], 2.0 * 4.0 * 0.01, 1e-15);
        assert_eq!(matdat.scalar_cur("equivalent plastic strain").unwrap(), 0.0);
    }

    #[test]
    fn radial_return_works() {
        let (mut model, simdat, mut matdat) = set_up("K 10\nG 4\nY0 1\nH 0.5");
        let de = 0.2;
        matdat.store("rate of deformation", vec![de, -de / 2.0, -de / 2.0, 0.0, 0.0, 0.0]).unwrap();
        model.update_state(&simdat, &mut matdat).unwrap();

        // trial von Mises stress = 3G de (isochoric extension)
        let sigma_d_trial = 3.0 * 4.0 * de;
        let lambda = (sigma_d_trial - 1.0) / (3.0 * 4.0 + 0.5);
        let eqps = matdat.scalar_cur("equivalent plastic strain").unwrap();
        approx_eq(eqps, lambda, 1e-14);

        // the updated stress lies on the updated yield surface
        let sig = matdat.array_cur("stress").unwrap();
        let sigma = new_sym_tensor(&sig);
        approx_eq(sigma.invariant_sigma_d(), 1.0 + 0.5 * lambda, 1e-13);
        approx_eq(sigma.invariant_sigma_m(), 0.0, 1e-14);
    }

    #[test]
    fn set_up_captures_errors() {
        let mut matdat = DataContainer::new("material data");
        let mut model = Plastic::new().unwrap();
        model.base_mut().parse_user_params("E 10\nNU 0.3").unwrap();
        model.set_up(&mut matdat).unwrap();
        assert_eq!(model.base().diagnostics.error_count(), 1);
    }
}
