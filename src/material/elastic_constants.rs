use crate::base::{Error, Result};

/// Holds the number of elastic constants in the user input array of the elastic family
pub const N_ELASTIC_CONSTANTS: usize = 12;

/// Holds the full set of isotropic elastic constants
///
/// The order of the fields corresponds to the positions in the user input array:
/// `[LAM, G, E, NU, K, H, KO, CL, CT, CO, CR, RHO]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElasticConstants {
    /// First Lamé parameter λ
    pub lam: f64,

    /// Shear modulus G
    pub g: f64,

    /// Young's modulus E
    pub e: f64,

    /// Poisson's ratio ν
    pub nu: f64,

    /// Bulk modulus K
    pub k: f64,

    /// Constrained modulus H = K + 4G/3
    pub h: f64,

    /// Coefficient of lateral pressure ν/(1-ν)
    pub ko: f64,

    /// Longitudinal wave speed
    pub cl: f64,

    /// Transverse (shear) wave speed
    pub ct: f64,

    /// Bulk wave speed
    pub co: f64,

    /// Rayleigh wave speed
    pub cr: f64,

    /// Density
    pub rho: f64,
}

impl ElasticConstants {
    /// Computes all constants from any two of LAM, G, E, NU, K (or H and G)
    ///
    /// A zero entry means "not given". The bulk and shear moduli are resolved first,
    /// then all the other constants are derived from them. Wave speeds are computed
    /// only if the density is positive.
    pub fn from_ui(ui: &[f64]) -> Result<Self> {
        if ui.len() < N_ELASTIC_CONSTANTS {
            return Err(Error::setup(format!(
                "{} elastic constants are required but {} were given",
                N_ELASTIC_CONSTANTS,
                ui.len()
            )));
        }
        let given = |x: f64| x != 0.0;
        let (lam, g, e, nu, k, h, rho) = (ui[0], ui[1], ui[2], ui[3], ui[4], ui[5], ui[11]);
        let (kk, gg) = if given(k) && given(g) {
            (k, g)
        } else if given(e) && given(nu) {
            (e / (3.0 * (1.0 - 2.0 * nu)), e / (2.0 * (1.0 + nu)))
        } else if given(e) && given(g) {
            (e * g / (3.0 * (3.0 * g - e)), g)
        } else if given(e) && given(k) {
            (k, 3.0 * k * e / (9.0 * k - e))
        } else if given(k) && given(nu) {
            (k, 3.0 * k * (1.0 - 2.0 * nu) / (2.0 * (1.0 + nu)))
        } else if given(g) && given(nu) {
            (2.0 * g * (1.0 + nu) / (3.0 * (1.0 - 2.0 * nu)), g)
        } else if given(lam) && given(g) {
            (lam + 2.0 * g / 3.0, g)
        } else if given(lam) && given(k) {
            (k, 3.0 * (k - lam) / 2.0)
        } else if given(lam) && given(nu) {
            (lam * (1.0 + nu) / (3.0 * nu), lam * (1.0 - 2.0 * nu) / (2.0 * nu))
        } else if given(lam) && given(e) {
            let r = f64::sqrt(e * e + 9.0 * lam * lam + 2.0 * e * lam);
            ((e + 3.0 * lam + r) / 6.0, (e - 3.0 * lam + r) / 4.0)
        } else if given(h) && given(g) {
            (h - 4.0 * g / 3.0, g)
        } else if given(k) || given(g) {
            // a single modulus: keep it and let the model complain about the other one
            (k, g)
        } else {
            return Err(Error::setup("at least two elastic constants must be given"));
        };
        Ok(ElasticConstants::from_bulk_shear(kk, gg, rho))
    }

    /// Computes all constants from the bulk and shear moduli
    pub fn from_bulk_shear(k: f64, g: f64, rho: f64) -> Self {
        let lam = k - 2.0 * g / 3.0;
        let e = if 3.0 * k + g != 0.0 { 9.0 * k * g / (3.0 * k + g) } else { 0.0 };
        let nu = if 3.0 * k + g != 0.0 {
            (3.0 * k - 2.0 * g) / (2.0 * (3.0 * k + g))
        } else {
            0.0
        };
        let h = k + 4.0 * g / 3.0;
        let ko = if nu != 1.0 { nu / (1.0 - nu) } else { 0.0 };
        let (mut cl, mut ct, mut co, mut cr) = (0.0, 0.0, 0.0, 0.0);
        if rho > 0.0 {
            cl = f64::sqrt(f64::max(h, 0.0) / rho);
            ct = f64::sqrt(f64::max(g, 0.0) / rho);
            co = f64::sqrt(f64::max(k, 0.0) / rho);
            cr = ct * (0.862 + 1.14 * nu) / (1.0 + nu);
        }
        ElasticConstants {
            lam,
            g,
            e,
            nu,
            k,
            h,
            ko,
            cl,
            ct,
            co,
            cr,
            rho,
        }
    }

    /// Returns the constants in the order of the user input array
    pub fn to_ui(&self) -> [f64; N_ELASTIC_CONSTANTS] {
        [
            self.lam, self.g, self.e, self.nu, self.k, self.h, self.ko, self.cl, self.ct, self.co, self.cr, self.rho,
        ]
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
