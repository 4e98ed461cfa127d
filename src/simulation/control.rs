use crate::base::{Error, Result};

/// Holds the parameters of the stress-control iterations
pub struct DriverControl {
    /// Maximum number of Newton iterations per step
    pub(crate) n_max_iterations: usize,

    /// Relative tolerance on the stress residual
    pub(crate) tol_rel_residual: f64,

    /// Absolute floor of the tolerance on the stress residual
    pub(crate) tol_abs_residual: f64,

    /// Use the initial Jacobian J0 in all iterations (instead of the model Jacobian)
    pub(crate) constant_tangent: bool,

    /// Log the iterations
    pub(crate) verbose_iterations: bool,
}

impl DriverControl {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        DriverControl {
            n_max_iterations: 25,
            tol_rel_residual: 1e-10,
            tol_abs_residual: 1e-12,
            constant_tangent: false,
            verbose_iterations: false,
        }
    }

    /// Sets the maximum number of iterations
    pub fn n_max_iterations(&mut self, value: usize) -> Result<&mut Self> {
        if value < 1 {
            return Err(Error::setup("n_max_iterations must be ≥ 1"));
        }
        self.n_max_iterations = value;
        Ok(self)
    }

    /// Sets the relative tolerance for the stress residual
    pub fn tol_rel_residual(&mut self, value: f64) -> Result<&mut Self> {
        if value < 1e-15 {
            return Err(Error::setup("tol_rel_residual must be ≥ 1e-15"));
        }
        self.tol_rel_residual = value;
        Ok(self)
    }

    /// Sets the absolute floor of the tolerance for the stress residual
    pub fn tol_abs_residual(&mut self, value: f64) -> Result<&mut Self> {
        if value < 0.0 {
            return Err(Error::setup("tol_abs_residual must be ≥ 0"));
        }
        self.tol_abs_residual = value;
        Ok(self)
    }

    /// Tells the driver to use the initial Jacobian in all iterations
    pub fn constant_tangent(&mut self, flag: bool) -> Result<&mut Self> {
        self.constant_tangent = flag;
        Ok(self)
    }

    /// Tells the driver to log the iterations
    pub fn verbose_iterations(&mut self, flag: bool) -> Result<&mut Self> {
        self.verbose_iterations = flag;
        Ok(self)
    }

    /// Returns the tolerance for a given stress scale
    pub(crate) fn tolerance(&self, scale: f64) -> f64 {
        f64::max(self.tol_rel_residual * scale, self.tol_abs_residual)
    }
}

impl Default for DriverControl {
    fn default() -> Self {
        DriverControl::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
