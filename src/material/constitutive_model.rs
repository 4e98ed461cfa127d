use super::ModelBase;
use crate::base::{matrix_to_tensor, sym_to_matrix, tensor_to_matrix, Error, Result};
use crate::data::{DataContainer, DataType, Init, Value};
use russell_lab::{mat_mat_mul, Matrix};
use tracing::debug;

/// Specifies the essential functions for constitutive models
///
/// Models read the rate of deformation, the deformation gradient and the time step from the
/// current slots, read their previous state (stress and extra variables) from the old slots,
/// and write the updated state to the current slots.
pub trait ConstitutiveModel {
    /// Returns the shared data
    fn base(&self) -> &ModelBase;

    /// Returns the shared data (mutable)
    fn base_mut(&mut self) -> &mut ModelBase;

    /// Checks the parameters and registers the model variables
    fn set_up(&mut self, matdat: &mut DataContainer) -> Result<()>;

    /// Updates the stress (and extra variables) over one time step
    fn update_state(&mut self, simdat: &DataContainer, matdat: &mut DataContainer) -> Result<()>;

    /// Initializes the material state
    fn initialize_state(&mut self, _matdat: &mut DataContainer) -> Result<()> {
        Ok(())
    }

    /// Returns whether the initial Jacobian takes the closed form for isotropic materials
    ///
    /// Otherwise, [finish_setup] computes it numerically about the initial state.
    fn isotropic_init_jacobian(&self) -> bool {
        true
    }

    /// Returns the submatrix `J[v, v]` of the material Jacobian J = dσ/dε
    ///
    /// The default implementation computes it numerically (see [numerical_jacobian]).
    fn jacobian(&mut self, simdat: &DataContainer, matdat: &mut DataContainer, v: &[usize]) -> Result<Matrix> {
        numerical_jacobian(self, simdat, matdat, v)
    }
}

/// Checks that the model is properly set up and registers the Jacobian
///
/// Fails if errors were recorded while setting up, if the parameters are all zero,
/// if the bulk or shear modulus is zero, or if the initial Jacobian is all zeros.
pub fn finish_setup<M>(model: &mut M, simdat: &DataContainer, matdat: &mut DataContainer) -> Result<()>
where
    M: ConstitutiveModel + ?Sized,
{
    let base = model.base_mut();
    if base.diagnostics.error_count() > 0 {
        return base.diagnostics.finish();
    }
    if !base.ui.iter().any(|x| *x != 0.0) {
        return Err(Error::setup(format!("{}: empty ui array", base.name)));
    }
    if base.bulk_modulus == 0.0 {
        return Err(Error::setup(format!("{}: bulk modulus not defined", base.name)));
    }
    if base.shear_modulus == 0.0 {
        return Err(Error::setup(format!("{}: shear modulus not defined", base.name)));
    }
    if model.base().j0.is_none() {
        let isotropic = model.isotropic_init_jacobian();
        compute_init_jacobian(model, simdat, matdat, isotropic)?;
    }

    let base = model.base_mut();
    let j0 = match &base.j0 {
        Some(j0) if j0.as_data().iter().any(|x| *x != 0.0) => j0.clone(),
        _ => return Err(Error::setup(format!("{}: initial Jacobian is empty", base.name))),
    };
    matdat.register("jacobian", DataType::Matrix(6), Init::Value(Value::Matrix(j0)), None)?;

    // initial density
    if let Some(idx) = base.parameters.density_index() {
        let rho = base.ui0.get(idx).copied().unwrap_or(0.0);
        if rho.abs() > f64::EPSILON {
            base.initial_density = rho;
        }
    }
    debug!("{}: set up finished", base.name);
    Ok(())
}

/// Computes the initial material Jacobian
///
/// # Input
///
/// * `isotropic` -- use the closed form for isotropic materials; otherwise compute the full
///   6×6 Jacobian numerically about the current state
pub fn compute_init_jacobian<M>(
    model: &mut M,
    simdat: &DataContainer,
    matdat: &mut DataContainer,
    isotropic: bool,
) -> Result<()>
where
    M: ConstitutiveModel + ?Sized,
{
    let j0 = if isotropic {
        model.base().isotropic_jacobian()
    } else {
        numerical_jacobian(model, simdat, matdat, &[0, 1, 2, 3, 4, 5])?
    };
    model.base_mut().j0 = Some(j0);
    Ok(())
}

/// Returns the submatrix `J[v, v]` of the initial Jacobian
pub fn j0_submatrix(base: &ModelBase, v: &[usize]) -> Result<Matrix> {
    let j0 = base
        .j0
        .as_ref()
        .ok_or_else(|| Error::setup(format!("{}: initial Jacobian is not available", base.name)))?;
    let mut js = Matrix::new(v.len(), v.len());
    for (i, vi) in v.iter().enumerate() {
        for (j, vj) in v.iter().enumerate() {
            js.set(i, j, j0.get(*vi, *vj));
        }
    }
    Ok(js)
}

/// Computes the submatrix `J[v, v]` of the material Jacobian by centered differences
///
/// Each selected component of the rate of deformation D is perturbed by ±(δ/Δt)/2, with
/// δ = √ε_machine, the deformation gradient is recomputed as F = F₀ + D·F₀·Δt, and the
/// model is evaluated. The current slots are stashed before and restored after each
/// evaluation; the old slots are not written.
pub fn numerical_jacobian<M>(
    model: &mut M,
    simdat: &DataContainer,
    matdat: &mut DataContainer,
    v: &[usize],
) -> Result<Matrix>
where
    M: ConstitutiveModel + ?Sized,
{
    let nv = v.len();
    let de = f64::EPSILON.sqrt();
    let mut dt = simdat.scalar_cur("time step")?;
    if dt == 0.0 {
        dt = 1.0;
    }
    let d = matdat.array_cur("rate of deformation")?;
    let f0 = tensor_to_matrix(&matdat.array_old("deformation gradient")?);
    matdat.stash_all(true);

    let mut jac = Matrix::new(nv, nv);
    for i in 0..nv {
        let delta = 0.5 * de / dt;
        let sig_p = perturbed_stress(model, simdat, matdat, &d, &f0, v[i], delta, dt)?;
        let sig_m = perturbed_stress(model, simdat, matdat, &d, &f0, v[i], -delta, dt)?;
        for j in 0..nv {
            jac.set(j, i, (sig_p[v[j]] - sig_m[v[j]]) / de);
        }
    }
    Ok(jac)
}

/// Evaluates the model with one component of D perturbed and restores the current slots
#[allow(clippy::too_many_arguments)]
fn perturbed_stress<M>(
    model: &mut M,
    simdat: &DataContainer,
    matdat: &mut DataContainer,
    d: &[f64],
    f0: &Matrix,
    component: usize,
    delta: f64,
    dt: f64,
) -> Result<Vec<f64>>
where
    M: ConstitutiveModel + ?Sized,
{
    let mut dp = d.to_vec();
    dp[component] += delta;

    // F = F₀ + D·F₀·Δt
    let mut f = f0.clone();
    mat_mat_mul(&mut f, dt, &sym_to_matrix(&dp), f0, 1.0)?;
    matdat.store("rate of deformation", dp)?;
    matdat.store("deformation gradient", matrix_to_tensor(&f))?;
    let res = model
        .update_state(simdat, matdat)
        .and_then(|_| matdat.array_cur("stress"));
    matdat.restore_all();
    res
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
