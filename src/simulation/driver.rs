use super::{DriverControl, Output};
use crate::base::{
    determinant, inverse_and_determinant, matrix_to_sym, matrix_to_tensor, sym_norm, sym_to_matrix, tensor_to_matrix,
    Error, Result,
};
use crate::boundary::{Boundary, ControlCode, Emit, Leg};
use crate::data::{DataContainer, Value};
use crate::material::{j0_submatrix, Material};
use russell_lab::{mat_inverse, mat_mat_mul, mat_vec_mul, Matrix, Vector};
use tracing::{debug, info};

/// Number of strain or stress components
const N_SYM: usize = 6;

/// Holds the counters of a run
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverStats {
    /// Number of legs run (excluding the first and the zero-duration ones)
    pub n_legs: usize,

    /// Number of time steps
    pub n_steps: usize,

    /// Number of Newton iterations (stress control)
    pub n_iterations: usize,
}

/// Identifies a time step in error messages
#[derive(Clone, Copy)]
struct StepId {
    leg: i64,
    step: usize,
}

impl StepId {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Numerical {
            leg: self.leg,
            step: self.step,
            message: message.into(),
        }
    }

    /// Adds the leg and step to errors raised by the model or the containers
    fn wrap(&self, err: Error) -> Error {
        match err {
            Error::Numerical { .. } => err,
            _ => self.error(err.to_string()),
        }
    }
}

/// Drives a material through the legs
///
/// The first leg defines the initial time; each subsequent leg is run from the end time
/// of the previous leg to its own end time in `max(1, steps)` equal increments. Targets are
/// linearly interpolated between the state at the start of the leg and the leg values.
///
/// Strain-type components give the rate of deformation directly:
///
/// ```text
/// dᵢ = (ε*ᵢ - εᵢ) / (Δt (1 + κ εᵢ))
/// ```
///
/// Stress-type components are found by Newton iterations using the material Jacobian:
///
/// ```text
/// d_V ← d_V - J_VV⁻¹ (σ_V - σ*_V) / Δt
/// ```
///
/// where V is the set of stress-controlled components.
pub struct Driver<'a> {
    boundary: &'a Boundary,
    control: &'a DriverControl,
}

impl<'a> Driver<'a> {
    /// Allocates a new instance
    pub fn new(boundary: &'a Boundary, control: &'a DriverControl) -> Self {
        Driver { boundary, control }
    }

    /// Runs all legs
    ///
    /// # Input
    ///
    /// * `simdat` -- simulation data (time, time step, step number, leg number)
    /// * `material` -- the material (its data container is updated)
    /// * `output` -- receives one row per emitted step (and the initial state)
    pub fn run(&self, simdat: &mut DataContainer, material: &mut Material, output: &mut Output) -> Result<DriverStats> {
        let legs = &self.boundary.legs;
        let first = match legs.first() {
            Some(leg) => leg,
            None => return Err(Error::setup("there are no legs to run")),
        };
        let mut stats = DriverStats::default();
        let mut t = first.time;
        simdat.store_old("time", t)?;
        simdat.store("time", t)?;
        output.push_row(simdat, &material.matdat);

        for leg in &legs[1..] {
            if leg.time - t <= 0.0 {
                debug!("skipping leg {} with zero duration", leg.number);
                t = leg.time;
                continue;
            }
            self.run_leg(leg, t, simdat, material, output, &mut stats)?;
            t = leg.time;
            stats.n_legs += 1;
        }
        Ok(stats)
    }

    /// Runs one leg starting at `t_beg`
    fn run_leg(
        &self,
        leg: &Leg,
        t_beg: f64,
        simdat: &mut DataContainer,
        material: &mut Material,
        output: &mut Output,
        stats: &mut DriverStats,
    ) -> Result<()> {
        let nsteps = usize::max(1, leg.steps);
        let dt = (leg.time - t_beg) / (nsteps as f64);
        let matdat = &material.matdat;
        let eps0 = matdat.array_old("strain")?;
        let sig0 = matdat.array_old("stress")?;
        let f0 = matdat.array_old("deformation gradient")?;
        let efield0 = if matdat.contains("electric field") {
            Some(matdat.array_old("electric field")?)
        } else {
            None
        };
        simdat.store("leg number", leg.number as f64)?;
        simdat.advance("leg number")?;

        let bc = &self.boundary.control;
        let print_every = match bc.emit {
            Emit::All if bc.nprints > 0 => usize::max(1, nsteps / bc.nprints),
            _ => 1,
        };

        for n in 0..nsteps {
            let id = StepId {
                leg: leg.number,
                step: n + 1,
            };
            let alpha = ((n + 1) as f64) / (nsteps as f64);
            simdat.store("time", t_beg + ((n + 1) as f64) * dt)?;
            simdat.store("time step", dt)?;
            simdat.store("step number", (stats.n_steps + 1) as f64)?;

            if let Some(ef0) = &efield0 {
                let ef: Vec<f64> = (0..3).map(|i| ef0[i] + alpha * (leg.efield[i] - ef0[i])).collect();
                material.matdat.store("electric field", ef)?;
            }

            let iterations = if leg.is_deformation_gradient() {
                let f: Vec<f64> = (0..9).map(|k| f0[k] + alpha * (leg.values[k] - f0[k])).collect();
                let f_target = tensor_to_matrix(&f);
                self.deformation_gradient_step(&f_target, dt, id, simdat, material)
            } else {
                self.mixed_step(leg, alpha, &eps0, &sig0, dt, id, simdat, material)
            }
            .map_err(|e| id.wrap(e))?;

            self.finish_step(dt, id, simdat, material).map_err(|e| id.wrap(e))?;
            stats.n_steps += 1;
            stats.n_iterations += iterations;

            let last = n + 1 == nsteps;
            let emit = match bc.emit {
                Emit::All => last || (n + 1) % print_every == 0,
                Emit::Sparse => last,
            };
            if emit {
                output.push_row(simdat, &material.matdat);
            }
        }

        let message = format!("leg {} finished at t = {} after {} steps", leg.number, leg.time, nsteps);
        if bc.screenout {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
        Ok(())
    }

    /// Performs a step with strain-type and stress-type components
    ///
    /// Returns the number of Newton iterations.
    #[allow(clippy::too_many_arguments)]
    fn mixed_step(
        &self,
        leg: &Leg,
        alpha: f64,
        eps0: &[f64],
        sig0: &[f64],
        dt: f64,
        id: StepId,
        simdat: &DataContainer,
        material: &mut Material,
    ) -> Result<usize> {
        let kappa = self.boundary.control.kappa;
        let eps_old = material.matdat.array_old("strain")?;
        let sig_old = material.matdat.array_old("stress")?;

        // strain-type components and stress targets
        let mut d = [0.0; N_SYM];
        let mut v = Vec::new();
        let mut sig_target = Vec::new();
        for i in 0..N_SYM {
            let value = leg.values[i];
            match leg.codes[i] {
                ControlCode::Strain => {
                    let target = eps0[i] + alpha * (value - eps0[i]);
                    d[i] = (target - eps_old[i]) / (dt * (1.0 + kappa * eps_old[i]));
                }
                ControlCode::StrainRate => d[i] = value / (1.0 + kappa * eps_old[i]),
                ControlCode::Stress => {
                    v.push(i);
                    sig_target.push(sig0[i] + alpha * (value - sig0[i]));
                }
                ControlCode::StressRate => {
                    v.push(i);
                    sig_target.push(sig_old[i] + value * dt);
                }
                _ => (), // held strain
            }
        }

        if v.is_empty() {
            self.evaluate(&d, None, dt, simdat, material)?;
            return Ok(0);
        }
        material.matdat.store("prescribed stress", sig_target.clone())?;
        material
            .matdat
            .store("prescribed stress components", Value::Integers(v.iter().map(|&i| i as i64).collect()))?;

        // predictor with the initial Jacobian: J0_VV d_V = (σ*_V - σ_V)/Δt - J0_VS d_S
        let j0_vv = j0_submatrix(material.model.base(), &v)?;
        let j0 = j0_submatrix(material.model.base(), &[0, 1, 2, 3, 4, 5])?;
        let mut rhs = vec![0.0; v.len()];
        for (r, &i) in v.iter().enumerate() {
            rhs[r] = (sig_target[r] - sig_old[i]) / dt;
            for k in 0..N_SYM {
                if !v.contains(&k) {
                    rhs[r] -= j0.get(i, k) * d[k];
                }
            }
        }
        let dv = solve(&j0_vv, &rhs)?;
        for (r, &i) in v.iter().enumerate() {
            d[i] = dv[r];
        }

        // corrector
        for iteration in 0..self.control.n_max_iterations {
            let sig = self.evaluate(&d, None, dt, simdat, material)?;
            let residual: Vec<f64> = v.iter().zip(&sig_target).map(|(&i, s)| sig[i] - s).collect();
            let max_abs_residual = residual.iter().fold(0.0, |acc, r| f64::max(acc, r.abs()));
            let scale = sig.iter().chain(&sig_target).fold(0.0, |acc, s| f64::max(acc, s.abs()));
            if self.control.verbose_iterations {
                debug!("iteration {}: max |σ - σ*| = {:e}", iteration, max_abs_residual);
            }
            if max_abs_residual <= self.control.tolerance(scale) {
                return Ok(iteration);
            }
            let jac = if self.control.constant_tangent {
                j0_vv.clone()
            } else {
                material.jacobian(simdat, &v)?
            };
            let delta = solve(&jac, &residual)?;
            for (r, &i) in v.iter().enumerate() {
                d[i] -= delta[r] / dt;
            }
        }
        Err(id.error(format!(
            "stress control did not converge after {} iterations",
            self.control.n_max_iterations
        )))
    }

    /// Performs a step with prescribed deformation gradient
    ///
    /// The rate of deformation is the symmetric part of the velocity gradient
    /// `L = Ḟ·F⁻¹` evaluated at the middle of the step.
    fn deformation_gradient_step(
        &self,
        f_target: &Matrix,
        dt: f64,
        id: StepId,
        simdat: &DataContainer,
        material: &mut Material,
    ) -> Result<usize> {
        let f_old = tensor_to_matrix(&material.matdat.array_old("deformation gradient")?);
        let mut f_dot = Matrix::new(3, 3);
        let mut f_mid = Matrix::new(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                f_dot.set(i, j, (f_target.get(i, j) - f_old.get(i, j)) / dt);
                f_mid.set(i, j, 0.5 * (f_target.get(i, j) + f_old.get(i, j)));
            }
        }
        let (f_mid_inv, _) =
            inverse_and_determinant(&f_mid).ok_or_else(|| id.error("deformation gradient at mid step is singular"))?;
        let mut ll = Matrix::new(3, 3);
        mat_mat_mul(&mut ll, 1.0, &f_dot, &f_mid_inv, 0.0)?;
        let d = matrix_to_sym(&ll);
        self.evaluate(&d, Some(f_target), dt, simdat, material)?;
        Ok(0)
    }

    /// Stores the kinematics for a rate of deformation and updates the material state
    ///
    /// Returns the (current) stress.
    fn evaluate(
        &self,
        d: &[f64; N_SYM],
        f_prescribed: Option<&Matrix>,
        dt: f64,
        simdat: &DataContainer,
        material: &mut Material,
    ) -> Result<Vec<f64>> {
        let kappa = self.boundary.control.kappa;
        let matdat = &mut material.matdat;
        let eps_old = matdat.array_old("strain")?;
        let eqv_old = matdat.scalar_old("equivalent strain")?;

        // F = F₀ + D·F₀·Δt (unless prescribed)
        let f = match f_prescribed {
            Some(f) => f.clone(),
            None => {
                let f_old = tensor_to_matrix(&matdat.array_old("deformation gradient")?);
                let mut f = f_old.clone();
                mat_mat_mul(&mut f, dt, &sym_to_matrix(d), &f_old, 1.0)?;
                f
            }
        };

        // ε += (1 + κ ε) ∘ D Δt
        let mut eps = [0.0; N_SYM];
        for i in 0..N_SYM {
            eps[i] = eps_old[i] + (1.0 + kappa * eps_old[i]) * d[i] * dt;
        }

        // equivalent strain increment √(2/3) ‖dev(D)‖ Δt
        let mean = (d[0] + d[1] + d[2]) / 3.0;
        let dev = [d[0] - mean, d[1] - mean, d[2] - mean, d[3], d[4], d[5]];
        let eqv = eqv_old + f64::sqrt(2.0 / 3.0) * sym_norm(&dev) * dt;

        matdat.store("rate of deformation", d.to_vec())?;
        matdat.store("deformation gradient", matrix_to_tensor(&f))?;
        matdat.store("strain", eps.to_vec())?;
        matdat.store("equivalent strain", eqv)?;
        material.update_state(simdat)?;
        material.matdat.array_cur("stress")
    }

    /// Stores the rates, checks the state and advances the containers
    fn finish_step(&self, dt: f64, id: StepId, simdat: &mut DataContainer, material: &mut Material) -> Result<()> {
        let matdat = &mut material.matdat;
        let sig = matdat.array_cur("stress")?;
        let sig_old = matdat.array_old("stress")?;
        let eps = matdat.array_cur("strain")?;
        let eps_old = matdat.array_old("strain")?;
        let f = matdat.array_cur("deformation gradient")?;

        for (name, values) in [("stress", &sig), ("strain", &eps), ("deformation gradient", &f)] {
            if values.iter().any(|x| !x.is_finite()) {
                return Err(id.error(format!("non-finite {} encountered", name)));
            }
        }
        let jacobian = determinant(&tensor_to_matrix(&f));
        if jacobian <= 0.0 {
            return Err(id.error(format!(
                "deformation gradient has a non-positive determinant {}",
                jacobian
            )));
        }

        let sig_rate: Vec<f64> = sig.iter().zip(&sig_old).map(|(s, s0)| (s - s0) / dt).collect();
        let eps_rate: Vec<f64> = eps.iter().zip(&eps_old).map(|(e, e0)| (e - e0) / dt).collect();
        matdat.store("stress rate", sig_rate)?;
        matdat.store("strain rate", eps_rate)?;

        simdat.advance_all();
        matdat.advance_all();
        Ok(())
    }
}

/// Solves the small dense system `a x = b`
fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    let mut ai = Matrix::new(n, n);
    mat_inverse(&mut ai, a)?;
    let mut x = Vector::new(n);
    mat_vec_mul(&mut x, 1.0, &ai, &Vector::from(&b))?;
    Ok(x.as_data().clone())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Driver;
    use crate::base::Error;
    use crate::boundary::Boundary;
    use crate::material::{Material, ModelRegistry};
    use crate::simulation::{new_simulation_data, DriverControl, Output};
    use russell_lab::approx_eq;

    fn run(
        model: &str,
        params: &str,
        boundary: &str,
        legs: &str,
        control: &DriverControl,
    ) -> Result<(Material, Output), Error> {
        let registry = ModelRegistry::builtin();
        let boundary = Boundary::parse(boundary, legs)?;
        let mut simdat = new_simulation_data("test")?;
        let mut material = Material::new(&registry, model, params, None, &simdat)?;
        let mut output = Output::new(&simdat, &material.matdat);
        let driver = Driver::new(&boundary, control);
        driver.run(&mut simdat, &mut material, &mut output)?;
        Ok((material, output))
    }

    #[test]
    fn uniaxial_strain_works() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 1 222222 0.003 0 0 0 0 0";
        let (material, output) = run("elastic", "K 2\nG 1", "", legs, &DriverControl::new()).unwrap();
        // Δσ11 = 3K de_iso + 2G de_dev
        let (kk, gg) = (2.0, 1.0);
        let de_iso = 0.003 / 3.0;
        let de_dev = 0.003 - de_iso;
        let expected = 3.0 * kk * de_iso + 2.0 * gg * de_dev;
        let sig = material.matdat.array_old("stress").unwrap();
        approx_eq(sig[0], expected, 1e-15);
        approx_eq(sig[1], 3.0 * kk * de_iso - gg * de_dev, 1e-15);
        assert_eq!(output.rows.len(), 2);
        approx_eq(output.last("SIG11").unwrap(), expected, 1e-15);
        approx_eq(output.last("EPS11").unwrap(), 0.003, 1e-15);
        approx_eq(output.last("TIME").unwrap(), 1.0, 1e-15);
    }

    #[test]
    fn strain_rate_and_zero_duration_legs_work() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n\
                    1 2 10 111111 0.001 0 0 0 0 0\n\
                    2 2 10 222222 0 0 0 0 0 0\n\
                    3 3 10 222222 0.001 0 0 0 0 0\n";
        let (material, output) = run("elastic", "K 2\nG 1", "", legs, &DriverControl::new()).unwrap();
        let eps = output.column("EPS11").unwrap();
        assert_eq!(eps.len(), 21);
        approx_eq(eps[10], 0.002, 1e-15);
        approx_eq(eps[20], 0.001, 1e-15);
        let d = material.matdat.array_old("strain rate").unwrap();
        approx_eq(d[0], -0.001, 1e-13);
    }

    #[test]
    fn uniaxial_stress_works() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 10 244222 0.01 0 0 0 0 0";
        let (material, _) = run("elastic", "K 2\nG 1", "", legs, &DriverControl::new()).unwrap();
        let (kk, gg) = (2.0, 1.0);
        let young = 9.0 * kk * gg / (3.0 * kk + gg);
        let poisson = (3.0 * kk - 2.0 * gg) / (2.0 * (3.0 * kk + gg));
        let sig = material.matdat.array_old("stress").unwrap();
        let eps = material.matdat.array_old("strain").unwrap();
        approx_eq(sig[0], young * 0.01, 1e-12);
        approx_eq(sig[1], 0.0, 1e-12);
        approx_eq(sig[2], 0.0, 1e-12);
        approx_eq(eps[1], -poisson * 0.01, 1e-12);
    }

    #[test]
    fn full_stress_control_works() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 10 444444 0.01 0 0 0 0 0";
        let (material, _) = run("elastic", "K 2\nG 1", "", legs, &DriverControl::new()).unwrap();
        let young = 18.0 / 7.0;
        let poisson = 2.0 / 7.0;
        let eps = material.matdat.array_old("strain").unwrap();
        approx_eq(eps[0], 0.01 / young, 1e-12);
        approx_eq(eps[1], -poisson * 0.01 / young, 1e-12);
        approx_eq(eps[3], 0.0, 1e-12);
    }

    #[test]
    fn plastic_stress_control_works() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 10 444444 1.2 0 0 0 0 0";
        let params = "K 10\nG 4\nY0 1\nH 0.5";
        let (material, _) = run("von mises", params, "", legs, &DriverControl::new()).unwrap();
        let eqps = material.matdat.scalar_old("equivalent plastic strain").unwrap();
        approx_eq(eqps, (1.2 - 1.0) / 0.5, 1e-8);
        let sig = material.matdat.array_old("stress").unwrap();
        approx_eq(sig[0], 1.2, 1e-8);
        approx_eq(sig[1], 0.0, 1e-8);

        let mut control = DriverControl::new();
        control.n_max_iterations(1).unwrap().constant_tangent(true).unwrap();
        match run("von mises", params, "", legs, &control) {
            Err(Error::Numerical { leg, message, .. }) => {
                assert_eq!(leg, 1);
                assert!(message.contains("did not converge"));
            }
            _ => panic!("expected Numerical"),
        }
    }

    #[test]
    fn identity_deformation_gradient_gives_zero_stress() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 5 555555555 1 0 0 0 1 0 0 0 1";
        for model in ["elastic", "finite elastic"] {
            let (material, _) = run(model, "K 10\nG 4", "", legs, &DriverControl::new()).unwrap();
            assert_eq!(material.matdat.array_old("stress").unwrap(), &[0.0; 6]);
            assert_eq!(material.matdat.array_old("strain").unwrap(), &[0.0; 6]);
        }
        let (material, _) = run("finite elastic", "K 10\nG 4", "", legs, &DriverControl::new()).unwrap();
        assert_eq!(material.matdat.array_old("green strain").unwrap(), &[0.0; 6]);
        assert_eq!(material.matdat.array_old("pk2 stress").unwrap(), &[0.0; 6]);
    }

    #[test]
    fn deformation_gradient_control_works() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 20 555555555 1.1 0 0 0 1 0 0 0 1";
        let (material, _) = run("elastic", "K 10\nG 4", "", legs, &DriverControl::new()).unwrap();
        let f = material.matdat.array_old("deformation gradient").unwrap();
        approx_eq(f[0], 1.1, 1e-15);
        // logarithmic strain (midpoint rule is exact for a uniaxial stretch history)
        let eps = material.matdat.array_old("strain").unwrap();
        let expected: f64 = (0..20)
            .map(|n| {
                let (a, b) = (1.0 + 0.1 * (n as f64) / 20.0, 1.0 + 0.1 * ((n + 1) as f64) / 20.0);
                (b - a) / (0.5 * (a + b))
            })
            .sum();
        approx_eq(eps[0], expected, 1e-14);
        approx_eq(eps[0], f64::ln(1.1), 1e-4);
        approx_eq(eps[1], 0.0, 1e-15);
    }

    #[test]
    fn emit_options_work() {
        let legs = "0 0 0 222222 0 0 0 0 0 0\n1 1 10 222222 0.01 0 0 0 0 0\n2 2 10 222222 0 0 0 0 0 0";
        let (_, output) = run("elastic", "K 2\nG 1", "emit sparse", legs, &DriverControl::new()).unwrap();
        assert_eq!(output.rows.len(), 3);
        let (_, output) = run("elastic", "K 2\nG 1", "nprints 5", legs, &DriverControl::new()).unwrap();
        assert_eq!(output.rows.len(), 11);
        let (_, output) = run("elastic", "K 2\nG 1", "", legs, &DriverControl::new()).unwrap();
        assert_eq!(output.rows.len(), 21);
    }
}
