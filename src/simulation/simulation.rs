use super::{Driver, DriverControl, DriverStats, Output};
use crate::base::{parse_number, Error, Result};
use crate::boundary::Boundary;
use crate::data::{DataContainer, DataType, Init};
use crate::input::{parse_input, MaterialInput, SimulationInput};
use crate::material::{Material, MaterialDatabase, ModelRegistry};
use std::path::Path;
use tracing::info;

/// Allocates the simulation data container
///
/// Holds the time (plotted as `TIME`), the time step (plotted as `TIMESTEP`), the step
/// number and the leg number.
pub fn new_simulation_data(name: &str) -> Result<DataContainer> {
    let mut simdat = DataContainer::new(name);
    simdat.register("time", DataType::Scalar, Init::Default, Some("time"))?;
    simdat.register("time step", DataType::Scalar, Init::Default, Some("timestep"))?;
    simdat.register("step number", DataType::Scalar, Init::Default, None)?;
    simdat.register("leg number", DataType::Scalar, Init::Default, None)?;
    Ok(simdat)
}

/// Holds everything needed to run one simulation
pub struct Simulation {
    /// Simulation name (used to name the output files)
    pub name: String,

    /// Boundary control and legs
    pub boundary: Boundary,

    /// Material (model and material data)
    pub material: Material,

    /// Simulation data
    pub simdat: DataContainer,

    /// Parameters of the stress-control iterations
    pub control: DriverControl,

    /// Write the parameter echo
    pub write_props: bool,
}

impl Simulation {
    /// Allocates a new instance from a parsed simulation block
    ///
    /// # Input
    ///
    /// * `input` -- the simulation block
    /// * `registry` -- the available constitutive models
    /// * `base_dir` -- directory used to resolve relative database paths
    ///
    /// # Options
    ///
    /// * `nowriteprops` -- do not write the parameter echo
    /// * `maxiter <n>` -- maximum number of stress-control iterations
    /// * `tolerance <x>` -- relative tolerance of the stress-control iterations
    /// * `constant_tangent` -- use the initial Jacobian in the stress-control iterations
    pub fn new(input: &SimulationInput, registry: &ModelRegistry, base_dir: Option<&Path>) -> Result<Self> {
        let mut simdat = new_simulation_data(&input.name)?;
        for (keyword, value) in &input.options {
            simdat.register_option(keyword, value.as_str())?;
        }

        let mut control = DriverControl::new();
        if let Some(value) = input.option("maxiter") {
            let n = parse_number(value).ok_or_else(|| Error::parse(format!("invalid maxiter {}", value)))?;
            control.n_max_iterations(n as usize)?;
        }
        if let Some(value) = input.option("tolerance") {
            let tol = parse_number(value).ok_or_else(|| Error::parse(format!("invalid tolerance {}", value)))?;
            control.tol_rel_residual(tol)?;
        }
        control
            .constant_tangent(input.flag("constant_tangent"))?
            .verbose_iterations(input.flag("verbose"))?;

        let boundary = Boundary::parse(&input.block("boundary")?.text(), &input.block("legs")?.text())?;

        let material_input = MaterialInput::from_block(input.block("material")?)?;
        let database = match &material_input.database {
            Some(file) => {
                let path = match base_dir {
                    Some(dir) => dir.join(file),
                    None => Path::new(file).to_path_buf(),
                };
                Some(MaterialDatabase::read_json(&path)?)
            }
            None => None,
        };
        let material = Material::new(
            registry,
            &material_input.model,
            &material_input.parameters,
            database,
            &simdat,
        )?;

        info!(
            "simulation {} set up with {} legs and model {}",
            input.name,
            boundary.legs.len(),
            material.name()
        );
        Ok(Simulation {
            name: input.name.clone(),
            boundary,
            material,
            simdat,
            control,
            write_props: !input.flag("nowriteprops"),
        })
    }

    /// Allocates all simulations defined in the content of an input file
    pub fn from_text(text: &str, registry: &ModelRegistry) -> Result<Vec<Self>> {
        parse_input(text, None)?
            .iter()
            .map(|input| Simulation::new(input, registry, None))
            .collect()
    }

    /// Runs the simulation
    pub fn run(&mut self) -> Result<(Output, DriverStats)> {
        let mut output = Output::new(&self.simdat, &self.material.matdat);
        let driver = Driver::new(&self.boundary, &self.control);
        let stats = driver.run(&mut self.simdat, &mut self.material, &mut output)?;
        info!(
            "simulation {} finished: {} legs, {} steps, {} iterations",
            self.name, stats.n_legs, stats.n_steps, stats.n_iterations
        );
        Ok((output, stats))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{new_simulation_data, Simulation};
    use crate::base::Error;
    use crate::material::ModelRegistry;
    use russell_lab::approx_eq;

    const INPUT: &str = r#"
begin simulation uniaxial strain
  nowriteprops
  maxiter 10
  begin material
    constitutive model elastic
    K 2.0
    G 1.0
  end material
  begin boundary
    kappa 0
    estar 0.5
    begin legs
      0 0.0 0 222222 0.0 0.0 0.0 0.0 0.0 0.0
      1 1.0 5 222222 0.006 0.0 0.0 0.0 0.0 0.0
    end legs
  end boundary
end simulation
"#;

    #[test]
    fn new_simulation_data_works() {
        let simdat = new_simulation_data("test").unwrap();
        assert_eq!(simdat.plot_keys(), &["TIME", "TIMESTEP"]);
        assert!(simdat.contains("leg number"));
    }

    #[test]
    fn from_text_and_run_work() {
        let registry = ModelRegistry::builtin();
        let mut simulations = Simulation::from_text(INPUT, &registry).unwrap();
        assert_eq!(simulations.len(), 1);
        let sim = &mut simulations[0];
        assert_eq!(sim.name, "uniaxial_strain");
        assert!(!sim.write_props);
        assert_eq!(sim.control.n_max_iterations, 10);
        assert!(sim.simdat.get_option("maxiter").is_ok());

        let (output, stats) = sim.run().unwrap();
        assert_eq!(stats.n_legs, 1);
        assert_eq!(stats.n_steps, 5);
        assert_eq!(output.rows.len(), 6);
        // estar scales the strain to 0.003
        approx_eq(output.last("EPS11").unwrap(), 0.003, 1e-15);
        approx_eq(output.last("SIG11").unwrap(), 0.01, 1e-15);
        approx_eq(output.last("TIMESTEP").unwrap(), 0.2, 1e-15);
    }

    #[test]
    fn new_captures_errors() {
        let registry = ModelRegistry::builtin();
        let input = INPUT.replace("constitutive model elastic", "constitutive model kayenta");
        assert!(matches!(
            Simulation::from_text(&input, &registry),
            Err(Error::NotRegistered { .. })
        ));
        let input = INPUT.replace("maxiter 10", "maxiter 0");
        assert!(matches!(Simulation::from_text(&input, &registry), Err(Error::Setup(..))));
    }
}
