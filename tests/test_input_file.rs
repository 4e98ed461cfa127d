use pointsim::*;
use russell_lab::approx_eq;
use std::fs;
use std::path::Path;

// Complete input file
//
// TEST GOAL
//
// Reads an input file with two simulations sharing a material block (spliced
// with `use`), one with explicit legs and one with tabular legs, a material
// database in a JSON file, and writes the output table, the parameter echo
// and the run summary.
//
// CONFIGURATION AND PARAMETERS
//
// * Material "soft" from the database: K = 5, G = 3
// * Simulation 1: volumetric strain 0.03 (each normal strain 0.01)
// * Simulation 2: the same path given as a table with time increments

const DATABASE: &str = r#"{ "materials": { "soft": { "K": 5.0, "G": 3.0 } } }"#;

const INPUT: &str = r#"
# shared material
begin soft_material
  begin material
    constitutive model hooke
    database materials.json
    material soft
  end material
end soft_material

begin simulation volumetric explicit
  use soft_material
  begin boundary
    kappa 0.0
    $ six strain components are not needed for volumetric legs
    begin legs
      0 0.0 0 2 0.0
      1 1.0 10 2 0.03     # final volumetric strain
    end legs
  end boundary
end simulation

begin simulation volumetric table
  use soft_material
  nowriteprops
  begin boundary
    stepstar 5
    begin legs
      using dt vstrain
      0.0 0.0
      0.5 0.015
      0.5 0.03
    end legs
  end boundary
end simulation
"#;

#[test]
fn test_input_file() -> Result<(), Error> {
    let dir = Path::new("/tmp/pointsim/test_input_file");
    fs::create_dir_all(dir)?;
    fs::write(dir.join("materials.json"), DATABASE)?;
    fs::write(dir.join("volumetric.inp"), INPUT)?;

    let inputs = read_input_file(&dir.join("volumetric.inp"))?;
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].name, "volumetric_explicit");
    assert_eq!(inputs[1].name, "volumetric_table");

    let registry = ModelRegistry::builtin();
    let mut finals = Vec::new();
    for input in &inputs {
        let mut sim = Simulation::new(input, &registry, Some(dir))?;
        assert_eq!(sim.material.name(), "elastic");
        let (output, stats) = sim.run()?;
        assert_eq!(stats.n_steps, 10);

        // σ = 3K ε_vol/3 for each normal component
        approx_eq(output.last("EPS11").unwrap(), 0.01, 1e-15);
        approx_eq(output.last("EPS33").unwrap(), 0.01, 1e-15);
        approx_eq(output.last("SIG22").unwrap(), 3.0 * 5.0 * 0.01, 1e-14);
        approx_eq(output.last("SIG12").unwrap(), 0.0, 1e-15);
        approx_eq(output.last("TIME").unwrap(), 1.0, 1e-15);

        output.write_table(&dir.join(format!("{}.out", sim.name)))?;
        if sim.write_props {
            write_props(&dir.join(format!("{}.props", sim.name)), &sim.material.parameter_echo())?;
        }
        let summary = RunSummary::new(&sim, &output, &stats)?;
        summary.write_json(&dir.join(format!("{}.json", sim.name)))?;
        finals.push(summary.final_stress);
    }
    assert_eq!(finals[0].len(), 6);
    for i in 0..6 {
        approx_eq(finals[0][i], finals[1][i], 1e-14);
    }

    // output files
    let table = fs::read_to_string(dir.join("volumetric_explicit.out"))?;
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[0].starts_with("TIME TIMESTEP SIG11"));
    let props = fs::read_to_string(dir.join("volumetric_explicit.props"))?;
    assert!(props.contains("K =    5.00000e0"));
    assert!(!dir.join("volumetric_table.props").exists());
    let summary = RunSummary::read_json(&dir.join("volumetric_table.json"))?;
    assert_eq!(summary.n_rows, 11);
    Ok(())
}
