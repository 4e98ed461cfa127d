use pointsim::*;
use russell_lab::approx_eq;

// Elastic material point under uniaxial strain
//
// TEST GOAL
//
// Verifies that the stress increment of a linear elastic material under a
// strain-controlled leg splits into the volumetric and deviatoric parts
//
// Δσ11 = 3K de_iso + 2G de_dev
// Δσ22 = 3K de_iso -  G de_dev
//
// with de_iso = de/3 and de_dev = 2de/3.
//
// CONFIGURATION AND PARAMETERS
//
// * K = 2, G = 1
// * ε11 = 0.003 reached in 10 steps; all other strain components held at zero

const INPUT: &str = r#"
begin simulation elastic uniaxial strain
  begin material
    constitutive model elastic
    K 2.0
    G 1.0
  end material
  begin boundary
    kappa = 0
    begin legs
      0, 0.0, 0, 222222, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0
      1, 1.0, 10, 222222, 0.003, 0.0, 0.0, 0.0, 0.0, 0.0
    end legs
  end boundary
end simulation
"#;

#[test]
fn test_elastic_uniaxial_strain() -> Result<(), Error> {
    let registry = ModelRegistry::builtin();
    let mut sim = Simulation::from_text(INPUT, &registry)?.remove(0);
    let (output, stats) = sim.run()?;
    assert_eq!(stats.n_steps, 10);
    assert_eq!(stats.n_iterations, 0);

    let (kk, gg, de) = (2.0, 1.0, 0.003);
    let de_iso = de / 3.0;
    let de_dev = 2.0 * de / 3.0;
    let sig11 = output.column("SIG11").unwrap();
    let sig22 = output.column("SIG22").unwrap();
    let eps11 = output.column("EPS11").unwrap();
    assert_eq!(sig11.len(), 11);
    for i in 0..sig11.len() {
        let alpha = (i as f64) / 10.0;
        approx_eq(eps11[i], alpha * de, 1e-15);
        approx_eq(sig11[i], alpha * (3.0 * kk * de_iso + 2.0 * gg * de_dev), 1e-15);
        approx_eq(sig22[i], alpha * (3.0 * kk * de_iso - gg * de_dev), 1e-15);
    }

    // equivalent strain: √(2/3) ‖dev(ε)‖
    approx_eq(output.last("EQVEPS").unwrap(), 2.0 * de / 3.0, 1e-15);
    Ok(())
}
