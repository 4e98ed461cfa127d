/// Number of base dimensions: length, mass, time, temperature, amount, current, luminosity
pub const N_BASE_DIM: usize = 7;

/// Dimension aliases (exponents of the seven base dimensions)
const DIM_ALIASES: [(&str, [i32; N_BASE_DIM]); 56] = [
    ("UNITLESS", [0, 0, 0, 0, 0, 0, 0]),
    ("LENGTH", [1, 0, 0, 0, 0, 0, 0]),
    ("MASS", [0, 1, 0, 0, 0, 0, 0]),
    ("TIME", [0, 0, 1, 0, 0, 0, 0]),
    ("TEMPERATURE", [0, 0, 0, 1, 0, 0, 0]),
    ("DISCRETE_AMOUNT", [0, 0, 0, 0, 1, 0, 0]),
    ("ELECTRIC_CURRENT", [0, 0, 0, 0, 0, 1, 0]),
    ("LUMINOUS_INTENSITY", [0, 0, 0, 0, 0, 0, 1]),
    ("DENSITY_UNITS", [-3, 1, 0, 0, 0, 0, 0]),
    ("TEMPERATURE_UNITS", [0, 0, 0, 1, 0, 0, 0]),
    ("VELOCITY_UNITS", [1, 0, -1, 0, 0, 0, 0]),
    ("SPECIFIC_HEAT_UNITS", [2, 0, -2, -1, 0, 0, 0]),
    ("SPECIFIC_ENERGY_UNITS", [2, 0, -2, 0, 0, 0, 0]),
    ("PRESSURE_UNITS", [-1, 1, -2, 0, 0, 0, 0]),
    ("VISCOSITY_UNITS", [-1, 1, -1, 0, 0, 0, 0]),
    ("VOLUME_UNITS", [3, 0, 0, 0, 0, 0, 0]),
    ("NO_UNITS", [0, 0, 0, 0, 0, 0, 0]),
    ("INV_PRESSURE_UNITS", [1, -1, 2, 0, 0, 0, 0]),
    ("INV_TEMPERATURE_UNITS", [0, 0, 0, -1, 0, 0, 0]),
    ("INV_TIME_UNITS", [0, 0, -1, 0, 0, 0, 0]),
    ("NONDIMENSIONAL_UNITS", [0, 0, 0, 0, 0, 0, 0]),
    ("PRESSURE_INV_UNITS", [1, -1, 2, 0, 0, 0, 0]),
    ("PRESSURE_OVER_LENGTH_UNITS", [-2, 1, -2, 0, 0, 0, 0]),
    ("PRESSURE_INV_UNITS_SQ", [2, -2, -4, 0, 0, 0, 0]),
    ("TIME_INV_UNITS", [0, 0, -1, 0, 0, 0, 0]),
    ("LENGTH_UNITS", [1, 0, 0, 0, 0, 0, 0]),
    ("MASS_UNITS", [0, 1, 0, 0, 0, 0, 0]),
    ("TIME_UNITS", [0, 0, 1, 0, 0, 0, 0]),
    ("RATE_UNITS", [0, 0, -1, 0, 0, 0, 0]),
    ("SQUARED_INV_PRESSURE_UNITS", [2, -2, -4, 0, 0, 0, 0]),
    ("STIFFNESS_UNITS", [-2, 1, -2, 0, 0, 0, 0]),
    ("VORTICITY_UNITS", [0, 0, -1, 0, 0, 0, 0]),
    ("NOT_SPECIFIED", [0, 0, 0, 0, 0, 0, 0]),
    ("POSITION", [1, 0, 0, 0, 0, 0, 0]),
    ("VELOCITY", [1, 0, -1, 0, 0, 0, 0]),
    ("ACCELERATION", [1, 0, -2, 0, 0, 0, 0]),
    ("FORCE", [1, 1, -2, 0, 0, 0, 0]),
    ("STRESS", [-1, 1, -2, 0, 0, 0, 0]),
    ("STRAIN", [0, 0, 0, 0, 0, 0, 0]),
    ("DENSITY", [-3, 1, 0, 0, 0, 0, 0]),
    ("SPECIFIC_HEAT_CAPACITY", [2, 0, -2, -1, 0, 0, 0]),
    ("VOLUME", [3, 0, 0, 0, 0, 0, 0]),
    ("ENERGY_UNITS", [2, 1, -2, 0, 0, 0, 0]),
    ("GAS_CONSTANT_UNITS", [2, 1, -2, -1, -1, 0, 0]),
    ("CAPACITANCE_UNITS", [-2, -1, 4, 0, 0, 2, 0]),
    ("PERMITTIVITY_UNITS", [-3, -1, 4, 0, 0, 2, 0]),
    ("INV_PERMITTIVITY_UNITS", [3, 1, -4, 0, 0, -2, 0]),
    ("RESISTANCE_UNITS", [2, 1, -3, 0, 0, -2, 0]),
    ("ELECTRIC_POTENTIAL_UNITS", [2, 1, -3, 0, 0, -1, 0]),
    ("ELECTRIC_FIELD_UNITS", [1, 1, -3, 0, 0, -1, 0]),
    ("POLARIZATION_UNITS", [0, 0, 0, 0, 0, 0, 0]),
    ("INV_POLARIZATION_UNITS_SQ", [0, 0, 0, 0, 0, 0, 0]),
    ("ANGLE_UNITS", [0, 0, 0, 0, 0, 0, 0]),
    ("FREQUENCY_UNITS", [0, 0, -1, 0, 0, 0, 0]),
    ("AREA_UNITS", [2, 0, 0, 0, 0, 0, 0]),
    ("POWER_UNITS", [2, 1, -3, 0, 0, 0, 0]),
];

/// Resolves a units string to the exponents of the seven base dimensions
///
/// The units string is either an alias (case-insensitive), e.g., `PRESSURE_UNITS`,
/// or a quotient of aliases joined by `_OVER_`, e.g., `PRESSURE_UNITS_OVER_DENSITY_UNITS`.
pub fn unit_dimensions(units: &str) -> Option<[i32; N_BASE_DIM]> {
    let upper = units.trim().to_uppercase().replace(' ', "_");
    if upper.is_empty() {
        return None;
    }
    if let Some(dims) = lookup(&upper) {
        return Some(dims);
    }
    let mut parts = upper.split("_OVER_");
    let mut dims = lookup(parts.next()?)?;
    for part in parts {
        let other = lookup(part)?;
        for i in 0..N_BASE_DIM {
            dims[i] -= other[i];
        }
    }
    Some(dims)
}

/// Returns whether the units string can be resolved
pub fn is_valid_units(units: &str) -> bool {
    unit_dimensions(units).is_some()
}

fn lookup(alias: &str) -> Option<[i32; N_BASE_DIM]> {
    DIM_ALIASES.iter().find(|(name, _)| *name == alias).map(|(_, dims)| *dims)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{is_valid_units, unit_dimensions};

    #[test]
    fn unit_dimensions_works() {
        assert_eq!(unit_dimensions("pressure_units"), Some([-1, 1, -2, 0, 0, 0, 0]));
        assert_eq!(unit_dimensions("NO_UNITS"), Some([0; 7]));
        assert_eq!(
            unit_dimensions("PRESSURE_UNITS_OVER_DENSITY_UNITS"),
            Some([2, 0, -2, 0, 0, 0, 0])
        );
        assert_eq!(unit_dimensions("PRESSURE_UNITS_OVER_BANANAS"), None);
        assert_eq!(unit_dimensions(""), None);
    }

    #[test]
    fn is_valid_units_works() {
        assert!(is_valid_units("stress"));
        assert!(is_valid_units("Density Units"));
        assert!(!is_valid_units("furlongs"));
    }
}
