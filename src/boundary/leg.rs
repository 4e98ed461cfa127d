use super::ControlCode;
use serde::{Deserialize, Serialize};

/// Number of primary control slots
pub const N_LEG_SLOTS: usize = 9;

/// Number of electric field slots
pub const N_EFIELD_SLOTS: usize = 3;

/// Holds one normalized segment of the loading history
///
/// Values are already scaled by the boundary control factors. Strain-type and
/// stress-type slots refer to the components `[11, 22, 33, 12, 23, 13]`;
/// deformation gradient legs use all nine slots in the order `[11, 12, 13, 21, …, 33]`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Leg {
    /// Leg number as given in the legs block
    pub number: i64,

    /// End time of the leg
    pub time: f64,

    /// Number of steps
    pub steps: usize,

    /// Control codes (padded with unused)
    pub codes: [ControlCode; N_LEG_SLOTS],

    /// Prescribed values (padded with zeros)
    pub values: [f64; N_LEG_SLOTS],

    /// Prescribed electric field
    pub efield: [f64; N_EFIELD_SLOTS],
}

impl Leg {
    /// Returns the control codes including the electric field slots
    pub fn full_codes(&self) -> [ControlCode; N_LEG_SLOTS + N_EFIELD_SLOTS] {
        let mut all = [ControlCode::ElectricField; N_LEG_SLOTS + N_EFIELD_SLOTS];
        all[..N_LEG_SLOTS].copy_from_slice(&self.codes);
        all
    }

    /// Returns the prescribed values including the electric field
    pub fn full_values(&self) -> [f64; N_LEG_SLOTS + N_EFIELD_SLOTS] {
        let mut all = [0.0; N_LEG_SLOTS + N_EFIELD_SLOTS];
        all[..N_LEG_SLOTS].copy_from_slice(&self.values);
        all[N_LEG_SLOTS..].copy_from_slice(&self.efield);
        all
    }

    /// Tells whether the leg is driven by the deformation gradient
    pub fn is_deformation_gradient(&self) -> bool {
        self.codes[0] == ControlCode::DeformationGradient
    }

    /// Tells whether any component is stress-type controlled
    pub fn has_stress_control(&self) -> bool {
        self.codes.iter().any(|c| c.is_stress_type())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Leg;
    use crate::boundary::ControlCode;

    #[test]
    fn full_codes_works() {
        let mut codes = [ControlCode::Unused; 9];
        codes[..6].copy_from_slice(&[ControlCode::Strain; 6]);
        codes[0] = ControlCode::Stress;
        let leg = Leg {
            number: 1,
            time: 1.0,
            steps: 10,
            codes,
            values: [0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            efield: [1.0, 2.0, 3.0],
        };
        let all = leg.full_codes();
        assert_eq!(all[0], ControlCode::Stress);
        assert_eq!(all[6], ControlCode::Unused);
        assert_eq!(&all[9..], &[ControlCode::ElectricField; 3]);
        assert_eq!(&leg.full_values()[9..], &[1.0, 2.0, 3.0]);
        assert!(leg.has_stress_control());
        assert!(!leg.is_deformation_gradient());
    }
}
