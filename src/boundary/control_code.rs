use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the quantity prescribed on one component of a leg
///
/// Note: The fixed numbering follows the digits used in the legs block.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum ControlCode {
    /// Unused slot
    #[default]
    Unused = 0,

    /// Strain rate
    StrainRate = 1,

    /// Strain
    Strain = 2,

    /// Stress rate
    StressRate = 3,

    /// Stress
    Stress = 4,

    /// Deformation gradient
    DeformationGradient = 5,

    /// Electric field
    ElectricField = 6,

    /// Displacement (converted to strain while parsing)
    Displacement = 8,
}

impl ControlCode {
    /// Holds the digits accepted in the legs block
    pub const ALPHABET: &'static str = "1234568";

    /// Returns the code corresponding to a digit of the legs block
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(ControlCode::StrainRate),
            '2' => Some(ControlCode::Strain),
            '3' => Some(ControlCode::StressRate),
            '4' => Some(ControlCode::Stress),
            '5' => Some(ControlCode::DeformationGradient),
            '6' => Some(ControlCode::ElectricField),
            '8' => Some(ControlCode::Displacement),
            _ => None,
        }
    }

    /// Returns the integer tag
    pub fn number(self) -> usize {
        self as usize
    }

    /// Tells whether the code prescribes a strain-type quantity (strain or strain rate)
    pub fn is_strain_type(self) -> bool {
        matches!(self, ControlCode::StrainRate | ControlCode::Strain)
    }

    /// Tells whether the code prescribes a stress-type quantity (stress or stress rate)
    pub fn is_stress_type(self) -> bool {
        matches!(self, ControlCode::StressRate | ControlCode::Stress)
    }

    /// Tells whether the code prescribes a rate
    pub fn is_rate(self) -> bool {
        matches!(self, ControlCode::StrainRate | ControlCode::StressRate)
    }
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Parses a string of control digits such as `222000`
///
/// Returns the offending character on failure.
pub fn parse_control_codes(digits: &str) -> Result<Vec<ControlCode>, char> {
    digits.chars().map(|c| ControlCode::from_digit(c).ok_or(c)).collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
