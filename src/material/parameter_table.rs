use crate::base::{is_valid_units, Error, Result};

/// Holds the names of parameters interpreted as the initial density
const DENSITY_NAMES: [&str; 3] = ["density", "rho", "rho0"];

/// Defines a parameter to be registered by a constitutive model
///
/// # Examples
///
/// ```
/// use pointsim::ParameterDef;
/// let def = ParameterDef::new("G", 1)
///     .aliases(&["MU", "SHMOD"])
///     .units("PRESSURE_UNITS");
/// assert_eq!(def.index, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ParameterDef<'a> {
    /// Name as shown to the user
    pub name: &'a str,

    /// Position in the user input array
    pub index: usize,

    /// Alternative names
    pub aliases: &'a [&'a str],

    /// Default value
    pub default: f64,

    /// Units (alias of the unit dimension table)
    pub units: &'a str,

    /// Indicates that the value can be given by the user
    pub parseable: bool,

    /// Long description
    pub description: &'a str,
}

impl<'a> ParameterDef<'a> {
    /// Allocates a new definition with default settings
    pub fn new(name: &'a str, index: usize) -> Self {
        ParameterDef {
            name,
            index,
            aliases: &[],
            default: 0.0,
            units: "NO_UNITS",
            parseable: true,
            description: "No description available",
        }
    }

    /// Sets the aliases
    pub fn aliases(mut self, aliases: &'a [&'a str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets the default value
    pub fn default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    /// Sets the units
    pub fn units(mut self, units: &'a str) -> Self {
        self.units = units;
        self
    }

    /// Sets whether the value can be given by the user
    pub fn parseable(mut self, parseable: bool) -> Self {
        self.parseable = parseable;
        self
    }

    /// Sets the description
    pub fn description(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }
}

/// Holds a registered parameter
#[derive(Clone, Debug)]
pub struct RegisteredParameter {
    /// Name as given at registration
    pub full_name: String,

    /// Normalized name followed by the normalized aliases
    pub names: Vec<String>,

    /// Position in the user input array
    pub index: usize,

    /// Units
    pub units: String,

    /// Default value
    pub default: f64,

    /// Indicates that the value can be given by the user
    pub parseable: bool,

    /// Long description
    pub description: String,
}

/// Implements the table of parameters registered by a constitutive model
#[derive(Clone, Debug, Default)]
pub struct ParameterTable {
    params: Vec<RegisteredParameter>,
}

/// Normalizes a parameter name (lower case, spaces replaced by underscores)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl ParameterTable {
    /// Allocates a new empty table
    pub fn new() -> Self {
        ParameterTable::default()
    }

    /// Registers a new parameter
    ///
    /// Fails if the units are not valid or if the index or any of the names has been registered already.
    pub fn register(&mut self, def: ParameterDef) -> Result<()> {
        if !is_valid_units(def.units) {
            return Err(Error::InvalidUnits {
                name: def.name.to_string(),
                units: def.units.to_string(),
            });
        }
        let mut names = vec![normalize_name(def.name)];
        names.extend(def.aliases.iter().map(|a| normalize_name(a)));
        for name in &names {
            if self.find(name).is_some() {
                return Err(Error::DuplicateParameter(format!(
                    "name {} of {} is already registered",
                    name, def.name
                )));
            }
        }
        if let Some(other) = self.params.iter().find(|p| p.index == def.index) {
            return Err(Error::DuplicateParameter(format!(
                "index {} of {} is already taken by {}",
                def.index, def.name, other.full_name
            )));
        }
        self.params.push(RegisteredParameter {
            full_name: def.name.to_string(),
            names,
            index: def.index,
            units: def.units.to_string(),
            default: def.default,
            parseable: def.parseable,
            description: def.description.to_string(),
        });
        Ok(())
    }

    /// Finds a parameter by name or alias (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&RegisteredParameter> {
        let key = normalize_name(name);
        self.params.iter().find(|p| p.names.iter().any(|n| n == &key))
    }

    /// Returns the index of a parameter given its name or alias
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|p| p.index)
    }

    /// Returns the name of the parameter at a given index
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.params.iter().find(|p| p.index == index).map(|p| p.full_name.as_str())
    }

    /// Returns the index of the parameter holding the density, if any
    pub fn density_index(&self) -> Option<usize> {
        self.params
            .iter()
            .find(|p| p.names.iter().any(|n| DENSITY_NAMES.contains(&n.as_str())))
            .map(|p| p.index)
    }

    /// Returns the number of properties (size of the user input array)
    pub fn nprop(&self) -> usize {
        self.params.iter().map(|p| p.index + 1).max().unwrap_or(0)
    }

    /// Returns the parameters sorted by index
    pub fn sorted(&self) -> Vec<&RegisteredParameter> {
        let mut sorted: Vec<_> = self.params.iter().collect();
        sorted.sort_by_key(|p| p.index);
        sorted
    }

    /// Returns the number of registered parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns whether no parameter has been registered
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{ParameterDef, ParameterTable};
    use crate::base::Error;

    #[test]
    fn register_works() {
        let mut table = ParameterTable::new();
        table
            .register(ParameterDef::new("NU", 3).aliases(&["POISSONS", "POISSONS RATIO"]))
            .unwrap();
        table
            .register(ParameterDef::new("RHO", 0).aliases(&["DENSITY"]).units("DENSITY_UNITS"))
            .unwrap();
        assert_eq!(table.index_of("poissons ratio"), Some(3));
        assert_eq!(table.index_of("Poissons_Ratio"), Some(3));
        assert_eq!(table.name_of(0), Some("RHO"));
        assert_eq!(table.density_index(), Some(0));
        assert_eq!(table.nprop(), 4);
        assert_eq!(table.len(), 2);
        assert_eq!(table.sorted()[1].full_name, "NU");
    }

    #[test]
    fn register_captures_errors() {
        let mut table = ParameterTable::new();
        table.register(ParameterDef::new("G", 1).aliases(&["MU"])).unwrap();
        assert!(matches!(
            table.register(ParameterDef::new("SHEAR", 2).aliases(&["mu"])),
            Err(Error::DuplicateParameter(_))
        ));
        assert!(matches!(
            table.register(ParameterDef::new("K", 1)),
            Err(Error::DuplicateParameter(_))
        ));
        assert!(matches!(
            table.register(ParameterDef::new("K", 4).units("BANANA_UNITS")),
            Err(Error::InvalidUnits { .. })
        ));
    }
}
