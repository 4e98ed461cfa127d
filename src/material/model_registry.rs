use super::{normalize_name, ConstitutiveModel, Elastic, FiniteElastic, Plastic};
use crate::base::{Error, Result};

/// Defines the function allocating a constitutive model
pub type ModelConstructor = fn() -> Result<Box<dyn ConstitutiveModel>>;

/// Holds one entry of the registry
struct ModelEntry {
    name: String,
    aliases: Vec<String>,
    constructor: ModelConstructor,
}

/// Maps model names (and aliases) to constructors
///
/// Lookups are case-insensitive and treat spaces as underscores.
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// Allocates an empty registry
    pub fn new() -> Self {
        ModelRegistry { entries: Vec::new() }
    }

    /// Allocates a registry with the built-in models
    pub fn builtin() -> Self {
        let mut registry = ModelRegistry::new();
        let models: [(&str, &[&str], ModelConstructor); 3] = [
            ("elastic", &["hooke", "linear elastic"], || Ok(Box::new(Elastic::new()?))),
            ("finite_elastic", &[], || Ok(Box::new(FiniteElastic::new()?))),
            ("plastic", &["von mises", "j2 plasticity"], || Ok(Box::new(Plastic::new()?))),
        ];
        for (name, aliases, constructor) in models {
            registry.entries.push(ModelEntry {
                name: normalize_name(name),
                aliases: aliases.iter().map(|a| normalize_name(a)).collect(),
                constructor,
            });
        }
        registry
    }

    /// Registers a new model
    pub fn register(&mut self, name: &str, aliases: &[&str], constructor: ModelConstructor) -> Result<()> {
        let mut keys = vec![normalize_name(name)];
        keys.extend(aliases.iter().map(|a| normalize_name(a)));
        for key in &keys {
            if self.find(key).is_some() {
                return Err(Error::DuplicateName(key.clone()));
            }
        }
        self.entries.push(ModelEntry {
            name: keys[0].clone(),
            aliases: keys[1..].to_vec(),
            constructor,
        });
        Ok(())
    }

    /// Returns the canonical name of a model given its name or alias
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.find(&normalize_name(name)).map(|e| e.name.as_str())
    }

    /// Allocates a model given its name or alias
    pub fn create(&self, name: &str) -> Result<Box<dyn ConstitutiveModel>> {
        match self.find(&normalize_name(name)) {
            Some(entry) => (entry.constructor)(),
            None => Err(Error::NotRegistered {
                name: name.to_string(),
                container: "model registry".to_string(),
                available: self.names().join(", "),
            }),
        }
    }

    /// Returns the canonical names of all models
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn find(&self, key: &str) -> Option<&ModelEntry> {
        self.entries
            .iter()
            .find(|e| e.name == key || e.aliases.iter().any(|a| a == key))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        ModelRegistry::builtin()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ModelRegistry;
    use crate::base::Error;
    use crate::material::Elastic;

    #[test]
    fn create_works() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.names(), &["elastic", "finite_elastic", "plastic"]);
        assert_eq!(registry.canonical_name("Linear Elastic"), Some("elastic"));
        assert_eq!(registry.canonical_name("VON_MISES"), Some("plastic"));
        let model = registry.create("hooke").unwrap();
        assert_eq!(model.base().name, "elastic");
        match registry.create("kayenta") {
            Err(Error::NotRegistered { available, .. }) => assert!(available.contains("finite_elastic")),
            _ => panic!("expected NotRegistered"),
        }
    }

    #[test]
    fn builtin_names_and_aliases_are_unique() {
        let registry = ModelRegistry::builtin();
        let mut all: Vec<&str> = Vec::new();
        for entry in &registry.entries {
            all.push(&entry.name);
            all.extend(entry.aliases.iter().map(|a| a.as_str()));
        }
        let n = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), n);
        for name in all {
            assert!(registry.canonical_name(name).is_some());
        }
    }

    #[test]
    fn register_works() {
        let mut registry = ModelRegistry::new();
        registry
            .register("my elastic", &["mine"], || Ok(Box::new(Elastic::new()?)))
            .unwrap();
        assert!(matches!(
            registry.register("other", &["MINE"], || Ok(Box::new(Elastic::new()?))),
            Err(Error::DuplicateName(_))
        ));
        assert_eq!(registry.canonical_name("mine"), Some("my_elastic"));
    }
}
