use super::InputBlock;
use crate::base::{Error, Result};

/// Holds the interpreted content of the material block
///
/// ```text
/// begin material
///   constitutive model elastic
///   database materials.json      # optional
///   K = 10
///   G = 4
/// end material
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialInput {
    /// Name (or alias) of the constitutive model
    pub model: String,

    /// User parameters, one `name value` pair per line
    pub parameters: String,

    /// Path to a material database (JSON)
    pub database: Option<String>,
}

impl MaterialInput {
    /// Interprets the material block
    pub fn from_block(block: &InputBlock) -> Result<Self> {
        let mut model: Option<String> = None;
        let mut database = None;
        let mut parameters = Vec::new();
        for line in &block.content {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
            if lower.len() >= 2 && lower[0] == "constitutive" && lower[1] == "model" {
                if model.is_some() {
                    return Err(Error::parse("constitutive model specified more than once in material block"));
                }
                if tokens.len() < 3 {
                    return Err(Error::parse("constitutive model line must be of form: constitutive model <name>"));
                }
                model = Some(tokens[2..].join(" "));
            } else if lower[0] == "database" && tokens.len() > 1 {
                database = Some(tokens[1..].join(" "));
            } else {
                parameters.push(line.as_str());
            }
        }
        let model = model.ok_or_else(|| Error::parse("constitutive model must be specified in material block"))?;
        Ok(MaterialInput {
            model,
            parameters: parameters.join("\n"),
            database,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
