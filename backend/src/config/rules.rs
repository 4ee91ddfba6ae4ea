//! Rule set - output field name to expression string.
//!
//! Loaded once from a JSON file and never mutated afterwards:
//!
//! ```json
//! {
//!   "rules": {
//!     "outfield1": "field1+field2",
//!     "outfield2": "max(field1, refdata1)"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult, ExpressionError, ExpressionResult};
use crate::models::OutputField;

/// On-disk shape of the rules file.
#[derive(Debug, Deserialize)]
struct RulesFile {
    rules: HashMap<String, String>,
}

/// Immutable mapping from output field to expression.
///
/// Share it between runs with `Arc<RuleSet>`; it holds no interior state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: BTreeMap<OutputField, String>,
}

impl RuleSet {
    /// Build from `(field, expression)` pairs.
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (OutputField, S)>,
        S: Into<String>,
    {
        Self {
            rules: rules.into_iter().map(|(f, e)| (f, e.into())).collect(),
        }
    }

    /// Load rules from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse rules from JSON text.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let file: RulesFile = serde_json::from_str(json)?;

        let mut rules = BTreeMap::new();
        for (name, expression) in file.rules {
            let field: OutputField = name.parse().map_err(ConfigError::UnknownField)?;
            rules.insert(field, expression);
        }

        Ok(Self { rules })
    }

    /// Expression configured for `field`.
    pub fn expression(&self, field: OutputField) -> ExpressionResult<&str> {
        self.rules
            .get(&field)
            .map(String::as_str)
            .ok_or_else(|| ExpressionError::MissingRule(field.to_string()))
    }

    /// Output fields without a configured expression.
    pub fn missing(&self) -> Vec<OutputField> {
        OutputField::ALL
            .into_iter()
            .filter(|f| !self.rules.contains_key(f))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputField, &str)> {
        self.rules.iter().map(|(f, e)| (*f, e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
