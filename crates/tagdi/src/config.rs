//! Declarative container configuration loaded from TOML or JSON
//!
//! ```toml
//! [parameters]
//! "http.port" = 8080
//!
//! [aliases]
//! "logger #private" = "logger.console"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::ContainerBuilder;
use crate::error::{DIError, DIResult};
use crate::key_parser::parse_key;
use crate::provider::{Provider, Resolver};
use crate::registry::Registry;

/// Parameters and aliases declared outside of code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Parameter key to value
    pub parameters: BTreeMap<String, serde_json::Value>,
    /// Alias key (tags allowed) to target key
    pub aliases: BTreeMap<String, String>,
}

impl ContainerConfig {
    pub fn from_toml_str(content: &str) -> DIResult<Self> {
        toml::from_str(content).map_err(|e| DIError::ConfigParse {
            message: format!("TOML: {e}"),
        })
    }

    pub fn from_json_str(content: &str) -> DIResult<Self> {
        serde_json::from_str(content).map_err(|e| DIError::ConfigParse {
            message: format!("JSON: {e}"),
        })
    }

    /// Load a file, reading `.json` as JSON and anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> DIResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DIError::ConfigIo {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), "Loading container configuration");

        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.aliases.is_empty()
    }

    /// Register the parameters as a provider and the aliases as a resolver
    pub fn install(self, builder: &ContainerBuilder) -> DIResult<()> {
        builder.add_provider(ConfigProvider {
            parameters: self.parameters,
        })?;
        builder.add_resolver(ConfigResolver {
            aliases: self.aliases,
        })
    }
}

/// Provider installing configured parameters
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    parameters: BTreeMap<String, serde_json::Value>,
}

impl Provider for ConfigProvider {
    fn name(&self) -> &str {
        "config.parameters"
    }

    fn provide(&self, registry: &mut Registry) -> DIResult<()> {
        for (key, value) in &self.parameters {
            registry.set_parameter(key, value)?;
        }
        Ok(())
    }
}

/// Resolver installing configured aliases once every provider has run.
///
/// An alias whose key already names a concrete definition is skipped.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    aliases: BTreeMap<String, String>,
}

impl Resolver for ConfigResolver {
    fn name(&self) -> &str {
        "config.aliases"
    }

    fn resolve(&self, registry: &mut Registry) -> DIResult<()> {
        for (key, target) in &self.aliases {
            let (bare, _) = parse_key(key);
            let concrete = registry
                .get_definition(&bare)
                .is_ok_and(|definition| !definition.is_alias());

            if concrete {
                debug!(key = %bare, "Configured alias shadowed by a definition");
                continue;
            }

            registry.set_alias(key, target)?;
        }
        Ok(())
    }
}
