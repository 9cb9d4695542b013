//! Wrapper settings: where the module schema lives.
//!
//! The command line belongs to the schema, so settings come from the
//! environment instead:
//!
//! - `ELASTIX_CLI_CONFIG`: path of an optional TOML file with a `schema` key;
//! - `ELASTIX_CLI_SCHEMA`: overrides the file.
//!
//! The elastix executable is not configurable; see
//! [`DEFAULT_EXECUTABLE`](crate::launcher::DEFAULT_EXECUTABLE).

use crate::error::{ConfigError, SchemaError};
use crate::schema::ModuleSchema;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_VAR: &str = "ELASTIX_CLI_CONFIG";
pub const SCHEMA_VAR: &str = "ELASTIX_CLI_SCHEMA";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Schema file; `None` selects the bundled schema.
    pub schema: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    schema: Option<PathBuf>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Config::default();

        if let Some(path) = non_empty(&lookup, CONFIG_VAR)? {
            let file = read_config_file(Path::new(&path))?;
            if let Some(schema) = file.schema {
                config.schema = Some(schema);
            }
        }

        if let Some(schema) = non_empty(&lookup, SCHEMA_VAR)? {
            config.schema = Some(PathBuf::from(schema));
        }

        log::debug!("resolved configuration: {config:?}");
        Ok(config)
    }

    /// Loads the configured schema, or the bundled one.
    pub fn load_schema(&self) -> Result<ModuleSchema, SchemaError> {
        match &self.schema {
            Some(path) => ModuleSchema::from_file(path),
            None => ModuleSchema::bundled(),
        }
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<Option<OsString>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    match lookup(key) {
        Some(value) if value.to_str().is_some_and(|text| text.trim().is_empty()) => {
            Err(ConfigError::EmptyVariable(key))
        }
        other => Ok(other),
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
