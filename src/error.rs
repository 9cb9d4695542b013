//! Defines custom error types for the application.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned when a module schema cannot be loaded or is inconsistent.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema XML")]
    Xml(#[from] roxmltree::Error),

    #[error("Schema root element must be <executable>, found <{0}>.")]
    UnexpectedRoot(String),

    #[error("A <{0}> parameter is missing its <name> element.")]
    MissingName(String),

    #[error("Parameter '{name}' has an invalid flag '{flag}': flags must be a single character.")]
    InvalidFlag { name: String, flag: String },

    #[error("Parameter '{name}' has an invalid index '{index}'.")]
    InvalidIndex { name: String, index: String },

    #[error("Parameter '{name}' has an invalid {bound} constraint '{value}'.")]
    InvalidConstraint {
        name: String,
        bound: &'static str,
        value: String,
    },

    #[error("Boolean parameter '{0}' cannot be positional: it takes no value.")]
    PositionalBoolean(String),

    #[error("Positional parameter '{0}' cannot declare a <default>: positional parameters are required.")]
    PositionalDefault(String),

    #[error("Parameter '{0}' is declared more than once.")]
    DuplicateName(String),

    #[error("Flag '{flag}' of parameter '{name}' is already used by another parameter.")]
    DuplicateFlag { name: String, flag: String },

    #[error("Index {index} of parameter '{name}' is already used by another parameter.")]
    DuplicateIndex { name: String, index: usize },

    #[error("Flag '{flag}' of parameter '{name}' is reserved by the wrapper.")]
    ReservedFlag { name: String, flag: String },

    #[error("Enumeration parameter '{0}' declares no <element> values.")]
    EmptyEnumeration(String),

    #[error("Default value '{default}' of parameter '{name}' is not one of its elements.")]
    DefaultNotInEnumeration { name: String, default: String },
}

/// Error returned when the wrapper configuration cannot be assembled.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Environment variable {0} is set but empty.")]
    EmptyVariable(&'static str),
}

/// Error returned when the external executable cannot be started.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to launch '{}'", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
