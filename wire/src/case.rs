//! Case definitions: which method to call and with what argument values

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use thriftmark_core::SchemaError;

/// Method name of the built-in minimal case
pub const PING_METHOD: &str = "ping";

/// One named test case
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCase {
    /// Case name referenced by `--case`
    pub name: String,

    /// Service method to call
    pub method: String,

    /// Argument values, keyed by schema argument name
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ApiCase {
    /// The built-in minimal case: a zero-argument `ping` call.
    pub fn ping() -> Self {
        Self {
            name: PING_METHOD.to_string(),
            method: PING_METHOD.to_string(),
            args: Map::new(),
        }
    }
}

/// A case-definition file: a flat list of named cases
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseFile {
    /// Every case the file defines
    #[serde(default)]
    pub cases: Vec<ApiCase>,
}

impl CaseFile {
    /// Load and parse a case-definition file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let source = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source)
            .map_err(|error| SchemaError::Parse(format!("invalid case file: {error}")))
    }

    /// Look up a case by name.
    pub fn get(&self, name: &str) -> Result<&ApiCase, SchemaError> {
        self.cases
            .iter()
            .find(|case| case.name == name)
            .ok_or_else(|| SchemaError::UnknownCase(name.to_string()))
    }
}
