//! Component manifest: the declared tree, one entry per component instance.
//!
//! ```toml
//! [[node]]
//! id = "ship"
//! object = "ship-mesh"
//!
//! [[node]]
//! id = "turret"
//! parent = "ship"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};

/// One declared component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeDecl {
    pub id: String,
    /// Identifier of the parent component; absent means "attach to root"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Name of the scene object this component wraps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

/// Declarations in registration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeDecl>,
}

impl Manifest {
    /// Parse manifest content. `path` is only used for error messages.
    pub fn parse(content: &str, path: &Path) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Manifest {
            path: Path::new("<memory>").to_path_buf(),
            message: format!("serialize manifest: {e}"),
        })
    }
}
