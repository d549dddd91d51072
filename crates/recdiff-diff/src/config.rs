use std::path::Path;

use recdiff_guard::{GuardMap, ENTITLEMENT_ATTRIBUTES};
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// Default limit on container nesting below the root.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default limit on emitted diff events per invocation.
pub const DEFAULT_MAX_EVENTS: usize = 100_000;

/// Configuration for a [`JsonDiff`](crate::JsonDiff) engine.
///
/// Built once at startup and shared read-only by every diff invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum container depth either traversal may descend to.
    pub max_depth: usize,
    /// Maximum number of add/remove/replace events per invocation.
    pub max_events: usize,
    /// Attributes captured as context when a record is removed.
    pub identity_attributes: Vec<String>,
    /// Arrays whose elements must carry the listed attributes.
    pub guards: GuardMap,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_events: DEFAULT_MAX_EVENTS,
            identity_attributes: ENTITLEMENT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
            guards: GuardMap::new(),
        }
    }
}

impl DiffConfig {
    /// Default limits with the standard `/Entitlements` guard.
    pub fn entitlements() -> Self {
        Self {
            guards: GuardMap::entitlements(),
            ..Default::default()
        }
    }

    /// Replace the guard map.
    pub fn with_guards(mut self, guards: GuardMap) -> Self {
        self.guards = guards;
        self
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(text: &str) -> DiffResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| DiffError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DiffResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DiffError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check limits and guard entries.
    pub fn validate(&self) -> DiffResult<()> {
        if self.max_depth == 0 {
            return Err(DiffError::Config("max_depth must be greater than zero".into()));
        }
        if self.max_events == 0 {
            return Err(DiffError::Config("max_events must be greater than zero".into()));
        }
        self.guards.validate()?;
        Ok(())
    }
}
