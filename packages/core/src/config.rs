//! Service configuration
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How strictly the service guards hierarchy invariants on writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyMode {
    /// Accept writes as given: parents are not checked on create/update,
    /// `level` is only re-derived by moves, cycles are not rejected.
    #[default]
    Lenient,
    /// Reject unknown parents and moves that would create a cycle, and
    /// re-derive `level` whenever a write touches the hierarchy.
    Strict,
}

impl HierarchyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl fmt::Display for HierarchyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HierarchyMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown hierarchy mode '{}' (expected 'lenient' or 'strict')",
                other
            )),
        }
    }
}

/// Configuration for `WbsService`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Invariant checking applied to create, update and move
    pub hierarchy_mode: HierarchyMode,
}

impl ServiceConfig {
    pub fn strict() -> Self {
        Self {
            hierarchy_mode: HierarchyMode::Strict,
        }
    }
}
