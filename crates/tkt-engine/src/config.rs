//! # Engine Configuration

use serde::{Deserialize, Serialize};

/// Which tickets a superseding ticket (strike-off) resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersedeScope {
    /// Other open tickets of the same company.
    #[default]
    Company,
    /// Every other open ticket in the store, across companies.
    Global,
}

impl SupersedeScope {
    /// Configuration string (`company` / `global`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Global => "global",
        }
    }
}

impl std::fmt::Display for SupersedeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupersedeScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "company" => Ok(Self::Company),
            "global" => Ok(Self::Global),
            other => Err(format!(
                "invalid supersede scope \"{other}\" (expected company or global)"
            )),
        }
    }
}

/// Rule engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub supersede_scope: SupersedeScope,
}
