//! Update records and fetched module bodies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change carried by an update record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    JsUpdate,
    CssUpdate,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKind::JsUpdate => write!(f, "js-update"),
            UpdateKind::CssUpdate => write!(f, "css-update"),
        }
    }
}

/// A single change notification from the dev server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    /// Module whose source changed
    pub path: String,
    /// Module boundary that absorbs the change
    pub accepted_path: String,
    /// Freshness token for re-fetching
    pub timestamp: u64,
}

impl Update {
    pub fn js(path: impl Into<String>, accepted_path: impl Into<String>, timestamp: u64) -> Self {
        Self {
            kind: UpdateKind::JsUpdate,
            path: path.into(),
            accepted_path: accepted_path.into(),
            timestamp,
        }
    }

    pub fn css(path: impl Into<String>, timestamp: u64) -> Self {
        let path = path.into();
        Self {
            kind: UpdateKind::CssUpdate,
            accepted_path: path.clone(),
            path,
            timestamp,
        }
    }

    /// Whether the changed module is its own boundary
    pub fn is_self_update(&self) -> bool {
        self.path == self.accepted_path
    }

    /// Diagnostic label: `path` or `acceptedPath via path`
    pub fn summary(&self) -> String {
        if self.is_self_update() {
            self.path.clone()
        } else {
            format!("{} via {}", self.accepted_path, self.path)
        }
    }
}

/// A module body fetched at a specific freshness token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    pub path: String,
    pub version: u64,
    pub source: String,
}

impl LoadedModule {
    pub fn new(path: impl Into<String>, version: u64, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version,
            source: source.into(),
        }
    }
}
