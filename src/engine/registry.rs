//! Tool registry
//!
//! The set of tools in effect for a run. Its fingerprint is the last stage
//! of the chain hash, so swapping a tool version is detectable even when
//! the decision output is unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hashing::{hash_value, Digest, HashResult};

/// One registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool version string
    pub version: String,
    /// What the tool does
    #[serde(default)]
    pub description: String,
}

/// Tools keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn with_tool(mut self, name: &str, version: &str, description: &str) -> Self {
        self.register(name, version, description);
        self
    }

    /// Register or replace a tool
    pub fn register(&mut self, name: &str, version: &str, description: &str) {
        self.tools.insert(
            name.to_string(),
            ToolDescriptor {
                version: version.to_string(),
                description: description.to_string(),
            },
        );
    }

    /// Look up a tool
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Tool names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tools.keys().map(String::as_str)
    }

    /// Number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Content hash of the registry
    pub fn fingerprint(&self) -> HashResult<Digest> {
        hash_value(self)
    }
}

/// Registry shipped with the built-in engine.
pub fn default_tool_registry() -> ToolRegistry {
    ToolRegistry::new()
        .with_tool("branch-generator", "1.0.0", "expands actions into branch states")
        .with_tool("lens-evaluator", "1.0.0", "scores actions under each lens")
        .with_tool("explainer", "1.0.0", "summarizes reasoning and flip conditions")
}
