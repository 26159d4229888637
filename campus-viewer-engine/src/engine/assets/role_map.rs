use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Static metadata for an organisational role (or a raw building identifier),
/// curated at deployment time. Used directly when no backend data exists and
/// as the fallback when the dynamic lookup fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Deployment-time role configuration, loaded once at startup as a JSON
/// asset. Mirrors the JSON structure exactly.
///
/// `assignments` maps node and group identifiers as authored in the scene
/// asset to role strings; it is produced by manual curation, never computed.
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath, Resource)]
pub struct RoleConfig {
    #[serde(default)]
    pub assignments: HashMap<String, String>,
    #[serde(default)]
    pub roles: HashMap<String, RoleProfile>,
    /// Base URL of the info backend, e.g. `http://localhost:8000`.
    pub info_base_url: String,
    /// Group focused (and popped up) right after the scene loads, if present.
    #[serde(default)]
    pub initial_focus: Option<String>,
}

impl RoleConfig {
    /// Resolve a picked group to a role: the group identifier wins, the hit
    /// node's own identifier is the fallback.
    pub fn resolve_group_role(&self, group_id: &str, node_id: &str) -> Option<&str> {
        self.assignments
            .get(group_id)
            .or_else(|| self.assignments.get(node_id))
            .map(String::as_str)
    }

    /// Resolve an ungrouped node to a role by its own identifier only.
    pub fn resolve_node_role(&self, node_id: &str) -> Option<&str> {
        self.assignments.get(node_id).map(String::as_str)
    }

    /// Static metadata for a role or raw identifier, if curated.
    pub fn profile(&self, key: &str) -> Option<&RoleProfile> {
        self.roles.get(key)
    }
}
