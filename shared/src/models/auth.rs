//! Authorization context surfaced to the presentation layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-request authorization summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub is_admin: bool,
    /// Permission key -> granted, for the keys the UI knows about
    pub permissions: BTreeMap<String, bool>,
}

impl AuthContext {
    pub fn can(&self, key: &str) -> bool {
        self.permissions.get(key).copied().unwrap_or(false)
    }
}
