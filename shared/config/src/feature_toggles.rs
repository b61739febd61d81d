use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct FeatureToggles {
    #[serde(flatten)]
    pub flags: HashMap<String, bool>,
}

impl FeatureToggles {
    // Load from a provided path or env var FEATURE_TOGGLES_PATH, defaulting to ./feature-toggles.json
    pub fn from_path(path: Option<String>) -> Self {
        let default_path = std::env::var("FEATURE_TOGGLES_PATH")
            .unwrap_or_else(|_| "feature-toggles.json".to_string());
        let path = path.unwrap_or(default_path);

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => FeatureToggles::default(),
        }
    }

    pub fn from_env_path() -> Self {
        Self::from_path(None)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn is_enabled_or(&self, name: &str, default: bool) -> bool {
        self.flags.get(name).copied().unwrap_or(default)
    }

    /// Resolve a named toggle against credential presence, per the closed
    /// DISABLED/CONFIGURED/ENABLED rule: ENABLED requires both credentials
    /// and the explicit flag; CONFIGURED means credentials exist but the
    /// flag is off; otherwise DISABLED.
    pub fn resolve(&self, name: &str, credentials_present: bool) -> FeatureState {
        FeatureState::resolve(credentials_present, self.is_enabled(name))
    }
}

/// Closed tri-state a feature can resolve to. Operations guarded by a
/// feature return an empty/zero shape unless the state is `Enabled` —
/// they never error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeatureState {
    Disabled,
    Configured,
    Enabled,
}

impl FeatureState {
    pub fn resolve(credentials_present: bool, flag: bool) -> Self {
        match (credentials_present, flag) {
            (true, true) => FeatureState::Enabled,
            (true, false) => FeatureState::Configured,
            (false, _) => FeatureState::Disabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, FeatureState::Enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_requires_both_credentials_and_flag() {
        assert_eq!(FeatureState::resolve(true, true), FeatureState::Enabled);
        assert_eq!(FeatureState::resolve(true, false), FeatureState::Configured);
        assert_eq!(FeatureState::resolve(false, true), FeatureState::Disabled);
        assert_eq!(FeatureState::resolve(false, false), FeatureState::Disabled);
    }
}