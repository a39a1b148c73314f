use serde::{Deserialize, Serialize};

/// What to do when a query names an item or bag the vector space never saw
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Fail with `Error::UnknownBag` / `Error::UnknownItem`
    #[default]
    Reject,
    /// Treat the key as contributing nothing (weight 0)
    Ignore,
}

/// Configuration for a metric
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricConfig {
    #[serde(default)]
    pub unknown_keys: UnknownKeyPolicy,
}

impl MetricConfig {
    pub fn lenient() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Ignore,
        }
    }
}
