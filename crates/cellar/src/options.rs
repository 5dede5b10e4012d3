use serde::{Deserialize, Serialize};

/// Construction-time options shared by every cell type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellOptions {
    /// Keep the last committed value in memory and answer reads from it.
    pub cache_value: bool,
    /// Per-subscriber buffer of the change notifier.
    pub channel_capacity: usize,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            cache_value: false,
            channel_capacity: 16,
        }
    }
}

impl CellOptions {
    /// Default options with the cache slot enabled.
    pub fn cached() -> Self {
        Self {
            cache_value: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = CellOptions::default();
        assert!(!o.cache_value);
        assert_eq!(o.channel_capacity, 16);
        assert!(CellOptions::cached().cache_value);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let o: CellOptions = serde_json::from_str(r#"{"cache_value":true}"#).unwrap();
        assert_eq!(o, CellOptions::cached());
    }
}
