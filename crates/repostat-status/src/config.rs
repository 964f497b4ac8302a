use serde::{Deserialize, Serialize};

/// Default cap on bytes read from any one file.
pub const DEFAULT_READ_CAP: usize = 1024 * 1024;

/// Tuning knobs for the [`StatusResolver`](crate::StatusResolver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Slots in the global concurrency limiter. Independent of any worker
    /// pool size.
    pub limiter_capacity: usize,
    /// Maximum bytes read from a working-copy file or HEAD blob when diffing.
    pub read_cap_bytes: usize,
    /// Branch reported when HEAD names no readable branch.
    pub default_branch: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            limiter_capacity: 8,
            read_cap_bytes: DEFAULT_READ_CAP,
            default_branch: "master".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ResolverConfig::default();
        assert_eq!(c.limiter_capacity, 8);
        assert_eq!(c.read_cap_bytes, 1 << 20);
        assert_eq!(c.default_branch, "master");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: ResolverConfig = toml::from_str("limiter_capacity = 2").unwrap();
        assert_eq!(c.limiter_capacity, 2);
        assert_eq!(c.read_cap_bytes, DEFAULT_READ_CAP);
        assert_eq!(c.default_branch, "master");
    }
}
