//! Runtime configuration
//!
//! Read from the environment once per `Runtime`:
//!
//! - `DYNVAL_MAX_HANDLES`: live entries allowed per handle registry
//!   (default 1048576).
//! - `DYNVAL_MAX_POOL_SLOTS`: highest slot count a pool may grow to when a
//!   value is stored at an explicit index (default 1048576).
//!
//! Zero or non-numeric values are warned about and ignored.
//!
//! The registry report has its own variable, see [`crate::report`].

/// Default per-registry limit of live entries
pub const DEFAULT_MAX_HANDLES: usize = 1 << 20;

/// Default slot limit for explicit-index pool stores
pub const DEFAULT_MAX_POOL_SLOTS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Live entries allowed in each handle registry
    pub max_handles: usize,
    /// Slots a pool may span; storing at or beyond this index is out of range
    pub max_pool_slots: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_handles: DEFAULT_MAX_HANDLES,
            max_pool_slots: DEFAULT_MAX_POOL_SLOTS,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            max_handles: parse_limit(
                "DYNVAL_MAX_HANDLES",
                std::env::var("DYNVAL_MAX_HANDLES").ok(),
                DEFAULT_MAX_HANDLES,
            ),
            max_pool_slots: parse_limit(
                "DYNVAL_MAX_POOL_SLOTS",
                std::env::var("DYNVAL_MAX_POOL_SLOTS").ok(),
                DEFAULT_MAX_POOL_SLOTS,
            ),
        }
    }
}

/// Parse a positive limit from an optional string value
fn parse_limit(name: &str, env_value: Option<String>, default: usize) -> usize {
    match env_value {
        Some(val) => match val.trim().parse::<usize>() {
            Ok(0) => {
                tracing::warn!("{}=0 is invalid, using default {}", name, default);
                default
            }
            Ok(limit) => limit,
            Err(_) => {
                tracing::warn!(
                    "{}='{}' is not a valid number, using default {}",
                    name,
                    val,
                    default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn handles(value: &str) -> usize {
        parse_limit("DYNVAL_MAX_HANDLES", Some(value.to_string()), DEFAULT_MAX_HANDLES)
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(
            parse_limit("DYNVAL_MAX_HANDLES", None, DEFAULT_MAX_HANDLES),
            DEFAULT_MAX_HANDLES
        );
        assert_eq!(handles("64"), 64);
        assert_eq!(handles(" 8 "), 8);
        assert_eq!(handles("0"), DEFAULT_MAX_HANDLES);
        assert_eq!(handles("lots"), DEFAULT_MAX_HANDLES);
        assert_eq!(parse_limit("DYNVAL_MAX_POOL_SLOTS", Some("-1".to_string()), 5), 5);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let orig_handles = std::env::var("DYNVAL_MAX_HANDLES").ok();
        let orig_slots = std::env::var("DYNVAL_MAX_POOL_SLOTS").ok();

        // SAFETY: env tests are serialized
        unsafe {
            std::env::set_var("DYNVAL_MAX_HANDLES", "3");
            std::env::set_var("DYNVAL_MAX_POOL_SLOTS", "16");
        }
        let config = RuntimeConfig::from_env();
        assert_eq!(config.max_handles, 3);
        assert_eq!(config.max_pool_slots, 16);

        unsafe {
            std::env::remove_var("DYNVAL_MAX_HANDLES");
            std::env::remove_var("DYNVAL_MAX_POOL_SLOTS");
        }
        assert_eq!(RuntimeConfig::from_env(), RuntimeConfig::default());

        // SAFETY: Restoring environment to original state
        unsafe {
            match orig_handles {
                Some(v) => std::env::set_var("DYNVAL_MAX_HANDLES", v),
                None => std::env::remove_var("DYNVAL_MAX_HANDLES"),
            }
            match orig_slots {
                Some(v) => std::env::set_var("DYNVAL_MAX_POOL_SLOTS", v),
                None => std::env::remove_var("DYNVAL_MAX_POOL_SLOTS"),
            }
        }
    }
}
