use bridaldesk_core::notice::DEFAULT_NOTICE_DURATION_MS;
use bridaldesk_storage::memory::DEFAULT_CAPACITY_BYTES;

pub const DEFAULT_QUIET_PERIOD_MS: u64 = 1_000;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Tuning knobs for draft sessions, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay after the last edit before the draft is written.
    pub quiet_period_ms: u64,
    /// How long notices stay on screen.
    pub notice_duration_ms: u64,
    /// Largest decoded image accepted into a draft field.
    pub max_image_bytes: usize,
    /// Quota for the in-memory store.
    pub store_capacity_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            notice_duration_ms: DEFAULT_NOTICE_DURATION_MS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            store_capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            quiet_period_ms: env_parse("BRIDALDESK_QUIET_PERIOD_MS", defaults.quiet_period_ms),
            notice_duration_ms: env_parse("BRIDALDESK_NOTICE_DURATION_MS", defaults.notice_duration_ms),
            max_image_bytes: env_parse("BRIDALDESK_MAX_IMAGE_BYTES", defaults.max_image_bytes),
            store_capacity_bytes: env_parse("BRIDALDESK_STORE_CAPACITY_BYTES", defaults.store_capacity_bytes),
        }
    }

    pub fn with_quiet_period_ms(mut self, ms: u64) -> Self {
        self.quiet_period_ms = ms;
        self
    }

    pub fn with_max_image_bytes(mut self, bytes: usize) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    pub fn with_store_capacity_bytes(mut self, bytes: usize) -> Self {
        self.store_capacity_bytes = bytes;
        self
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.quiet_period_ms, 1_000);
        assert_eq!(config.notice_duration_ms, 3_000);
    }

    #[test]
    fn env_parse_missing_returns_default() {
        assert_eq!(env_parse("BRIDALDESK_TEST_UNSET_KEY", 7u64), 7);
    }

    #[test]
    fn env_parse_present_valid() {
        unsafe { std::env::set_var("BRIDALDESK_TEST_EP_VALID", "99") };
        assert_eq!(env_parse("BRIDALDESK_TEST_EP_VALID", 0usize), 99);
        unsafe { std::env::remove_var("BRIDALDESK_TEST_EP_VALID") };
    }

    #[test]
    fn env_parse_present_invalid_returns_default() {
        unsafe { std::env::set_var("BRIDALDESK_TEST_EP_INVALID", "sebentar") };
        assert_eq!(env_parse("BRIDALDESK_TEST_EP_INVALID", 7u64), 7);
        unsafe { std::env::remove_var("BRIDALDESK_TEST_EP_INVALID") };
    }

    #[test]
    fn from_env_reads_overrides_and_ignores_garbage() {
        unsafe {
            std::env::set_var("BRIDALDESK_QUIET_PERIOD_MS", "250");
            std::env::set_var("BRIDALDESK_MAX_IMAGE_BYTES", "dua mega");
            std::env::remove_var("BRIDALDESK_NOTICE_DURATION_MS");
            std::env::remove_var("BRIDALDESK_STORE_CAPACITY_BYTES");
        }
        let config = EngineConfig::from_env();
        unsafe {
            std::env::remove_var("BRIDALDESK_QUIET_PERIOD_MS");
            std::env::remove_var("BRIDALDESK_MAX_IMAGE_BYTES");
        }
        assert_eq!(config.quiet_period_ms, 250);
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(config.notice_duration_ms, DEFAULT_NOTICE_DURATION_MS);
        assert_eq!(config.store_capacity_bytes, DEFAULT_CAPACITY_BYTES);
    }

    #[test]
    fn builders_override() {
        let config = EngineConfig::default()
            .with_quiet_period_ms(250)
            .with_max_image_bytes(10);
        assert_eq!(config.quiet_period_ms, 250);
        assert_eq!(config.max_image_bytes, 10);
    }
}
