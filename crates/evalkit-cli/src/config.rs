use evalkit_core::ModelConfig;
use evalkit_hw::ConnectionPaths;
use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Camera model name (default: topaz).
    pub model: String,
    /// Vendor SDK bin directory; the model's install path when unset.
    pub bin_dir: Option<PathBuf>,
    /// Override for the SDK binary file name.
    pub binary_name: Option<String>,
    /// Override for the transport descriptor file name.
    pub descriptor_name: Option<String>,
    /// Wait after a profile load before touching registers again.
    pub profile_settle: Duration,
}

impl Config {
    /// Load configuration from `EVALKIT_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("EVALKIT_MODEL").unwrap_or_else(|_| "topaz".to_string()),
            bin_dir: std::env::var("EVALKIT_BIN_DIR").ok().map(PathBuf::from),
            binary_name: std::env::var("EVALKIT_BINARY_NAME").ok(),
            descriptor_name: std::env::var("EVALKIT_DESCRIPTOR_NAME").ok(),
            profile_settle: Duration::from_millis(env_u64("EVALKIT_PROFILE_SETTLE_MS", 500)),
        }
    }

    /// SDK binary and descriptor paths for `model`, with overrides applied.
    pub fn connection_paths(&self, model: &ModelConfig) -> ConnectionPaths {
        let mut paths = ConnectionPaths::for_model(model, self.bin_dir.as_deref());
        if let Some(name) = &self.binary_name {
            paths.binary.set_file_name(name);
        }
        if let Some(name) = &self.descriptor_name {
            paths.descriptor.set_file_name(name);
        }
        paths
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
