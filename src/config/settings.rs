//! Framework settings from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Framework-level settings.
///
/// These configure the framework itself; host-application config lives in
/// files managed by [`ConfigManager`](super::ConfigManager).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding config documents.
    pub data_dir: PathBuf,

    /// Verbose framework logging.
    pub debug: bool,

    /// Interval for the background cooldown sweep, if enabled.
    pub sweep_interval: Option<Duration>,
}

impl Settings {
    /// Load settings from environment variables (reading `.env` first).
    ///
    /// - `MERIDIAN_DATA_DIR` - config directory (default "config")
    /// - `MERIDIAN_DEBUG` - "true"/"1" enables debug
    /// - `MERIDIAN_SWEEP_INTERVAL_SECS` - cooldown sweep interval; unset
    ///   or 0 disables the background sweeper
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = env::var("MERIDIAN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let debug = env::var("MERIDIAN_DEBUG")
            .map(|v| {
                let v = v.trim().to_lowercase();
                v == "true" || v == "1"
            })
            .unwrap_or(false);

        let sweep_interval = env::var("MERIDIAN_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        Self {
            data_dir,
            debug,
            sweep_interval,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("config"),
            debug: false,
            sweep_interval: None,
        }
    }
}
