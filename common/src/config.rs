//! # Pipeline Configuration
//!
//! One immutable [`Config`] is built at startup from the parsed command line
//! and handed by reference into every stage. No stage reads ambient state.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Hard ceiling for the latency-probe worker pool.
pub const MAX_ROUTINES: usize = 1000;

/// Sentinel upper bound: a window ending here means "no delay filter".
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(9999);

pub const DEFAULT_ROUTINES: usize = 200;
pub const DEFAULT_PING_TIMES: u32 = 4;
pub const DEFAULT_TEST_COUNT: usize = 10;
pub const DEFAULT_DOWNLOAD_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_URL: &str = "https://cf.xiu2.xyz/url";
pub const DEFAULT_STATUS_CODES: &[u16] = &[200, 301, 302];
pub const DEFAULT_IP_FILE: &str = "ip.txt";
pub const DEFAULT_OUTPUT: &str = "result.csv";
pub const DEFAULT_PRINT_NUM: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delay window lower bound ({0:?}) exceeds upper bound ({1:?})")]
    InvertedDelayWindow(Duration, Duration),
    #[error("probe repeat count must be at least 1")]
    ZeroPingTimes,
    #[error("worker count must be at least 1")]
    ZeroRoutines,
}

/// Everything the measurement pipeline consumes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the latency-probe worker pool, clamped to [`MAX_ROUTINES`].
    pub routines: usize,
    /// Probes attempted per candidate address.
    pub ping_times: u32,
    /// Stop benchmarking once this many qualifying results exist.
    pub test_count: usize,
    /// Wall-clock cap on a single throughput measurement.
    pub download_duration: Duration,
    /// Transport port for connect-timing probes and downloads.
    pub port: u16,
    /// URL used for application probes and throughput downloads.
    pub url: String,
    /// Application-probe mode instead of connect timing.
    pub httping: bool,
    /// Status codes an application probe accepts as success.
    pub status_codes: Vec<u16>,
    /// Accepted region codes; empty accepts every region.
    pub regions: Vec<String>,
    /// Inclusive delay-window lower bound.
    pub min_delay: Duration,
    /// Inclusive delay-window upper bound.
    pub max_delay: Duration,
    /// Minimum qualifying throughput, in MB/s.
    pub min_speed: f64,
    /// Line-oriented address/CIDR source file.
    pub ip_file: Option<PathBuf>,
    /// Inline comma-separated address/CIDR list; takes precedence over the file.
    pub ip_text: Option<String>,
    /// Enumerate every address of each IPv4 /24 instead of sampling one.
    pub test_all: bool,
    /// Skip throughput benchmarking entirely.
    pub disable_download: bool,
    /// CSV destination; `None` disables file export.
    pub output: Option<PathBuf>,
    /// Console rows to render; 0 suppresses the table.
    pub print_num: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routines: DEFAULT_ROUTINES,
            ping_times: DEFAULT_PING_TIMES,
            test_count: DEFAULT_TEST_COUNT,
            download_duration: Duration::from_secs(DEFAULT_DOWNLOAD_SECS),
            port: DEFAULT_PORT,
            url: DEFAULT_URL.to_string(),
            httping: false,
            status_codes: DEFAULT_STATUS_CODES.to_vec(),
            regions: Vec::new(),
            min_delay: Duration::ZERO,
            max_delay: DEFAULT_MAX_DELAY,
            min_speed: 0.0,
            ip_file: Some(PathBuf::from(DEFAULT_IP_FILE)),
            ip_text: None,
            test_all: false,
            disable_download: false,
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
            print_num: DEFAULT_PRINT_NUM,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay > self.max_delay {
            return Err(ConfigError::InvertedDelayWindow(
                self.min_delay,
                self.max_delay,
            ));
        }
        if self.ping_times == 0 {
            return Err(ConfigError::ZeroPingTimes);
        }
        if self.routines == 0 {
            return Err(ConfigError::ZeroRoutines);
        }
        Ok(())
    }

    /// Worker-pool size after clamping.
    pub fn effective_routines(&self) -> usize {
        self.routines.min(MAX_ROUTINES)
    }

    /// Whether the delay window deviates from the disabled defaults.
    pub fn delay_filter_active(&self) -> bool {
        self.min_delay > Duration::ZERO || self.max_delay < DEFAULT_MAX_DELAY
    }

    pub fn accepts_status(&self, code: u16) -> bool {
        self.status_codes.is_empty() || self.status_codes.contains(&code)
    }

    pub fn accepts_region(&self, region: &str) -> bool {
        self.regions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region))
    }

    /// Minimum qualifying throughput in bytes per second.
    pub fn min_speed_bytes(&self) -> f64 {
        self.min_speed * 1_048_576.0
    }

    /// A speed floor with no delay upper bound can churn through slow
    /// candidates for a long time before the target count fills; worth a
    /// tip to the operator, not an error.
    pub fn speed_floor_without_delay_cap(&self) -> bool {
        self.min_speed > 0.0 && self.max_delay >= DEFAULT_MAX_DELAY
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_unfiltered() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.delay_filter_active());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let cfg = Config {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(100),
            ..Config::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedDelayWindow(
                Duration::from_millis(500),
                Duration::from_millis(100)
            ))
        );
    }

    #[test]
    fn either_bound_activates_the_filter() {
        let lower = Config {
            min_delay: Duration::from_millis(40),
            ..Config::default()
        };
        assert!(lower.delay_filter_active());

        let upper = Config {
            max_delay: Duration::from_millis(200),
            ..Config::default()
        };
        assert!(upper.delay_filter_active());
    }

    #[test]
    fn routines_are_clamped() {
        let cfg = Config {
            routines: 4096,
            ..Config::default()
        };
        assert_eq!(cfg.effective_routines(), MAX_ROUTINES);
    }

    #[test]
    fn speed_floor_tip_requires_an_uncapped_delay_window() {
        let uncapped = Config {
            min_speed: 5.0,
            ..Config::default()
        };
        assert!(uncapped.speed_floor_without_delay_cap());

        let capped = Config {
            min_speed: 5.0,
            max_delay: Duration::from_millis(200),
            ..Config::default()
        };
        assert!(!capped.speed_floor_without_delay_cap());
        assert!(!Config::default().speed_floor_without_delay_cap());
    }

    #[test]
    fn status_and_region_sets() {
        let cfg = Config {
            regions: vec!["HKG".to_string(), "NRT".to_string()],
            ..Config::default()
        };
        assert!(cfg.accepts_status(200));
        assert!(cfg.accepts_status(302));
        assert!(!cfg.accepts_status(403));
        assert!(cfg.accepts_region("hkg"));
        assert!(!cfg.accepts_region("LAX"));
    }
}
