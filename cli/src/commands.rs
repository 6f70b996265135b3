use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use edgerank_common::config::{
    Config, DEFAULT_DOWNLOAD_SECS, DEFAULT_IP_FILE, DEFAULT_OUTPUT, DEFAULT_PING_TIMES,
    DEFAULT_PORT, DEFAULT_PRINT_NUM, DEFAULT_ROUTINES, DEFAULT_TEST_COUNT, DEFAULT_URL,
};

#[derive(Parser, Debug)]
#[command(name = "edgerank")]
#[command(version)]
#[command(about = "Rank anycast CDN addresses by latency and download throughput.")]
pub struct CommandLine {
    /// Latency probe worker count (clamped to 1000)
    #[arg(short = 'n', long = "routines", default_value_t = DEFAULT_ROUTINES)]
    pub routines: usize,

    /// Latency probes per candidate address
    #[arg(short = 't', long = "times", default_value_t = DEFAULT_PING_TIMES)]
    pub ping_times: u32,

    /// Stop benchmarking after this many qualifying results
    #[arg(long = "dn", default_value_t = DEFAULT_TEST_COUNT)]
    pub test_count: usize,

    /// Seconds allowed per throughput measurement
    #[arg(long = "dt", default_value_t = DEFAULT_DOWNLOAD_SECS)]
    pub download_secs: u64,

    /// Port for connect probes and downloads
    #[arg(long = "tp", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// URL used for application probes and throughput downloads
    #[arg(long = "url", default_value_t = DEFAULT_URL.to_string())]
    pub url: String,

    /// Probe with HTTP requests instead of connect timing
    #[arg(long = "httping")]
    pub httping: bool,

    /// Accepted status codes for application probes
    #[arg(long = "httping-code", value_delimiter = ',', default_values_t = [200u16, 301, 302])]
    pub status_codes: Vec<u16>,

    /// Accepted region codes (airport codes, e.g. HKG,NRT,LAX); empty accepts all
    #[arg(long = "colo", value_delimiter = ',')]
    pub regions: Vec<String>,

    /// Average delay upper bound in milliseconds
    #[arg(long = "tl", default_value_t = 9999)]
    pub max_delay_ms: u64,

    /// Average delay lower bound in milliseconds
    #[arg(long = "tll", default_value_t = 0)]
    pub min_delay_ms: u64,

    /// Minimum qualifying download speed in MB/s
    #[arg(long = "sl", default_value_t = 0.0)]
    pub min_speed: f64,

    /// Address/CIDR source file
    #[arg(short = 'f', long = "file", default_value = DEFAULT_IP_FILE)]
    pub ip_file: PathBuf,

    /// Inline comma-separated addresses/CIDRs; takes precedence over the file
    #[arg(long = "ip")]
    pub ip_text: Option<String>,

    /// Probe every address of each IPv4 /24 instead of sampling one
    #[arg(long = "allip")]
    pub test_all: bool,

    /// Skip throughput benchmarking
    #[arg(long = "dd")]
    pub disable_download: bool,

    /// CSV output path; pass an empty string to disable export
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Result rows to display; 0 hides the table
    #[arg(short = 'p', long = "print", default_value_t = DEFAULT_PRINT_NUM)]
    pub print_num: usize,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the immutable pipeline configuration, validating as it goes.
    ///
    /// A `tl` above the 9999 ms default collapses onto the disabled
    /// sentinel, matching the window-off semantics.
    pub fn into_config(self) -> anyhow::Result<Config> {
        let output: Option<PathBuf> = if self.output.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(self.output))
        };
        let regions: Vec<String> = self
            .regions
            .iter()
            .map(|r| r.trim().to_ascii_uppercase())
            .filter(|r| !r.is_empty())
            .collect();

        let cfg = Config {
            routines: self.routines,
            ping_times: self.ping_times,
            test_count: self.test_count,
            download_duration: Duration::from_secs(self.download_secs),
            port: self.port,
            url: self.url,
            httping: self.httping,
            status_codes: self.status_codes,
            regions,
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms.min(9999)),
            min_speed: self.min_speed,
            ip_file: Some(self.ip_file),
            ip_text: self.ip_text,
            test_all: self.test_all,
            disable_download: self.disable_download,
            output,
            print_num: self.print_num,
        };
        cfg.validate()?;
        Ok(cfg)
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
