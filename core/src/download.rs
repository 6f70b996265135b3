//! # Throughput Bench
//!
//! Consumes the ranked, filtered records strictly in order and measures
//! sustained download throughput one candidate at a time; a single active
//! transfer keeps individual readings free of shared-uplink contention.
//! The loop is generic over the per-candidate measurement so the early-stop
//! and threshold policy is testable without touching the network.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use anyhow::Context;
use edgerank_common::config::Config;
use edgerank_common::record::{BenchmarkRecord, ProbeRecord};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tokio::time::timeout;

use crate::ping::ProgressFn;

/// Connection-establishment cap for a benchmark transfer.
pub const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the bench loop over `ranked` with the supplied measurement.
///
/// Candidates are processed in order until qualifying results (throughput at
/// or above the configured minimum) reach the target count; remaining
/// records are never measured and never appear in the output. Measured
/// records below the threshold are retained with their low reading.
pub async fn run<F, Fut>(
    ranked: Vec<ProbeRecord>,
    cfg: &Config,
    on_progress: Option<ProgressFn>,
    mut measure: F,
) -> Vec<BenchmarkRecord>
where
    F: FnMut(IpAddr) -> Fut,
    Fut: Future<Output = f64>,
{
    let min_speed: f64 = cfg.min_speed_bytes();
    let mut results: Vec<BenchmarkRecord> = Vec::new();
    let mut qualifying: usize = 0;

    for probe in ranked {
        if qualifying >= cfg.test_count {
            break;
        }
        let speed: f64 = measure(probe.addr()).await;
        if speed >= min_speed {
            qualifying += 1;
        }
        results.push(BenchmarkRecord::new(probe, speed));
        // Progress tracks qualifying results, the quantity the target caps.
        if let Some(cb) = &on_progress {
            cb(qualifying);
        }
    }
    results
}

/// The real bench: wires [`run`] to the HTTP download measurement.
pub async fn bench(
    ranked: Vec<ProbeRecord>,
    cfg: &Config,
    on_progress: Option<ProgressFn>,
) -> anyhow::Result<Vec<BenchmarkRecord>> {
    let mut url =
        Url::parse(&cfg.url).with_context(|| format!("invalid download URL '{}'", cfg.url))?;
    let Some(host) = url.host_str().map(str::to_owned) else {
        anyhow::bail!("download URL '{}' has no host", cfg.url);
    };
    let _ = url.set_port(Some(cfg.port));

    let port: u16 = cfg.port;
    let duration: Duration = cfg.download_duration;
    Ok(run(ranked, cfg, on_progress, move |addr| {
        measure(addr, host.clone(), url.clone(), port, duration)
    })
    .await)
}

/// Wraps records without benchmarking, preserving the latency ordering.
pub fn passthrough(records: Vec<ProbeRecord>) -> Vec<BenchmarkRecord> {
    records.into_iter().map(BenchmarkRecord::unbenched).collect()
}

/// Downloads the test resource through the candidate for at most `duration`.
///
/// Throughput is bytes received over elapsed wall time, the elapsed time
/// capped at `duration`. Setup failures, transfer errors and the deadline
/// all resolve to whatever was measured so far, possibly zero.
async fn measure(addr: IpAddr, host: String, url: Url, port: u16, duration: Duration) -> f64 {
    let Ok(client) = download_client(addr, &host, port) else {
        return 0.0;
    };

    let started = Instant::now();
    let deadline = started + duration;
    let mut resp = match timeout(duration, client.get(url).send()).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(_)) | Err(_) => return 0.0,
    };

    let mut bytes: u64 = 0;
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        match timeout(deadline - now, resp.chunk()).await {
            Ok(Ok(Some(chunk))) => bytes += chunk.len() as u64,
            // Body finished before the deadline.
            Ok(Ok(None)) => break,
            // Mid-transfer error or deadline; partial bytes still count.
            Ok(Err(_)) | Err(_) => break,
        }
    }

    let elapsed: Duration = started.elapsed().min(duration);
    if elapsed.is_zero() {
        return 0.0;
    }
    bytes as f64 / elapsed.as_secs_f64()
}

fn download_client(addr: IpAddr, host: &str, port: u16) -> reqwest::Result<Client> {
    Client::builder()
        .resolve(host, SocketAddr::new(addr, port))
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .redirect(Policy::none())
        .build()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
