//! # Latency Prober
//!
//! Measures loss and round-trip latency for every candidate address over a
//! bounded pool of tokio tasks. Workers pull indices from a shared cursor,
//! each writes only the records it created, and the caller blocks until the
//! pool fully drains. Two modes: transport-layer connect timing (default)
//! and application-level HTTP probing with status and region gating.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use edgerank_common::config::Config;
use edgerank_common::record::ProbeRecord;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Per-attempt cap on transport-layer connection establishment.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-attempt cap on an application probe, headers included.
pub const HTTP_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Completed-candidate counter callback for operator feedback.
pub type ProgressFn = Box<dyn Fn(usize) + Send + Sync>;

pub struct Prober {
    cfg: Arc<Config>,
    /// Probe URL rewritten to the configured port; `None` in connect mode.
    probe_url: Option<Url>,
}

impl Prober {
    pub fn new(cfg: Arc<Config>) -> anyhow::Result<Self> {
        let probe_url: Option<Url> = if cfg.httping {
            let mut url = Url::parse(&cfg.url)
                .with_context(|| format!("invalid probe URL '{}'", cfg.url))?;
            if url.host_str().is_none() {
                anyhow::bail!("probe URL '{}' has no host", cfg.url);
            }
            let _ = url.set_port(Some(cfg.port));
            Some(url)
        } else {
            None
        };
        Ok(Self { cfg, probe_url })
    }

    /// Measures every candidate; returns once all dispatched work is done.
    ///
    /// A candidate that fails every repeat still yields a zero-received
    /// record. Only a region mismatch in application-probe mode drops a
    /// candidate from the result set entirely.
    pub async fn run(
        &self,
        candidates: Vec<IpAddr>,
        on_progress: Option<ProgressFn>,
    ) -> Vec<ProbeRecord> {
        let total: usize = candidates.len();
        if total == 0 {
            return Vec::new();
        }

        let workers: usize = self.cfg.effective_routines().min(total);
        let queue: Arc<Vec<IpAddr>> = Arc::new(candidates);
        let cursor = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let progress: Option<Arc<ProgressFn>> = on_progress.map(Arc::new);

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let cfg = Arc::clone(&self.cfg);
            let probe_url = self.probe_url.clone();
            let queue = Arc::clone(&queue);
            let cursor = Arc::clone(&cursor);
            let completed = Arc::clone(&completed);
            let progress = progress.clone();

            handles.push(tokio::spawn(async move {
                let mut out: Vec<ProbeRecord> = Vec::new();
                loop {
                    let idx: usize = cursor.fetch_add(1, Ordering::Relaxed);
                    if idx >= queue.len() {
                        break;
                    }
                    if let Some(rec) = probe_candidate(queue[idx], &cfg, probe_url.as_ref()).await
                    {
                        out.push(rec);
                    }
                    let done: usize = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(cb) = &progress {
                        cb(done);
                    }
                }
                out
            }));
        }

        let mut records: Vec<ProbeRecord> = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(part) => records.extend(part),
                Err(e) => debug!("probe worker aborted: {e}"),
            }
        }
        records
    }
}

async fn probe_candidate(
    addr: IpAddr,
    cfg: &Config,
    probe_url: Option<&Url>,
) -> Option<ProbeRecord> {
    match probe_url {
        Some(url) => http_probe(addr, cfg, url).await,
        None => Some(tcp_probe(addr, cfg).await),
    }
}

/// Repeats a timed connect to the candidate; delay is dial-to-established.
async fn tcp_probe(addr: IpAddr, cfg: &Config) -> ProbeRecord {
    let sock = SocketAddr::new(addr, cfg.port);
    let mut received: u32 = 0;
    let mut total_delay = Duration::ZERO;

    for _ in 0..cfg.ping_times {
        let started = Instant::now();
        match timeout(TCP_CONNECT_TIMEOUT, TcpStream::connect(sock)).await {
            Ok(Ok(stream)) => {
                received += 1;
                total_delay += started.elapsed();
                drop(stream);
            }
            Ok(Err(_)) | Err(_) => {}
        }
    }
    ProbeRecord::new(addr, cfg.ping_times, received, total_delay)
}

/// Repeats a bounded GET through a client pinned to the candidate address.
///
/// A response from an unaccepted region rejects the whole candidate
/// (`None`), not counted as loss; an unaccepted status only fails the one
/// repeat.
async fn http_probe(addr: IpAddr, cfg: &Config, url: &Url) -> Option<ProbeRecord> {
    let host: &str = url.host_str()?;
    let Ok(client) = probe_client(addr, host, cfg.port) else {
        return Some(ProbeRecord::new(addr, cfg.ping_times, 0, Duration::ZERO));
    };

    let mut received: u32 = 0;
    let mut total_delay = Duration::ZERO;

    for _ in 0..cfg.ping_times {
        let started = Instant::now();
        let resp = match client.get(url.clone()).send().await {
            Ok(resp) => resp,
            Err(_) => continue,
        };
        let delay: Duration = started.elapsed();

        if !cfg.regions.is_empty() {
            match region_code(resp.headers()) {
                Some(code) if cfg.accepts_region(&code) => {}
                _ => return None,
            }
        }
        if !cfg.accepts_status(resp.status().as_u16()) {
            continue;
        }

        received += 1;
        total_delay += delay;
    }
    Some(ProbeRecord::new(addr, cfg.ping_times, received, total_delay))
}

fn probe_client(addr: IpAddr, host: &str, port: u16) -> reqwest::Result<Client> {
    Client::builder()
        .resolve(host, SocketAddr::new(addr, port))
        .timeout(HTTP_PROBE_TIMEOUT)
        .redirect(Policy::none())
        .build()
}

/// Extracts the serving point-of-presence code from response headers:
/// the trailing `cf-ray` segment, or the leading three letters of
/// `x-amz-cf-pop`.
pub fn region_code(headers: &HeaderMap) -> Option<String> {
    if let Some(ray) = headers.get("cf-ray").and_then(|v| v.to_str().ok()) {
        if let Some((_, code)) = ray.rsplit_once('-') {
            if !code.is_empty() {
                return Some(code.to_ascii_uppercase());
            }
        }
    }
    if let Some(pop) = headers.get("x-amz-cf-pop").and_then(|v| v.to_str().ok()) {
        if let Some(code) = pop.get(..3) {
            return Some(code.to_ascii_uppercase());
        }
    }
    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
