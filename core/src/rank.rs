//! # Rank & Filter
//!
//! Orders probe records by (loss rate, delay), applies the optional delay
//! window over the sorted list, and produces the final throughput ordering.
//! The filter deliberately stays a separate scan over sorted input rather
//! than being fused into the sort; it is only correct on ranked data.

use edgerank_common::config::Config;
use edgerank_common::record::{BenchmarkRecord, ProbeRecord};

/// Stable sort ascending by loss rate, then by average delay.
///
/// Zero-received records carry loss rate 1.0 and therefore always sort
/// after anything with a successful probe.
pub fn by_quality(mut records: Vec<ProbeRecord>) -> Vec<ProbeRecord> {
    records.sort_by(|a, b| {
        a.loss_rate()
            .total_cmp(&b.loss_rate())
            .then_with(|| a.delay().cmp(&b.delay()))
    });
    records
}

/// Applies the inclusive delay window to an already-ranked list.
///
/// Identity when both bounds sit at their disabled defaults. Otherwise a
/// single forward scan: entries under the lower bound are skipped, and the
/// scan stops at the first entry over the upper bound — or at the first
/// zero-received record, whose delay is meaningless and which heads the
/// terminal loss bucket.
pub fn filter_delay(records: Vec<ProbeRecord>, cfg: &Config) -> Vec<ProbeRecord> {
    if !cfg.delay_filter_active() {
        return records;
    }

    let mut kept: Vec<ProbeRecord> = Vec::with_capacity(records.len());
    for rec in records {
        if rec.received() == 0 {
            break;
        }
        if rec.delay() > cfg.max_delay {
            break;
        }
        if rec.delay() < cfg.min_delay {
            continue;
        }
        kept.push(rec);
    }
    kept
}

/// Stable sort descending by measured throughput.
///
/// Only called when the throughput stage ran; with benchmarking disabled
/// the latency ordering is kept as-is.
pub fn by_speed(mut records: Vec<BenchmarkRecord>) -> Vec<BenchmarkRecord> {
    records.sort_by(|a, b| b.speed().total_cmp(&a.speed()));
    records
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
