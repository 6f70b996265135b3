//! # Measurement Records
//!
//! The two value types that flow through the pipeline: a [`ProbeRecord`] per
//! candidate that survived latency probing, and a [`BenchmarkRecord`] once a
//! throughput figure is attached. Records are created once by their stage and
//! never mutated afterwards.

use std::net::IpAddr;
use std::time::Duration;

/// Bytes per displayed megabyte.
pub const MB: f64 = 1_048_576.0;

/// Loss/latency measurement for one candidate address.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRecord {
    addr: IpAddr,
    sent: u32,
    received: u32,
    delay: Duration,
    loss_rate: f32,
}

impl ProbeRecord {
    /// Builds a record from the raw probe tallies.
    ///
    /// `total_delay` is the sum over successful probes; the stored delay is
    /// the mean, and zero when nothing succeeded. The loss rate is computed
    /// here, once, so later stages read a plain cached field.
    pub fn new(addr: IpAddr, sent: u32, received: u32, total_delay: Duration) -> Self {
        debug_assert!(received <= sent);
        let delay: Duration = if received == 0 {
            Duration::ZERO
        } else {
            total_delay / received
        };
        let loss_rate: f32 = if sent == 0 {
            0.0
        } else {
            (sent - received) as f32 / sent as f32
        };
        Self {
            addr,
            sent,
            received,
            delay,
            loss_rate,
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    /// Mean round-trip time over successful probes; meaningless (zero) when
    /// `received() == 0`.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn loss_rate(&self) -> f32 {
        self.loss_rate
    }
}

/// A probe record with its measured download throughput attached.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    probe: ProbeRecord,
    /// Bytes per second; 0.0 when the candidate was never benchmarked.
    speed: f64,
}

impl BenchmarkRecord {
    pub fn new(probe: ProbeRecord, speed: f64) -> Self {
        Self { probe, speed }
    }

    /// Wraps a probe record that skipped the throughput stage.
    pub fn unbenched(probe: ProbeRecord) -> Self {
        Self::new(probe, 0.0)
    }

    pub fn probe(&self) -> &ProbeRecord {
        &self.probe
    }

    /// Throughput in bytes per second.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn speed_mb(&self) -> f64 {
        self.speed / MB
    }

    /// The six sink columns: address, sent, received, loss rate, average
    /// delay in milliseconds, throughput in MB/s.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.probe.addr().to_string(),
            self.probe.sent().to_string(),
            self.probe.received().to_string(),
            format!("{:.2}", self.probe.loss_rate()),
            format!("{:.2}", self.probe.delay().as_secs_f64() * 1000.0),
            format!("{:.2}", self.speed_mb()),
        ]
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
    use std::net::Ipv4Addr;

    fn addr() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))
    }

    #[test]
    fn loss_rate_stays_in_unit_interval() {
        for received in 0..=4 {
            let rec = ProbeRecord::new(addr(), 4, received, Duration::from_millis(120));
            assert!(rec.received() <= rec.sent());
            assert!((0.0..=1.0).contains(&rec.loss_rate()));
        }
        let none = ProbeRecord::new(addr(), 4, 0, Duration::ZERO);
        assert_eq!(none.loss_rate(), 1.0);
        assert_eq!(none.delay(), Duration::ZERO);
    }

    #[test]
    fn delay_is_the_mean_over_received_probes() {
        let rec = ProbeRecord::new(addr(), 4, 3, Duration::from_millis(90));
        assert_eq!(rec.delay(), Duration::from_millis(30));
    }

    #[test]
    fn row_formats_to_two_decimals() {
        let probe = ProbeRecord::new(addr(), 4, 4, Duration::from_millis(101));
        let rec = BenchmarkRecord::new(probe, 15.5 * MB);
        let row = rec.to_row();
        assert_eq!(row[0], "203.0.113.7");
        assert_eq!(row[1], "4");
        assert_eq!(row[2], "4");
        assert_eq!(row[3], "0.00");
        assert_eq!(row[4], "25.25");
        assert_eq!(row[5], "15.50");
    }

    #[test]
    fn unbenched_records_report_zero_speed() {
        let probe = ProbeRecord::new(addr(), 4, 2, Duration::from_millis(80));
        let rec = BenchmarkRecord::unbenched(probe);
        assert_eq!(rec.speed(), 0.0);
        assert_eq!(rec.to_row()[5], "0.00");
    }
}
