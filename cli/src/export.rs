use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use edgerank_common::record::BenchmarkRecord;

pub const CSV_HEADER: [&str; 6] = [
    "IP Address",
    "Sent",
    "Received",
    "Packet Loss Rate",
    "Average Delay",
    "Download Speed (MB/s)",
];

/// Persists the full result set as delimited text with a fixed header row.
///
/// Failure to create the destination is fatal to the run; the caller still
/// renders the console table before surfacing it.
pub fn write_csv(path: &Path, records: &[BenchmarkRecord]) -> anyhow::Result<()> {
    let file: File = File::create(path)
        .with_context(|| format!("cannot create output file '{}'", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", CSV_HEADER.join(","))?;
    for rec in records {
        writeln!(out, "{}", rec.to_row().join(","))?;
    }
    out.flush()?;
    Ok(())
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
    use edgerank_common::record::{MB, ProbeRecord};
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn sample() -> Vec<BenchmarkRecord> {
        let probe = ProbeRecord::new(
            IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
            4,
            4,
            Duration::from_millis(48),
        );
        vec![BenchmarkRecord::new(probe, 12.0 * MB)]
    }

    #[test]
    fn writes_header_and_one_row_per_record() {
        let path = std::env::temp_dir().join(format!("edgerank-csv-{}.csv", std::process::id()));
        write_csv(&path, &sample()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "IP Address,Sent,Received,Packet Loss Rate,Average Delay,Download Speed (MB/s)"
        );
        assert_eq!(lines[1], "1.1.1.1,4,4,0.00,12.00,12.00");
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let path = Path::new("/nonexistent/edgerank/result.csv");
        assert!(write_csv(path, &sample()).is_err());
    }
}
