use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>10} {wide_bar:.green/black} {pos}/{len}").unwrap()
}

/// Candidate-completion bar for the latency stage.
pub fn probe_bar(total: usize, httping: bool) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(bar_style());
    bar.set_prefix(if httping { "HTTP probe" } else { "TCP probe" });
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Qualifying-result bar for the throughput stage; position is the
/// qualifying count, so the bar fills exactly when the target is met and
/// stays short when the candidates run out first.
pub fn bench_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(bar_style());
    bar.set_prefix("download");
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
