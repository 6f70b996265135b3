mod commands;
mod export;
mod terminal;

use std::net::IpAddr;
use std::sync::Arc;

use commands::CommandLine;
use edgerank_common::config::Config;
use edgerank_common::record::BenchmarkRecord;
use edgerank_common::{failure, success};
use edgerank_core::ping::{Prober, ProgressFn};
use edgerank_core::{download, expand, rank};
use rand::SeedableRng;
use rand::rngs::StdRng;
use terminal::{logging, print, progress};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();
    print::banner();

    let cfg: Config = commands.into_config()?;
    run(cfg).await
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    if cfg.speed_floor_without_delay_cap() {
        warn!("--sl without --tl may benchmark many slow candidates before the target fills; consider pairing them");
    }

    // The one process-wide random source, seeded once at startup.
    let mut rng: StdRng = StdRng::from_os_rng();
    let candidates: Vec<IpAddr> = expand::load_candidates(&cfg, &mut rng)?;
    success!("{} candidate addresses ready", candidates.len());

    let cfg: Arc<Config> = Arc::new(cfg);

    print::header("latency probing");
    let bar = progress::probe_bar(candidates.len(), cfg.httping);
    let tick: ProgressFn = {
        let bar = bar.clone();
        Box::new(move |done| bar.set_position(done as u64))
    };
    let prober = Prober::new(Arc::clone(&cfg))?;
    let records = prober.run(candidates, Some(tick)).await;
    bar.finish_and_clear();
    success!("{} addresses measured", records.len());

    let ranked = rank::by_quality(records);
    let filtered = rank::filter_delay(ranked, &cfg);
    if filtered.is_empty() {
        failure!("no address survived the latency stage");
    }

    let results: Vec<BenchmarkRecord> = if cfg.disable_download || filtered.is_empty() {
        // Benchmarking disabled: latency order carries through unchanged.
        download::passthrough(filtered)
    } else {
        print::header("throughput benchmarking");
        let bar = progress::bench_bar(cfg.test_count.min(filtered.len()));
        let tick: ProgressFn = {
            let bar = bar.clone();
            Box::new(move |done| bar.set_position(done as u64))
        };
        let benched = download::bench(filtered, &cfg, Some(tick)).await?;
        bar.finish_and_clear();
        rank::by_speed(benched)
    };

    print::header("results");
    let export_result: anyhow::Result<()> = match &cfg.output {
        Some(path) if !results.is_empty() => export::write_csv(path, &results),
        _ => Ok(()),
    };

    // The table renders even when the export failed; the error surfaces after.
    print::table(&results, cfg.print_num);
    if export_result.is_ok() && !results.is_empty() {
        if let Some(path) = &cfg.output {
            success!("full results written to {}", path.display());
        }
    }
    export_result
}
