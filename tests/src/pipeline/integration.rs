#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use edgerank_common::config::Config;
use edgerank_common::record::{BenchmarkRecord, MB, ProbeRecord};
use edgerank_core::ping::Prober;
use edgerank_core::{download, expand, rank};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::net::TcpListener;

async fn accepting_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Expansion → probing → ranking → passthrough over a loopback listener,
/// the whole pipeline in connect-timing mode with benchmarking disabled.
#[tokio::test]
async fn loopback_pipeline_with_download_disabled() {
    let (listener, port) = accepting_listener().await;
    tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
        }
    });

    let cfg = Config {
        ip_text: Some("127.0.0.1".to_string()),
        port,
        ping_times: 2,
        disable_download: true,
        ..Config::default()
    };

    let mut rng = StdRng::seed_from_u64(1);
    let candidates = expand::load_candidates(&cfg, &mut rng).unwrap();
    assert_eq!(candidates.len(), 1);

    let cfg = Arc::new(cfg);
    let prober = Prober::new(Arc::clone(&cfg)).unwrap();
    let records = prober.run(candidates, None).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sent(), 2);
    assert_eq!(records[0].received(), 2);

    let ranked = rank::by_quality(records);
    let filtered = rank::filter_delay(ranked, &cfg);
    let results = download::passthrough(filtered);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].speed(), 0.0);
    let row = results[0].to_row();
    assert_eq!(row[0], "127.0.0.1");
    assert_eq!(row[3], "0.00");
    assert_eq!(row[5], "0.00");
}

/// A dead candidate sorts behind the live one and an active delay window
/// drops it entirely.
#[tokio::test]
async fn dead_candidates_rank_last_and_filter_out() {
    let (listener, port) = accepting_listener().await;
    tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
        }
    });

    // 127.0.0.2 shares the loopback device but nothing listens there.
    let cfg = Config {
        ip_text: Some("127.0.0.2,127.0.0.1".to_string()),
        port,
        ping_times: 2,
        max_delay: Duration::from_millis(900),
        ..Config::default()
    };

    let mut rng = StdRng::seed_from_u64(2);
    let candidates = expand::load_candidates(&cfg, &mut rng).unwrap();
    assert_eq!(candidates.len(), 2);

    let cfg = Arc::new(cfg);
    let prober = Prober::new(Arc::clone(&cfg)).unwrap();
    let records = prober.run(candidates, None).await;
    assert_eq!(records.len(), 2, "failed candidates must still yield records");

    let ranked = rank::by_quality(records);
    assert_eq!(ranked[0].addr(), "127.0.0.1".parse::<IpAddr>().unwrap());
    assert_eq!(ranked[1].received(), 0);

    let filtered = rank::filter_delay(ranked, &cfg);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].addr(), "127.0.0.1".parse::<IpAddr>().unwrap());
}

/// Bench early stop plus final throughput ordering, end to end over a
/// scripted measurement.
#[tokio::test]
async fn bench_stage_feeds_final_throughput_ranking() {
    let cfg = Config {
        test_count: 3,
        min_speed: 1.5,
        ..Config::default()
    };
    let ranked: Vec<ProbeRecord> = (1..=4)
        .map(|last| {
            ProbeRecord::new(
                IpAddr::V4(Ipv4Addr::new(203, 0, 113, last)),
                4,
                4,
                Duration::from_millis(40 * u64::from(last)),
            )
        })
        .collect();

    let speeds = [6.0, 7.0, 2.0, 9.0];
    let mut next = 0usize;
    let results: Vec<BenchmarkRecord> = {
        let measure = move |_addr: IpAddr| {
            let speed = speeds[next] * MB;
            next += 1;
            async move { speed }
        };
        download::run(ranked, &cfg, None, measure).await
    };

    // Three qualifying measurements reached; the fourth never ran.
    assert_eq!(results.len(), 3);

    let final_order = rank::by_speed(results);
    let speeds_mb: Vec<f64> = final_order.iter().map(|r| r.speed_mb()).collect();
    assert_eq!(speeds_mb, vec![7.0, 6.0, 2.0]);
}
