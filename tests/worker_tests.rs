// Worker integration tests: collector over a fake host, spawned loop, handoff and shutdown

mod common;

use common::FakeHost;
use std::sync::{Arc, Mutex};
use sysgraph::worker::{Collector, WorkerConfig, WorkerDeps, handoff, spawn, unix_millis};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{Duration, timeout};

fn seeded_host() -> FakeHost {
    let host = FakeHost::new();
    host.write_cpu(100, 0, 100, 800);
    host.write_meminfo(8_000_000, 6_000_000);
    host.write_block_device("sda", 0, 0);
    host.write_sector_size("sda", 512);
    host.write_net_dev(&[("eth0", 0, 0)]);
    host
}

#[test]
fn collector_first_tick_is_cold() {
    let host = seeded_host();
    let mut collector = Collector::new(host.reader());
    let sample = collector.collect(1_000);
    assert_eq!(sample.timestamp_ms, 1_000);
    assert_eq!(sample.cpu_percent, None);
    assert_eq!(sample.memory_percent, Some(25.0));
    assert!(sample.disks.is_empty());
    assert!(sample.networks.is_empty());
}

#[test]
fn collector_second_tick_reports_rates() {
    let host = seeded_host();
    let mut collector = Collector::new(host.reader());
    collector.collect(1_000);

    host.write_cpu(150, 0, 150, 900);
    host.write_block_device("sda", 2_000, 1_000);
    host.write_net_dev(&[("eth0", 2_000_000, 500_000)]);
    let sample = collector.collect(2_000);

    // 100 busy of 200 total
    assert_eq!(sample.cpu_percent, Some(50.0));
    let sda = sample.disks.get("sda").expect("sda rate");
    assert!((sda.a - 1.024).abs() < 1e-9);
    assert!((sda.b - 0.512).abs() < 1e-9);
    let eth0 = sample.networks.get("eth0").expect("eth0 rate");
    assert!((eth0.a - 2.0).abs() < 1e-9);
    assert!((eth0.b - 0.5).abs() < 1e-9);
    assert!(!sample.networks.contains("lo"));
}

#[test]
fn collector_missing_sources_degrade_to_empty_tick() {
    let host = FakeHost::new();
    let mut collector = Collector::new(host.reader());
    collector.collect(1_000);
    let sample = collector.collect(2_000);
    assert_eq!(sample.cpu_percent, None);
    assert_eq!(sample.memory_percent, None);
    assert!(sample.disks.is_empty());
    assert!(sample.networks.is_empty());
}

#[test]
fn unix_millis_is_wall_clock_milliseconds() {
    let ms = unix_millis();
    // 2020-01-01T00:00:00Z
    assert!(ms > 1_577_836_800_000);
    assert!(unix_millis() >= ms);
}

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        sample_interval_ms: 10,
        stats_log_interval_secs: 3600,
    }
}

#[tokio::test]
async fn worker_delivers_ticks_and_stops_on_shutdown() {
    let host = seeded_host();
    let (tx, mut rx) = handoff();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            collector: Arc::new(Mutex::new(Collector::new(host.reader()))),
            tx,
            shutdown_rx,
        },
        worker_config(),
    );

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("first tick in time")
        .expect("worker alive");
    assert_eq!(first.cpu_percent, None);

    let mut last_ts = first.timestamp_ms;
    for _ in 0..3 {
        let sample = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("tick in time")
            .expect("worker alive");
        assert!(sample.timestamp_ms >= last_ts);
        // Counters unchanged: zero load, zero throughput, but every entity present.
        assert_eq!(sample.cpu_percent, Some(0.0));
        assert_eq!(sample.disks.get("sda").map(|r| r.a), Some(0.0));
        assert!(sample.networks.contains("eth0"));
        last_ts = sample.timestamp_ms;
    }

    let _ = shutdown_tx.send(());
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker stops after shutdown")
        .unwrap();
}

#[tokio::test]
async fn worker_waits_for_renderer_then_shuts_down() {
    let host = seeded_host();
    let (tx, mut rx) = handoff();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            collector: Arc::new(Mutex::new(Collector::new(host.reader()))),
            tx,
            shutdown_rx,
        },
        worker_config(),
    );

    // Nobody reads: the worker fills the single slot and blocks on the next one.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());

    // Ten intervals passed, yet exactly one sample is waiting.
    assert!(rx.try_recv().is_ok());
    assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);

    let _ = shutdown_tx.send(());
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("blocked worker still honours shutdown")
        .unwrap();
}

#[tokio::test]
async fn worker_keeps_sampling_after_huge_cpu_counters() {
    let host = seeded_host();
    host.write_cpu(u64::MAX, 1, 0, 0);
    let (tx, mut rx) = handoff();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            collector: Arc::new(Mutex::new(Collector::new(host.reader()))),
            tx,
            shutdown_rx,
        },
        worker_config(),
    );

    for _ in 0..3 {
        let sample = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("tick in time")
            .expect("worker alive");
        assert_eq!(sample.memory_percent, Some(25.0));
    }

    let _ = shutdown_tx.send(());
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker stops after shutdown")
        .unwrap();
}

#[tokio::test]
async fn worker_stops_when_receiver_dropped() {
    let host = seeded_host();
    let (tx, rx) = handoff();
    let (_shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            collector: Arc::new(Mutex::new(Collector::new(host.reader()))),
            tx,
            shutdown_rx,
        },
        worker_config(),
    );
    drop(rx);
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker stops without a renderer")
        .unwrap();
}
