use anyhow::Result;
use std::io::Write;
use std::sync::{Arc, Mutex};
use sysgraph::chart::{Dashboard, ThroughputBoard};
use sysgraph::*;
use tokio::time::{Duration, interval};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn log_board(family: &str, board: &ThroughputBoard) {
    for (entity, chart) in board.charts() {
        let (a, b) = (chart.a.last(), chart.b.last());
        tracing::info!(
            family,
            entity = %entity,
            latest_a = a.map(|(_, v)| v).unwrap_or(0.0),
            latest_b = b.map(|(_, v)| v).unwrap_or(0.0),
            y_max = chart.y_range().max,
            points = chart.a.len(),
            "throughput chart"
        );
    }
}

fn log_dashboard(dashboard: &Dashboard) {
    tracing::info!(
        ticks = dashboard.ticks(),
        cpu_percent = dashboard.cpu.latest().unwrap_or(0.0),
        cpu_y_max = dashboard.cpu.y_range().max,
        memory_percent = dashboard.memory.latest().unwrap_or(0.0),
        memory_y_max = dashboard.memory.y_range().max,
        disks = dashboard.disks.len(),
        networks = dashboard.networks.len(),
        "dashboard"
    );
    log_board("disk", &dashboard.disks);
    log_board("network", &dashboard.networks);
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        interval_ms = app_config.sampling.interval_ms,
        "{} starting",
        env!("CARGO_PKG_NAME")
    );

    let reader =
        reader::CounterReader::new(&app_config.sources.proc_root, &app_config.sources.sys_root);
    let host_reader = reader.clone();
    let host_info = tokio::task::spawn_blocking(move || host::HostInfo::detect(&host_reader))
        .await
        .map_err(|e| anyhow::anyhow!("host info: {}", e))?;
    tracing::info!(
        host_name = %host_info.host_name,
        os = %host_info.os_name,
        os_version = %host_info.os_version,
        kernel = %host_info.kernel_version,
        processor = %host_info.processor_name,
        logical_cores = host_info.logical_cores,
        "host"
    );

    let (tx, mut rx) = worker::handoff();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            collector: Arc::new(Mutex::new(worker::Collector::new(reader))),
            tx,
            shutdown_rx,
        },
        worker::WorkerConfig {
            sample_interval_ms: app_config.sampling.interval_ms,
            stats_log_interval_secs: app_config.sampling.stats_log_interval_secs,
        },
    );

    let mut dashboard = Dashboard::from_config(&app_config);
    let mut status_tick = interval(Duration::from_secs(
        app_config.sampling.stats_log_interval_secs,
    ));
    status_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let json_lines = app_config.output.json_lines;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            sample = rx.recv() => {
                let Some(sample) = sample else {
                    tracing::warn!("Sampler stopped");
                    break;
                };
                dashboard.apply(&sample);
                if json_lines {
                    let line = serde_json::to_string(&sample)?;
                    let mut out = std::io::stdout().lock();
                    writeln!(out, "{}", line)?;
                    out.flush()?;
                }
                tracing::debug!(
                    timestamp_ms = sample.timestamp_ms,
                    disks = sample.disks.len(),
                    networks = sample.networks.len(),
                    "tick rendered"
                );
            }
            _ = status_tick.tick() => log_dashboard(&dashboard),
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(());
    drop(rx);
    let _ = worker_handle.await;
    log_dashboard(&dashboard);
    Ok(())
}
