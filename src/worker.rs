// Background sampling task.
// Reads run on the blocking pool; each complete TickSample is handed to the renderer
// through a one-slot channel, and the next tick waits until that slot is free again.

use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, interval};
use tracing::{Instrument, instrument};

use crate::config::SourcesConfig;
use crate::models::TickSample;
use crate::reader::CounterReader;
use crate::sampler::{DiskSource, NetworkSource, RateSampler};
use crate::usage::{self, CpuLoadSampler};

/// The handoff holds at most one unconsumed sample.
pub const HANDOFF_CAPACITY: usize = 1;

/// Sender/receiver pair used between the worker and the renderer.
pub fn handoff() -> (mpsc::Sender<TickSample>, mpsc::Receiver<TickSample>) {
    mpsc::channel(HANDOFF_CAPACITY)
}

/// Milliseconds since the Unix epoch; 0 (with a warning) if the clock is before it.
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}

/// All samplers of one process. Each family keeps its own previous snapshot.
pub struct Collector {
    cpu: CpuLoadSampler,
    memory_reader: CounterReader,
    disks: RateSampler<DiskSource>,
    networks: RateSampler<NetworkSource>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(CounterReader::default())
    }
}

impl Collector {
    pub fn new(reader: CounterReader) -> Self {
        Self {
            cpu: CpuLoadSampler::new(reader.clone()),
            memory_reader: reader.clone(),
            disks: RateSampler::new(DiskSource::new(reader.clone())),
            networks: RateSampler::new(NetworkSource::new(reader)),
        }
    }

    pub fn from_config(sources: &SourcesConfig) -> Self {
        Self::new(CounterReader::new(&sources.proc_root, &sources.sys_root))
    }

    /// One full tick. Blocking: performs pseudo-file reads.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub fn collect(&mut self, timestamp_ms: u64) -> TickSample {
        let cpu_percent = self.cpu.sample().unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "read_cpu_counters",
                "CPU load unavailable"
            );
            None
        });
        let memory_percent =
            usage::sample_memory_percent(&self.memory_reader).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    operation = "read_memory_counters",
                    "memory usage unavailable"
                );
                None
            });
        TickSample {
            timestamp_ms,
            cpu_percent,
            memory_percent,
            disks: self.disks.sample(timestamp_ms),
            networks: self.networks.sample(timestamp_ms),
        }
    }
}

/// Collector, handoff sender and shutdown for the worker.
pub struct WorkerDeps {
    pub collector: Arc<Mutex<Collector>>,
    pub tx: mpsc::Sender<TickSample>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log sampler stats (real seconds).
    pub stats_log_interval_secs: u64,
}

async fn collect_blocking(
    collector: Arc<Mutex<Collector>>,
    timestamp_ms: u64,
) -> anyhow::Result<TickSample> {
    tokio::task::spawn_blocking(move || {
        let mut collector = collector
            .lock()
            .map_err(|e| anyhow::anyhow!("collector lock poisoned: {}", e))?;
        Ok::<_, anyhow::Error>(collector.collect(timestamp_ms))
    })
    .await
    .map_err(|e| anyhow::anyhow!("collector task join: {}", e))?
}

/// Spawns the sampling loop. It runs until `shutdown_rx` fires or the receiver is dropped.
pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        collector,
        tx,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);

    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(sample_interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut ticks_sampled: u64 = 0;
            let mut ticks_failed: u64 = 0;

            'run: loop {
                tokio::select! {
                    _ = tick.tick() => {
                        // Wait for the renderer to take the previous sample before reading again.
                        let permit = tokio::select! {
                            permit = tx.reserve() => match permit {
                                Ok(p) => p,
                                Err(_) => {
                                    tracing::debug!("Renderer dropped the handoff receiver");
                                    break 'run;
                                }
                            },
                            _ = &mut shutdown_rx => {
                                tracing::debug!("Worker shutting down");
                                break 'run;
                            }
                        };
                        match collect_blocking(collector.clone(), unix_millis()).await {
                            Ok(sample) => {
                                permit.send(sample);
                                ticks_sampled += 1;
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, operation = "collect", "tick skipped");
                                ticks_failed += 1;
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break 'run;
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(ticks_sampled, ticks_failed, "sampler stats");
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}
