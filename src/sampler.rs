// Rate derivation from consecutive counter snapshots.
// One RateSampler per entity family (disks, networks); each owns its last snapshot.

use std::collections::BTreeMap;

use tracing::instrument;

use crate::devices::{self, EntityTracker};
use crate::error::{Result, SampleError};
use crate::models::{CounterPair, CounterSnapshot, Entity, Rate, RateSample};
use crate::reader::CounterReader;

/// Bytes per megabyte used for MB/s rates.
const BYTES_PER_MB: f64 = 1_000_000.0;

/// Counters read for one family in one tick.
/// Entities that failed individually are listed in `failures` and absent from `counters`.
#[derive(Debug, Default)]
pub struct SourceReading {
    pub counters: BTreeMap<Entity, CounterPair>,
    pub failures: Vec<(Entity, SampleError)>,
}

/// A family of entities with absolute counters.
pub trait CounterSource: Send {
    /// Short family name for logs, e.g. "disk".
    fn family(&self) -> &'static str;

    /// Read absolute counters for every entity currently present.
    /// An `Err` means the whole family is unavailable this tick.
    fn read_counters(&mut self) -> Result<SourceReading>;
}

/// Block devices; counters are bytes read / bytes written.
pub struct DiskSource {
    reader: CounterReader,
}

impl DiskSource {
    pub fn new(reader: CounterReader) -> Self {
        Self { reader }
    }

    fn read_device(&mut self, device: &str) -> Result<CounterPair> {
        let (sectors_read, sectors_written) = self.reader.read_block_device_counters(device)?;
        let sector_size = self.reader.read_sector_size(device)?;
        Ok(CounterPair::new(
            sectors_read.saturating_mul(sector_size),
            sectors_written.saturating_mul(sector_size),
        ))
    }
}

impl CounterSource for DiskSource {
    fn family(&self) -> &'static str {
        "disk"
    }

    fn read_counters(&mut self) -> Result<SourceReading> {
        let devices = devices::list_block_devices(self.reader.sys_root())?;
        let mut reading = SourceReading::default();
        for device in devices {
            match self.read_device(&device) {
                Ok(pair) => {
                    reading.counters.insert(device, pair);
                }
                Err(e) => reading.failures.push((device, e)),
            }
        }
        Ok(reading)
    }
}

/// Network interfaces; counters are bytes received / bytes transmitted.
pub struct NetworkSource {
    reader: CounterReader,
}

impl NetworkSource {
    pub fn new(reader: CounterReader) -> Self {
        Self { reader }
    }
}

impl CounterSource for NetworkSource {
    fn family(&self) -> &'static str {
        "network"
    }

    fn read_counters(&mut self) -> Result<SourceReading> {
        let table = self.reader.read_network_counters()?;
        Ok(SourceReading {
            counters: table.counters,
            failures: table.failures,
        })
    }
}

/// Rate for one counter: `delta` bytes over `elapsed_ms`, in MB/s.
/// A decreasing counter (wraparound, device reset) yields zero.
pub fn rate_mb_per_sec(previous: u64, current: u64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    let delta = current.saturating_sub(previous) as f64;
    delta / BYTES_PER_MB * 1000.0 / elapsed_ms as f64
}

/// Rates for the entities present in both snapshots.
///
/// A non-positive time delta gives every common entity a zero rate.
pub fn derive_rates(previous: &CounterSnapshot, current: &CounterSnapshot) -> RateSample {
    let elapsed_ms = current.timestamp_ms.saturating_sub(previous.timestamp_ms);
    let rates = current
        .counters
        .iter()
        .filter_map(|(entity, now)| {
            let before = previous.get(entity)?;
            Some((
                entity.clone(),
                Rate {
                    a: rate_mb_per_sec(before.a, now.a, elapsed_ms),
                    b: rate_mb_per_sec(before.b, now.b, elapsed_ms),
                },
            ))
        })
        .collect();
    RateSample { rates }
}

/// Cold/Warm state machine turning absolute counters into rates.
///
/// Cold (no previous snapshot): the first sample only records counters and
/// returns an empty [`RateSample`]. Warm: every sample derives rates against
/// the previous snapshot and then replaces it.
pub struct RateSampler<S> {
    source: S,
    previous: Option<CounterSnapshot>,
    tracker: EntityTracker,
}

impl<S: CounterSource> RateSampler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            previous: None,
            tracker: EntityTracker::new(),
        }
    }

    pub fn is_warm(&self) -> bool {
        self.previous.is_some()
    }

    pub fn previous(&self) -> Option<&CounterSnapshot> {
        self.previous.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    #[instrument(skip(self))]
    pub fn sample(&mut self, now_ms: u64) -> RateSample {
        let family = self.source.family();
        let reading = match self.source.read_counters() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "read_counters",
                    "{} counters unavailable",
                    family
                );
                return RateSample::empty();
            }
        };
        for (entity, e) in &reading.failures {
            tracing::warn!(
                error = %e,
                entity = %entity,
                operation = "read_counters",
                "{} entity skipped this tick",
                family
            );
        }

        let changes = self.tracker.observe(reading.counters.keys());
        for entity in &changes.appeared {
            tracing::info!(entity = %entity, "{} appeared", family);
        }
        for entity in &changes.vanished {
            tracing::info!(entity = %entity, "{} vanished", family);
        }

        let current = CounterSnapshot::new(now_ms, reading.counters);
        let rates = match &self.previous {
            None => {
                tracing::debug!("{} sampler warmed up", family);
                RateSample::empty()
            }
            Some(previous) => {
                if now_ms <= previous.timestamp_ms {
                    let anomaly = SampleError::ClockAnomaly {
                        previous_ms: previous.timestamp_ms,
                        now_ms,
                    };
                    if now_ms == previous.timestamp_ms {
                        tracing::debug!(error = %anomaly, "zero elapsed time, rates set to zero");
                    } else {
                        tracing::warn!(error = %anomaly, "clock went backwards, rates set to zero");
                    }
                }
                derive_rates(previous, &current)
            }
        };
        self.previous = Some(current);
        rates
    }
}
