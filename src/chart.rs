// Renderer-side chart state: series, Y bounds and X windows per chart.
// Owned by whichever thread draws; it only ever consumes complete TickSamples.

use std::collections::BTreeMap;

use crate::axis::{AxisRange, Hysteresis, HysteresisAxis, INITIAL_BOUND, QuantizedAxis, SlidingWindow};
use crate::config::AppConfig;
use crate::devices::EntityTracker;
use crate::models::{Entity, Rate, RateSample, TickSample};
use crate::series::Series;

/// Read/write (or receive/transmit) lines of one device, sharing a quantized Y axis.
#[derive(Debug, Clone)]
pub struct ThroughputChart {
    pub a: Series,
    pub b: Series,
    y_axis: QuantizedAxis,
    x_range: AxisRange,
}

impl ThroughputChart {
    fn new(capacity: usize, y_axis: QuantizedAxis, window: SlidingWindow) -> Self {
        Self {
            a: Series::new(capacity),
            b: Series::new(capacity),
            y_axis,
            x_range: window.range(0),
        }
    }

    fn push(&mut self, index: u64, rate: &Rate, window: SlidingWindow) {
        self.a.push(index, rate.a);
        self.b.push(index, rate.b);
        self.y_axis.recompute(self.a.max_value().max(self.b.max_value()));
        self.x_range = window.range(index);
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_axis.range()
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }
}

/// One chart per entity of a family, indexed by a shared tick counter.
#[derive(Debug, Clone)]
pub struct ThroughputBoard {
    charts: BTreeMap<Entity, ThroughputChart>,
    tracker: EntityTracker,
    index: u64,
    capacity: usize,
    pad: f64,
    step: f64,
    window: SlidingWindow,
    prune_after: u32,
}

impl ThroughputBoard {
    pub fn new(capacity: usize, pad: f64, step: f64, window: SlidingWindow, prune_after: u32) -> Self {
        Self {
            charts: BTreeMap::new(),
            tracker: EntityTracker::new(),
            index: 0,
            capacity,
            pad,
            step,
            window,
            prune_after,
        }
    }

    /// Append one rate per entity at the current tick index, then advance the index.
    /// Returns the entities whose charts were pruned.
    pub fn apply(&mut self, sample: &RateSample) -> Vec<Entity> {
        for (entity, rate) in sample.iter() {
            let chart = self.charts.entry(entity.clone()).or_insert_with(|| {
                ThroughputChart::new(
                    self.capacity,
                    QuantizedAxis::new(self.pad, self.step),
                    self.window,
                )
            });
            chart.push(self.index, rate, self.window);
        }
        self.tracker.observe(sample.rates.keys());

        let mut pruned = Vec::new();
        if self.prune_after > 0 {
            for entity in self.tracker.stale(self.prune_after) {
                self.tracker.forget(&entity);
                if self.charts.remove(&entity).is_some() {
                    pruned.push(entity);
                }
            }
        }
        self.index += 1;
        pruned
    }

    pub fn get(&self, entity: &str) -> Option<&ThroughputChart> {
        self.charts.get(entity)
    }

    /// Charts in lexicographic entity order.
    pub fn charts(&self) -> impl Iterator<Item = (&Entity, &ThroughputChart)> {
        self.charts.iter()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Single percentage line keyed by wall-clock milliseconds.
#[derive(Debug, Clone)]
pub struct GaugeChart {
    pub series: Series,
    y_axis: HysteresisAxis,
    window: SlidingWindow,
    x_range: AxisRange,
}

impl GaugeChart {
    pub fn new(capacity: usize, hysteresis: Hysteresis, window: SlidingWindow) -> Self {
        Self {
            series: Series::new(capacity),
            y_axis: HysteresisAxis::new(INITIAL_BOUND, hysteresis),
            window,
            x_range: window.range(0),
        }
    }

    /// Record `value` at `timestamp_ms`; `None` adds no point but still slides the window.
    pub fn apply(&mut self, timestamp_ms: u64, value: Option<f64>) {
        if let Some(v) = value {
            self.series.push(timestamp_ms, v);
            self.y_axis.recompute(self.series.max_value());
        }
        self.x_range = self.window.range(timestamp_ms);
    }

    pub fn latest(&self) -> Option<f64> {
        self.series.last().map(|(_, v)| v)
    }

    pub fn y_range(&self) -> AxisRange {
        self.y_axis.range()
    }

    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }
}

/// Everything a renderer draws: CPU and memory gauges plus per-device and
/// per-interface throughput charts.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub cpu: GaugeChart,
    pub memory: GaugeChart,
    pub disks: ThroughputBoard,
    pub networks: ThroughputBoard,
    ticks: u64,
}

impl Dashboard {
    pub fn from_config(config: &AppConfig) -> Self {
        let series = &config.series;
        let axis = &config.axis;
        let time_window = SlidingWindow::new(series.time_window_ms);
        let tick_window = SlidingWindow::new(series.tick_window);
        let board = || {
            ThroughputBoard::new(
                series.capacity,
                axis.pad,
                axis.step,
                tick_window,
                series.prune_after_missed_ticks,
            )
        };
        Self {
            cpu: GaugeChart::new(series.capacity, axis.hysteresis(), time_window),
            memory: GaugeChart::new(series.capacity, axis.hysteresis(), time_window),
            disks: board(),
            networks: board(),
            ticks: 0,
        }
    }

    pub fn apply(&mut self, tick: &TickSample) {
        self.cpu.apply(tick.timestamp_ms, tick.cpu_percent);
        self.memory.apply(tick.timestamp_ms, tick.memory_percent);
        for entity in self.disks.apply(&tick.disks) {
            tracing::info!(entity = %entity, "disk chart pruned");
        }
        for entity in self.networks.apply(&tick.networks) {
            tracing::info!(entity = %entity, "network chart pruned");
        }
        self.ticks += 1;
    }

    /// Ticks consumed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
