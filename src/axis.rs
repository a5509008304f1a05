// Y-axis bound policies and the sliding X window.

use serde::{Deserialize, Serialize};

/// Closed numeric range drawn on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Initial Y bound before any data arrives.
pub const INITIAL_BOUND: f64 = 100.0;

/// Step-quantized bound for throughput charts (MB/s).
///
/// The bound is `floor((m + pad) / step) * step + step` for the window max `m`,
/// so it only moves when `m` crosses a step boundary and always leaves at least
/// `pad` of headroom above the highest point.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedAxis {
    pad: f64,
    step: f64,
    bound: f64,
}

impl QuantizedAxis {
    pub const DEFAULT_PAD: f64 = 20.0;
    pub const DEFAULT_STEP: f64 = 25.0;

    pub fn new(pad: f64, step: f64) -> Self {
        Self {
            pad,
            step,
            bound: INITIAL_BOUND,
        }
    }

    pub fn quantize(&self, max: f64) -> f64 {
        ((max.max(0.0) + self.pad) / self.step).floor() * self.step + self.step
    }

    pub fn recompute(&mut self, max: f64) -> f64 {
        self.bound = self.quantize(max);
        self.bound
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn range(&self) -> AxisRange {
        AxisRange {
            min: 0.0,
            max: self.bound,
        }
    }
}

impl Default for QuantizedAxis {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAD, Self::DEFAULT_STEP)
    }
}

/// Tunables for [`HysteresisAxis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hysteresis {
    /// Grow to `m` once it exceeds this fraction of the bound.
    pub grow_ratio: f64,
    /// Shrink once `m` falls below this fraction of the bound.
    pub shrink_ratio: f64,
    /// Shrunk bound is `m * headroom`.
    pub headroom: f64,
    /// Lowest bound ever shown.
    pub floor: f64,
}

impl Default for Hysteresis {
    fn default() -> Self {
        Self {
            grow_ratio: 1.0,
            shrink_ratio: 0.7,
            headroom: 1.25,
            floor: 1.0,
        }
    }
}

/// `[0, R]` bound for percentage and arbitrary value charts.
///
/// Grows only above `grow_ratio * R` and shrinks only below `shrink_ratio * R`,
/// so values moving inside that band never rescale the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct HysteresisAxis {
    bound: f64,
    params: Hysteresis,
}

impl HysteresisAxis {
    pub fn new(initial: f64, params: Hysteresis) -> Self {
        Self {
            bound: initial.max(params.floor),
            params,
        }
    }

    pub fn recompute(&mut self, max: f64) -> f64 {
        let p = &self.params;
        if max > self.bound * p.grow_ratio {
            self.bound = max;
        } else if max < self.bound * p.shrink_ratio {
            self.bound = max * p.headroom;
        }
        if self.bound < p.floor {
            self.bound = p.floor;
        }
        self.bound
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn params(&self) -> Hysteresis {
        self.params
    }

    pub fn range(&self) -> AxisRange {
        AxisRange {
            min: 0.0,
            max: self.bound,
        }
    }
}

impl Default for HysteresisAxis {
    fn default() -> Self {
        Self::new(INITIAL_BOUND, Hysteresis::default())
    }
}

/// X range covering the most recent `span` units ending at the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingWindow {
    span: u64,
}

impl SlidingWindow {
    /// Tick window used by throughput charts.
    pub const DEFAULT_TICKS: u64 = 300;
    /// Time window used by gauges, in milliseconds.
    pub const DEFAULT_MILLIS: u64 = 60_000;

    pub fn new(span: u64) -> Self {
        Self { span }
    }

    pub fn span(&self) -> u64 {
        self.span
    }

    /// `[head - span, head]`; the start may be negative early on.
    pub fn range(&self, head: u64) -> AxisRange {
        AxisRange {
            min: head as f64 - self.span as f64,
            max: head as f64,
        }
    }
}
