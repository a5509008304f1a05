// Domain models: counter snapshots, derived rates, tick payloads

mod counters;
mod tick;
mod usage;

pub use counters::{CounterPair, CounterSnapshot, Entity, Rate, RateSample};
pub use tick::TickSample;
pub use usage::{CpuTicks, MemoryCounters};
