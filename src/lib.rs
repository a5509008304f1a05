// Library for tests to access modules

pub mod axis;
pub mod chart;
pub mod config;
pub mod devices;
pub mod error;
pub mod host;
pub mod models;
pub mod reader;
pub mod sampler;
pub mod series;
pub mod usage;
pub mod worker;
