// Library for tests and both binaries to access modules

pub mod config;
pub mod metric_source;
pub mod models;
pub mod output;
pub mod probe;
pub mod sampler;
pub mod server;
pub mod thresholds;
