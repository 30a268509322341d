// Module structure for the Bro log utilities.

// Core infrastructure
pub mod parser;
pub mod client;
pub mod scratch;

// Domain modules
pub mod conf;
pub mod logs;

pub use conf::BroUtilConfig;
pub use logs::aggregate::{LoadStats, LogAggregator};
pub use logs::stream::RecordGenerator;
pub use parser::{FormatRegistry, LogKind, Schema, TypedRecord, Value};
