//! Logs module — file discovery, grouping by logical log path, and typed
//! record streaming.

pub mod descriptor;
pub mod walk;
pub mod group;
pub mod stream;
pub mod aggregate;

pub use aggregate::{LoadStats, LogAggregator};
pub use descriptor::LogFileDescriptor;
pub use group::LogGroup;
pub use stream::RecordGenerator;
