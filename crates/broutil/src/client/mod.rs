//! Client module — the external DataSeries decoder behind a trait.
//!
//! `live.rs` runs the real `ds2txt` binary; `fake.rs` serves canned output
//! so tests never depend on it.

pub mod decoder;
pub mod live;
pub mod fake;

pub use decoder::{DecodeError, DecodeMode, Decoder};
pub use fake::FakeDecoder;
pub use live::Ds2TxtDecoder;
