//! `wifi-sentinel` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit codes.
//! The core “business logic” lives in [`crate::app`] where it can be tested
//! deterministically with injected feed events + injected output streams.

pub mod alias;
pub mod app;
pub mod frame;
pub mod mac_address;
pub mod observation;
pub mod projection;
pub mod registry;
pub mod render;
pub mod smoothing;
pub mod source;
pub mod vendor;
pub mod worker;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use alias::{Alias, AliasMap, parse_alias, to_map};
pub use app::parse_duration;
pub use frame::{FrameReport, ParseError, ParseStrategy, parse_line};
pub use mac_address::MacAddress;
pub use observation::Observation;
pub use projection::{DistanceScale, PathLossModel};
pub use registry::{DeviceRecord, DeviceRegistry, RegistrySettings};
pub use render::{SignalBand, SnapshotFormatter, TextFormatter};
pub use source::{Backend, LineSource, SourceError};
pub use worker::{IngestEvent, NoiseFilter, Termination};
