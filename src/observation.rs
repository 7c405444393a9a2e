//! Device sighting data structure.

use crate::mac_address::MacAddress;

/// A single accepted sighting of a device, as handed from the ingestion
/// worker to the registry.
///
/// Carries only what the registry needs: who transmitted and how loud.
/// Frame metadata used for filtering never leaves the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Transmitter address of the captured frame
    pub mac: MacAddress,
    /// Received signal strength in dBm (raw, unsmoothed)
    pub rssi: i32,
}
