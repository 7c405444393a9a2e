//! Device registry shared between ingestion and display.
//!
//! All tracked devices live in one ordered map behind one mutex. Every
//! entry point locks it for the duration of the call, so each operation is
//! atomic as seen by concurrent callers; there is no state split across
//! locks to drift apart. Callers pass the current instant in rather than
//! having the registry read the clock, which keeps eviction decisions
//! testable without sleeping.

use crate::alias::{self, AliasMap};
use crate::mac_address::MacAddress;
use crate::observation::Observation;
use crate::smoothing;
use log::{debug, info};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// How long a device may go unseen before eviction.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Radians a device's bearing drifts per accepted observation.
pub const DEFAULT_ANGLE_STEP: f64 = 0.005;

/// Tuning for the registry's update and eviction behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrySettings {
    /// Smoothing factor for the running signal average, in `(0, 1]`
    pub alpha: f64,
    /// Unseen-time threshold beyond which a device is evicted
    pub timeout: Duration,
    /// Bearing drift per observation, in radians
    pub angle_step: f64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        RegistrySettings {
            alpha: smoothing::DEFAULT_ALPHA,
            timeout: DEFAULT_TIMEOUT,
            angle_step: DEFAULT_ANGLE_STEP,
        }
    }
}

/// Everything tracked about one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Device address, also the registry key
    pub mac: MacAddress,
    /// Configured name, or the truncated placeholder
    pub display_name: String,
    /// Whether the name came from the alias table
    pub is_known: bool,
    /// Smoothed signal strength in dBm
    pub smoothed_signal: f64,
    /// When the device was last observed
    pub last_seen: Instant,
    /// Display bearing in radians; stable per address, drifts per update
    pub angle: f64,
    /// Whether the display shows this device's detail rows
    pub detail_expanded: bool,
}

/// Mutex-guarded map of currently visible devices.
#[derive(Debug)]
pub struct DeviceRegistry {
    settings: RegistrySettings,
    aliases: AliasMap,
    records: Mutex<BTreeMap<MacAddress, DeviceRecord>>,
}

impl DeviceRegistry {
    /// Create a registry with the given tuning and alias table.
    pub fn new(settings: RegistrySettings, aliases: AliasMap) -> Self {
        DeviceRegistry {
            settings,
            aliases,
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Fold one observation into the registry.
    ///
    /// A first sighting seeds the signal average with the raw reading and
    /// assigns the device its bearing. Repeat sightings blend the reading
    /// into the average, refresh the eviction clock and drift the bearing.
    pub fn upsert(&self, observation: Observation, now: Instant) {
        let mut records = self.locked();
        match records.entry(observation.mac) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.smoothed_signal = smoothing::smooth(
                    record.smoothed_signal,
                    f64::from(observation.rssi),
                    self.settings.alpha,
                );
                record.last_seen = now;
                record.angle += self.settings.angle_step;
            }
            Entry::Vacant(entry) => {
                let (display_name, is_known) = alias::resolve(&self.aliases, &observation.mac);
                debug!("tracking new device {} ({})", observation.mac, display_name);
                entry.insert(DeviceRecord {
                    mac: observation.mac,
                    display_name,
                    is_known,
                    smoothed_signal: f64::from(observation.rssi),
                    last_seen: now,
                    angle: seed_angle(&observation.mac),
                    detail_expanded: false,
                });
            }
        }
    }

    /// Evict devices unseen for longer than the timeout.
    ///
    /// A device seen exactly `timeout` ago survives; eviction requires
    /// strictly more unseen time.
    ///
    /// # Returns
    /// The evicted addresses in ascending order.
    pub fn sweep_expired(&self, now: Instant) -> Vec<MacAddress> {
        let mut records = self.locked();
        let stale: Vec<MacAddress> = records
            .iter()
            .filter(|(_, record)| now.duration_since(record.last_seen) > self.settings.timeout)
            .map(|(mac, _)| *mac)
            .collect();

        for mac in &stale {
            records.remove(mac);
            info!("removing {mac} due to timeout");
        }
        stale
    }

    /// Flip a device's detail view.
    ///
    /// # Returns
    /// The new expanded state, or `None` when the device is no longer
    /// tracked (it may have been evicted since the user saw it).
    pub fn toggle_detail(&self, mac: &MacAddress) -> Option<bool> {
        let mut records = self.locked();
        let record = records.get_mut(mac)?;
        record.detail_expanded = !record.detail_expanded;
        Some(record.detail_expanded)
    }

    /// Copies of all records in ascending address order.
    ///
    /// The snapshot is detached: registry updates after this call do not
    /// show through, so rendering works from a stable view.
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.locked().values().cloned().collect()
    }

    /// Number of currently tracked devices.
    pub fn len(&self) -> usize {
        self.locked().len()
    }

    /// Whether no devices are tracked.
    pub fn is_empty(&self) -> bool {
        self.locked().is_empty()
    }

    fn locked(&self) -> MutexGuard<'_, BTreeMap<MacAddress, DeviceRecord>> {
        // Records stay valid across a panic elsewhere; keep serving them
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        DeviceRegistry::new(RegistrySettings::default(), AliasMap::new())
    }
}

/// Stable display bearing for an address, in `[0, 2PI)`.
///
/// FNV-1a over the address bytes, reduced to whole degrees. Purely a
/// display heuristic so devices spread around the radar instead of
/// stacking on one axis; the same device lands on the same bearing
/// every run.
fn seed_angle(mac: &MacAddress) -> f64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in mac.0 {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    ((hash % 360) as f64).to_radians()
}
