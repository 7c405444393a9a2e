//! Synthetic feed backend.
//!
//! Generates sniffer-shaped traffic for demos and development without an
//! ESP32 on hand: a small fleet of devices whose signal strengths random-
//! walk, a router beaconing on a fixed address, and the occasional burst of
//! boot chatter so downstream code sees realistic noise.

use super::{LineSource, SourceError};
use crate::mac_address::MacAddress;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Pause between generated lines, roughly matching a quiet apartment.
const LINE_INTERVAL: Duration = Duration::from_millis(50);

/// Signal bounds the random walk stays inside, in dBm.
const WALK_FLOOR: f64 = -92.0;
const WALK_CEILING: f64 = -35.0;

struct SimDevice {
    mac: MacAddress,
    rssi: f64,
    channel: u8,
}

/// Feed source generating synthetic sniffer traffic.
pub struct SimSource {
    rng: StdRng,
    fleet: Vec<SimDevice>,
    router: MacAddress,
    seq: u32,
    interval: Duration,
}

impl SimSource {
    /// Create a generator seeded from system entropy, paced like real
    /// hardware.
    pub fn new() -> Self {
        Self::build(StdRng::from_entropy(), LINE_INTERVAL)
    }

    /// Create a deterministic, unpaced generator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(StdRng::seed_from_u64(seed), Duration::ZERO)
    }

    fn build(rng: StdRng, interval: Duration) -> Self {
        // OUI prefixes picked so the vendor column shows something
        let fleet = [
            ("a0cc2b3161f2", -48.0, 6u8),
            ("1848cada4d26", -61.0, 6),
            ("6c19c0e10a84", -55.0, 11),
            ("acbc327f9912", -74.0, 11),
            ("a4cf12045e33", -67.0, 1),
            ("082697773354", -80.0, 6),
        ]
        .iter()
        .map(|(mac, rssi, channel)| SimDevice {
            mac: mac.parse().unwrap_or_default(),
            rssi: *rssi,
            channel: *channel,
        })
        .collect();

        SimSource {
            rng,
            fleet,
            router: "3c5ab401cc90".parse().unwrap_or_default(),
            seq: 0,
            interval,
        }
    }

    fn beacon_line(&mut self) -> String {
        let rssi = self.rng.gen_range(-55..=-45);
        format!(
            "FT: 0 FST: 8 SRC: {} DEST: ffffffffffff RSSI: {} SEQ: {} CHNL: 6",
            self.router, rssi, self.seq
        )
    }

    fn device_line(&mut self) -> String {
        let at = self.rng.gen_range(0..self.fleet.len());
        let step = self.rng.gen_range(-2.5..2.5);
        let device = &mut self.fleet[at];
        device.rssi = (device.rssi + step).clamp(WALK_FLOOR, WALK_CEILING);

        // Mostly data frames, with a sprinkle of probe requests
        let (ft, fst) = if self.rng.gen_bool(0.1) { (0, 4) } else { (2, 0) };
        format!(
            "FT: {} FST: {} SRC: {} DEST: {} RSSI: {} SEQ: {} CHNL: {}",
            ft,
            fst,
            device.mac,
            self.router,
            device.rssi.round() as i32,
            self.seq,
            device.channel
        )
    }
}

impl Default for SimSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for SimSource {
    async fn connect(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        self.seq = self.seq.wrapping_add(1);

        let line = if self.rng.gen_bool(0.02) {
            // boot chatter the parser must shrug off
            "ets Jun  8 2016 00:22:57".to_string()
        } else if self.rng.gen_bool(0.15) {
            self.beacon_line()
        } else {
            self.device_line()
        };

        Ok(Some(line))
    }

    fn describe(&self) -> String {
        format!("simulated sniffer ({} devices)", self.fleet.len())
    }
}
