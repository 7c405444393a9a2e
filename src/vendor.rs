//! Manufacturer lookup from MAC address prefixes.
//!
//! The first three bytes of a MAC address (the OUI) identify the network
//! interface vendor, which is often the only clue to what an unnamed device
//! is. The table covers the vendors commonly seen on a home network; it is
//! not an exhaustive OUI registry.

use crate::mac_address::MacAddress;

/// Label used when the OUI prefix is not in the table.
pub const UNKNOWN_VENDOR: &str = "unknown vendor";

/// OUI prefix to manufacturer, sorted by prefix for binary search.
const OUI_TABLE: [([u8; 3], &str); 15] = [
    ([0x00, 0x00, 0x0C], "Cisco"),
    ([0x00, 0x1A, 0x11], "Google"),
    ([0x08, 0x26, 0x97], "Samsung"),
    ([0x18, 0x48, 0xCA], "Samsung"),
    ([0x18, 0xFE, 0x34], "Espressif"),
    ([0x24, 0xA1, 0x60], "Espressif"),
    ([0x3C, 0x5A, 0xB4], "Google"),
    ([0x6C, 0x19, 0xC0], "Apple"),
    ([0x78, 0xFD, 0x94], "Apple"),
    ([0xA0, 0xCC, 0x2B], "Samsung"),
    ([0xA4, 0xCF, 0x12], "Espressif"),
    ([0xAC, 0xBC, 0x32], "Apple"),
    ([0xB6, 0xCE, 0x21], "Apple"),
    ([0xDC, 0xE5, 0x5B], "Samsung"),
    ([0xF4, 0xF5, 0xE8], "Google"),
];

/// Manufacturer for an address, if its OUI prefix is recognized.
pub fn lookup(mac: &MacAddress) -> Option<&'static str> {
    let oui = mac.oui();
    OUI_TABLE
        .binary_search_by(|(prefix, _)| prefix.cmp(&oui))
        .ok()
        .map(|at| OUI_TABLE[at].1)
}

/// Manufacturer label for an address, falling back to [`UNKNOWN_VENDOR`].
pub fn label(mac: &MacAddress) -> &'static str {
    lookup(mac).unwrap_or(UNKNOWN_VENDOR)
}
