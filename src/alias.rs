//! Device naming.
//!
//! This module maps MAC addresses to human-readable names, so the watch list
//! shows "Kitchen tablet" instead of a hex string. Addresses without a
//! configured name get a privacy-truncated placeholder built from the last
//! four hex digits.

use crate::mac_address::MacAddress;
use std::collections::BTreeMap;

/// A type alias for MAC-to-name mappings.
pub type AliasMap = BTreeMap<MacAddress, String>;

/// A parsed alias mapping a MAC address to a human-readable name.
#[derive(Debug, Clone)]
pub struct Alias {
    /// The device address
    pub address: MacAddress,
    /// The human-readable name (e.g., "Kitchen tablet")
    pub name: String,
}

/// Parse an alias from a string in the format "MAC=NAME".
///
/// The MAC side accepts the same forms as [`MacAddress`]'s parser.
///
/// # Arguments
/// * `src` - A string in the format "aabbccddeeff=Name"
///
/// # Returns
/// A Result containing the parsed Alias or an error message.
///
/// # Example
/// ```
/// use wifi_sentinel::alias::parse_alias;
///
/// let alias = parse_alias("a0:cc:2b:77:5e:0a=Kitchen tablet").unwrap();
/// assert_eq!(alias.address.to_string(), "a0cc2b775e0a");
/// assert_eq!(alias.name, "Kitchen tablet");
/// ```
pub fn parse_alias(src: &str) -> Result<Alias, String> {
    let (address, name) = src
        .split_once('=')
        .ok_or_else(|| "invalid alias: expected format MAC=NAME".to_string())?;

    let address: MacAddress = address
        .trim()
        .parse()
        .map_err(|e| format!("invalid alias: {}", e))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("invalid alias: name is empty".to_string());
    }

    Ok(Alias {
        address,
        name: name.to_string(),
    })
}

/// Convert a slice of Alias values into an AliasMap.
pub fn to_map(aliases: &[Alias]) -> AliasMap {
    aliases
        .iter()
        .map(|a| (a.address, a.name.clone()))
        .collect()
}

/// Resolve the display name for an address.
///
/// # Returns
/// The configured name and `true`, or the truncated placeholder and `false`
/// when the address has no alias.
pub fn resolve(aliases: &AliasMap, mac: &MacAddress) -> (String, bool) {
    match aliases.get(mac) {
        Some(name) => (name.clone(), true),
        None => (format!("unknown ({})", mac.short_suffix()), false),
    }
}
