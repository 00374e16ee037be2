//! # EEPROM Addresses
//!
//! Parsing and formatting of single-byte EEPROM addresses.
//!
//! Manual address input uses a strict grammar: comma-separated tokens, each a `0x`
//! prefix followed by one or two hex digits (e.g. `0x2f,0x30,0x31`). Whitespace
//! around tokens is tolerated, anything else is rejected before a device is touched.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::InkpadError;

static HEX_BYTE: OnceLock<Regex> = OnceLock::new();

fn hex_byte_pattern() -> &'static Regex {
    HEX_BYTE.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]{1,2}$").expect("valid hex byte pattern"))
}

/// Formats a byte as `0x`-prefixed, two-digit lowercase hex.
pub fn hex_byte(value: u8) -> String {
    format!("0x{value:02x}")
}

/// Formats a list of addresses as `0x2f,0x30`.
pub fn format_addresses(addresses: &[u8]) -> String {
    addresses
        .iter()
        .map(|addr| hex_byte(*addr))
        .collect::<Vec<String>>()
        .join(",")
}

/// Parses a single `0x`-prefixed token of one or two hex digits.
pub fn parse_hex_byte(token: &str) -> Option<u8> {
    if !hex_byte_pattern().is_match(token) {
        return None;
    }
    u8::from_str_radix(&token[2..], 16).ok()
}

/// Removes repeated addresses, keeping the first occurrence of each.
pub fn dedup_addresses(addresses: &[u8]) -> Vec<u8> {
    let mut seen = [false; 256];
    addresses
        .iter()
        .copied()
        .filter(|addr| !std::mem::replace(&mut seen[*addr as usize], true))
        .collect()
}

/// Parses a comma-separated list of hex addresses (e.g. `"0x2f, 0x30"`).
///
/// Repeated addresses are collapsed to their first occurrence.
pub fn parse_address_list(input: &str) -> Result<Vec<u8>, InkpadError> {
    let malformed = |reason: String| InkpadError::MalformedAddressInput {
        input: input.to_string(),
        reason,
    };

    if input.trim().is_empty() {
        return Err(malformed("the list is empty".to_string()));
    }

    let mut addresses: Vec<u8> = Vec::new();
    for (idx, token) in input.split(',').enumerate() {
        let token = token.trim();
        if token.is_empty() {
            return Err(malformed(format!("token {} is empty", idx + 1)));
        }
        let addr = parse_hex_byte(token).ok_or_else(|| {
            malformed(format!("'{token}' is not a 0x-prefixed one or two digit hex byte"))
        })?;
        addresses.push(addr);
    }

    Ok(dedup_addresses(&addresses))
}

/// A validated, non-empty list of EEPROM addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressList(Vec<u8>);

impl AddressList {
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl FromStr for AddressList {
    type Err = InkpadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address_list(s).map(AddressList)
    }
}

impl Deref for AddressList {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_addresses(&self.0))
    }
}

/// Serde helpers accepting either an integer or a `0x`-prefixed string for a byte.
///
/// Bytes are always written back as `0x`-prefixed strings.
pub mod serde_hex {
    use std::collections::BTreeMap;

    use serde::de::{self, Deserialize, Deserializer};
    use serde::Serializer;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum RawByte {
        Int(u64),
        Text(String),
    }

    fn to_byte<E: de::Error>(raw: RawByte) -> Result<u8, E> {
        match raw {
            RawByte::Int(n) => {
                u8::try_from(n).map_err(|_| E::custom(format!("{n} does not fit in a byte")))
            }
            RawByte::Text(s) => parse_text::<E>(&s),
        }
    }

    fn parse_text<E: de::Error>(s: &str) -> Result<u8, E> {
        let s = s.trim();
        super::parse_hex_byte(s)
            .or_else(|| s.parse::<u8>().ok())
            .ok_or_else(|| E::custom(format!("'{s}' is not a byte (expected 0x00..0xff)")))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        to_byte(RawByte::deserialize(deserializer)?)
    }

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex_byte(*value))
    }

    pub mod vec {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
            Vec::<RawByte>::deserialize(deserializer)?
                .into_iter()
                .map(to_byte)
                .collect()
        }

        pub fn serialize<S: Serializer>(values: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(values.iter().map(|value| super::super::hex_byte(*value)))
        }
    }

    /// Address → value maps, keyed by `"0x2f"` or `"47"`.
    pub mod map {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeMap<u8, u8>, D::Error> {
            BTreeMap::<String, RawByte>::deserialize(deserializer)?
                .into_iter()
                .map(|(key, value)| Ok((parse_text(&key)?, to_byte(value)?)))
                .collect()
        }

        pub fn serialize<S: Serializer>(
            values: &BTreeMap<u8, u8>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_map(
                values
                    .iter()
                    .map(|(addr, value)| (super::super::hex_byte(*addr), super::super::hex_byte(*value))),
            )
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
