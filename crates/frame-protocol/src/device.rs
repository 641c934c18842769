//! Device Identifiers
//!
//! Each helmet unit reports a 6-byte hardware identifier (its radio MAC) in
//! the trailing section of every frame. The identifier is the aggregation
//! key: as long as the same physical device reports, its history accumulates
//! under the same `DeviceId`.

use crate::error::FrameError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 6-byte device identifier, rendered as lower-case colon-separated hex
/// pairs (e.g. `a1:b2:c3:d4:e5:f6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; 6]);

impl DeviceId {
    /// Create an identifier from raw bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Get the raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for DeviceId {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for slot in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| FrameError::InvalidDeviceId(s.to_string()))?;
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| FrameError::InvalidDeviceId(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(FrameError::InvalidDeviceId(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

// Serialized as the colon-hex string so aggregates persist as MAC-keyed
// JSON objects.
impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_renders_colon_hex() {
        let id = DeviceId::new([0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6]);
        assert_eq!(id.to_string(), "a1:b2:c3:d4:e5:f6");
    }

    #[test]
    fn test_parse_round_trip() {
        let id: DeviceId = "0a:1b:2c:3d:4e:5f".parse().unwrap();
        assert_eq!(id.to_string(), "0a:1b:2c:3d:4e:5f");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("a1:b2:c3".parse::<DeviceId>().is_err());
        assert!("a1:b2:c3:d4:e5:f6:00".parse::<DeviceId>().is_err());
        assert!("zz:b2:c3:d4:e5:f6".parse::<DeviceId>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = DeviceId::new([0, 1, 2, 3, 4, 5]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00:01:02:03:04:05\"");
        let back: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
