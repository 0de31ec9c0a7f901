//! [`serde`] support for [`SteamId`] and [`LegacySteamId`].
//!
//! Steam's Web API sends 64-bit IDs as JSON strings, so that is the default serialization format.
//! Use the `serialize_*` / `deserialize_*` helpers with `#[serde(with = "...")]`-style attributes
//! when a different representation is required.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::{LegacySteamId, SteamId};

mod visitors;
pub use visitors::{VisitEverything, VisitLegacy, VisitU64};

impl SteamId {
    pub fn serialize_u64<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_u64().serialize(serializer)
    }

    pub fn serialize_u64_stringified<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format_args!("{}", self.as_u64()).serialize(serializer)
    }

    pub fn serialize_legacy<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_legacy().serialize(serializer)
    }
}

impl Serialize for SteamId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.serialize_u64_stringified(serializer)
    }
}

impl SteamId {
    pub fn deserialize_u64<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(VisitU64::default())
    }

    pub fn deserialize_legacy<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_str(VisitLegacy::default())
            .map(LegacySteamId::to_steam_id)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(VisitEverything::default())
    }
}

impl Serialize for LegacySteamId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format_args!("{self}").serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LegacySteamId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(VisitLegacy::default())
    }
}
