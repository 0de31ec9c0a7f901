use std::fmt;

use serde::de::{self, Unexpected};

use crate::{LegacySteamId, SteamId};

#[derive(Debug, Default)]
pub struct VisitEverything {
    visit_u64: VisitU64,
    visit_legacy: VisitLegacy,
}

#[derive(Debug, Default)]
pub struct VisitU64 {
    _priv: (),
}

#[derive(Debug, Default)]
pub struct VisitLegacy {
    _priv: (),
}

impl de::Visitor<'_> for VisitEverything {
    type Value = SteamId;

    fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "a SteamID")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        self.visit_u64.visit_u64(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.visit_u64.visit_i64(value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if value.starts_with("STEAM_") {
            self.visit_legacy
                .visit_str(value)
                .map(LegacySteamId::to_steam_id)
        } else {
            self.visit_u64.visit_str(value)
        }
    }
}

impl de::Visitor<'_> for VisitU64 {
    type Value = SteamId;

    fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "a 64-bit SteamID")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(SteamId::from_u64(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(SteamId::from_u64)
            .map_err(|_| de::Error::invalid_value(Unexpected::Signed(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        SteamId::parse_u64(value).map_err(|_| de::Error::invalid_value(Unexpected::Str(value), &self))
    }
}

impl de::Visitor<'_> for VisitLegacy {
    type Value = LegacySteamId;

    fn expecting(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "a SteamID in the `STEAM_X:Y:Z` format")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse::<LegacySteamId>().map_err(de::Error::custom)
    }
}
