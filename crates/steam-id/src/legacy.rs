//! The legacy `STEAM_X:Y:Z` format.

use std::fmt;
use std::str::FromStr;

use crate::{AccountNumber, ParseAccountNumberError, SteamId, Universe};

/// Universe, account type and instance bits of an individual account in the public universe.
const INDIVIDUAL_PUBLIC: u64 = 0x01_10_00_01_00_00_00_00;

/// A SteamID in the legacy `STEAM_X:Y:Z` format.
///
/// Derived deterministically from a [`SteamId`]; the universe is stored already normalized, so
/// parsing the [`Display`] output of a value yields that same value back.
///
/// [`Display`]: fmt::Display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacySteamId {
    universe: Universe,
    y: bool,
    account_number: AccountNumber,
}

#[derive(Debug, Display, Error)]
#[display("failed to parse legacy SteamID: {reason}")]
pub struct ParseLegacyError {
    reason: ParseLegacyErrorReason,
}

#[derive(Debug, Display, Error)]
pub enum ParseLegacyErrorReason {
    #[display("missing `STEAM_` prefix")]
    MissingPrefix,

    #[display("missing universe ('X') segment")]
    MissingUniverse,

    #[display("invalid universe ('X') segment: {_0}")]
    InvalidUniverse(std::num::ParseIntError),

    #[display("missing 'Y' segment")]
    MissingY,

    #[display("invalid 'Y' segment: `{actual}`")]
    InvalidY {
        #[error(ignore)]
        actual: String,
    },

    #[display("missing account number segment")]
    MissingAccountNumber,

    #[display("invalid account number segment: {_0}")]
    InvalidAccountNumber(ParseAccountNumberError),
}

impl From<ParseLegacyErrorReason> for ParseLegacyError {
    fn from(reason: ParseLegacyErrorReason) -> Self {
        Self { reason }
    }
}

impl LegacySteamId {
    pub const fn from_steam_id(steam_id: SteamId) -> Self {
        Self {
            universe: steam_id.universe().as_legacy(),
            y: steam_id.y_bit() == 1,
            account_number: steam_id.account_number(),
        }
    }

    pub const fn universe(&self) -> Universe {
        self.universe
    }

    pub const fn y_bit(&self) -> u64 {
        self.y as u64
    }

    pub const fn account_number(&self) -> AccountNumber {
        self.account_number
    }

    /// Rebuilds a 64-bit SteamID, assuming an individual account with the default instance.
    ///
    /// Universe `0` is mapped back to the public universe.
    pub const fn to_steam_id(self) -> SteamId {
        let universe = match self.universe.get() {
            0 => INDIVIDUAL_PUBLIC,
            other => (INDIVIDUAL_PUBLIC & 0x00ff_ffff_ffff_ffff) | ((other as u64) << 56),
        };

        SteamId::from_u64(universe | ((self.account_number.get() as u64) << 1) | self.y_bit())
    }
}

impl From<SteamId> for LegacySteamId {
    fn from(steam_id: SteamId) -> Self {
        Self::from_steam_id(steam_id)
    }
}

impl fmt::Display for LegacySteamId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "STEAM_{}:{}:{}", self.universe, self.y_bit(), self.account_number)
    }
}

impl FromStr for LegacySteamId {
    type Err = ParseLegacyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut segments = value
            .strip_prefix("STEAM_")
            .ok_or(ParseLegacyErrorReason::MissingPrefix)?
            .splitn(3, ':');

        let universe = match segments.next() {
            Some("") | None => Err(ParseLegacyErrorReason::MissingUniverse),
            Some(raw) => raw
                .parse::<Universe>()
                .map_err(ParseLegacyErrorReason::InvalidUniverse),
        }?;

        let y = match segments.next() {
            Some("0") => Ok(false),
            Some("1") => Ok(true),
            Some("") | None => Err(ParseLegacyErrorReason::MissingY),
            Some(actual) => Err(ParseLegacyErrorReason::InvalidY { actual: actual.to_owned() }),
        }?;

        let account_number = segments
            .next()
            .ok_or(ParseLegacyErrorReason::MissingAccountNumber)?
            .parse::<AccountNumber>()
            .map_err(ParseLegacyErrorReason::InvalidAccountNumber)?;

        Ok(Self { universe: universe.as_legacy(), y, account_number })
    }
}
