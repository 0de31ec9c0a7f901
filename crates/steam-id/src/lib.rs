/* Copyright (C) 2024  AlphaKeks <alphakeks@dawn.sh>
 *
 * This library is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this repository.  If not, see <https://www.gnu.org/licenses/>.
 */

//! An implementation of [Valve's SteamID].
//!
//! A [`SteamId`] is the 64-bit identifier Steam hands out as the trailing segment of an OpenID
//! claimed identity. [`LegacySteamId`] is the older `STEAM_X:Y:Z` text form derived from it.
//!
//! [Valve's SteamID]: https://developer.valvesoftware.com/wiki/SteamID

#[macro_use]
extern crate derive_more;

use std::borrow::Borrow;
use std::cmp;
use std::fmt;
use std::str::FromStr;

mod account_number;
pub use account_number::{AccountNumber, ParseAccountNumberError};

mod universe;
pub use universe::Universe;

mod legacy;
pub use legacy::{LegacySteamId, ParseLegacyError};

#[cfg(feature = "serde")]
pub mod serde;

/// A 64-bit SteamID.
///
/// Every `u64` is accepted; the individual fields are extracted with plain bit operations and
/// never validated against Valve's list of known universes or account types.
#[repr(transparent)]
#[derive(Clone, Copy, Deref, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Binary, LowerHex, UpperHex, Octal)]
pub struct SteamId(u64);

#[derive(Debug, Display, Error)]
#[display("failed to parse SteamID: {reason}")]
pub struct ParseSteamIdError {
    reason: ParseSteamIdErrorReason,
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseSteamIdErrorReason {
    #[display("empty input")]
    Empty,

    #[display("input contains non-digit characters")]
    InvalidDigit,

    #[display("value does not fit in 64 bits")]
    Overflow,
}

impl ParseSteamIdError {
    pub const fn reason(&self) -> ParseSteamIdErrorReason {
        self.reason
    }
}

impl SteamId {
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Bits 56-63.
    #[doc(alias = "x")]
    pub const fn universe(&self) -> Universe {
        Universe::from_u64(self.0)
    }

    /// Bit 0.
    pub const fn y_bit(&self) -> u64 {
        self.0 & 1
    }

    /// Bits 1-31.
    #[doc(alias = "z")]
    pub const fn account_number(&self) -> AccountNumber {
        AccountNumber::from_u64(self.0)
    }

    /// Converts this SteamID into the legacy `STEAM_X:Y:Z` format.
    pub const fn as_legacy(self) -> LegacySteamId {
        LegacySteamId::from_steam_id(self)
    }

    /// Parses a string of ASCII decimal digits.
    ///
    /// Unlike [`u64::from_str`], a leading `+` is rejected.
    pub fn parse_u64(value: &str) -> Result<Self, ParseSteamIdError> {
        if value.is_empty() {
            return Err(ParseSteamIdError { reason: ParseSteamIdErrorReason::Empty });
        }

        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ParseSteamIdError { reason: ParseSteamIdErrorReason::InvalidDigit });
        }

        value
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseSteamIdError { reason: ParseSteamIdErrorReason::Overflow })
    }
}

impl fmt::Debug for SteamId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if fmt.alternate() {
            fmt.debug_struct("SteamId")
                .field("universe", &self.universe())
                .field("account_number", &self.account_number())
                .field("Y", &self.y_bit())
                .finish()
        } else {
            <Self as fmt::Display>::fmt(self, fmt)
        }
    }
}

impl fmt::Display for SteamId {
    /// By default SteamIDs will be displayed as their 64-bit decimal value.
    ///
    /// If the `#` sigil is included in the format string, the legacy `STEAM_X:Y:Z` format is used
    /// instead.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if fmt.alternate() {
            fmt::Display::fmt(&self.as_legacy(), fmt)
        } else {
            fmt::Display::fmt(&self.0, fmt)
        }
    }
}

impl Borrow<u64> for SteamId {
    fn borrow(&self) -> &u64 {
        &self.0
    }
}

impl PartialEq<u64> for SteamId {
    fn eq(&self, rhs: &u64) -> bool {
        self.0 == *rhs
    }
}

impl PartialEq<SteamId> for u64 {
    fn eq(&self, rhs: &SteamId) -> bool {
        *self == rhs.0
    }
}

impl PartialOrd<u64> for SteamId {
    fn partial_cmp(&self, rhs: &u64) -> Option<cmp::Ordering> {
        u64::partial_cmp(&self.0, rhs)
    }
}

impl PartialOrd<SteamId> for u64 {
    fn partial_cmp(&self, rhs: &SteamId) -> Option<cmp::Ordering> {
        u64::partial_cmp(self, &rhs.0)
    }
}

impl From<u64> for SteamId {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<SteamId> for u64 {
    fn from(steam_id: SteamId) -> Self {
        steam_id.0
    }
}

impl FromStr for SteamId {
    type Err = ParseSteamIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_u64(value)
    }
}
