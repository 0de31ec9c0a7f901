use std::num::ParseIntError;
use std::str::FromStr;

/// The "X" component of a SteamID (bits 56-63).
///
/// Valve only documents universes 0 through 5, but any byte value is preserved as-is.
#[repr(transparent)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Universe(u8);

impl Universe {
    pub const INDIVIDUAL: Self = Self(0);
    pub const PUBLIC: Self = Self(1);
    pub const BETA: Self = Self(2);
    pub const INTERNAL: Self = Self(3);
    pub const DEV: Self = Self(4);
    pub const RC: Self = Self(5);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u8 {
        self.0
    }

    /// The value written into the legacy `STEAM_X:Y:Z` format.
    ///
    /// By convention the public universe is written as `0`.
    pub const fn as_legacy(self) -> Self {
        if self.0 == Self::PUBLIC.0 { Self::INDIVIDUAL } else { self }
    }

    pub(crate) const fn from_u64(value: u64) -> Self {
        Self(value.to_be_bytes()[0])
    }
}

impl FromStr for Universe {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse::<u8>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_byte() {
        assert_eq!(Universe::from_u64(0x0110_0001_0000_0000), Universe::PUBLIC);
        assert_eq!(Universe::from_u64(0xff00_0000_0000_0000).get(), 0xff);
        assert_eq!(Universe::from_u64(0x00ff_ffff_ffff_ffff), Universe::INDIVIDUAL);
    }

    #[test]
    fn legacy_normalizes_public_only() {
        assert_eq!(Universe::PUBLIC.as_legacy(), Universe::INDIVIDUAL);
        assert_eq!(Universe::BETA.as_legacy(), Universe::BETA);
        assert_eq!(Universe::new(200).as_legacy().get(), 200);
    }
}
