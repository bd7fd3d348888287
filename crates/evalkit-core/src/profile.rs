//! Named sensor operating modes and their load-trigger codes.
//!
//! The name -> code mapping is part of the device protocol: writing the code
//! to the configuration-load register makes the board apply the mode.

use crate::error::SensorError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationProfile {
    /// Rolling shutter, 12-bit.
    Rs12b,
    /// Rolling shutter, 10-bit.
    Rs10b,
    /// Rolling shutter, 8-bit.
    Rs8b,
    /// Global shutter, 10-bit.
    Gs10b,
    /// Global shutter, 8-bit.
    Gs8b,
    /// User-saved slot 0..=7.
    User(u8),
}

const FACTORY_PROFILES: &[(&str, ConfigurationProfile, u32)] = &[
    ("RS-12b", ConfigurationProfile::Rs12b, 0),
    ("RS-10b", ConfigurationProfile::Rs10b, 1),
    ("RS-8b", ConfigurationProfile::Rs8b, 2),
    ("GS-10b", ConfigurationProfile::Gs10b, 4),
    ("GS-8b", ConfigurationProfile::Gs8b, 5),
];

const USER_SLOTS: u8 = 8;
const USER_BASE_CODE: u32 = 8;

impl ConfigurationProfile {
    /// Code written to the configuration-load trigger register.
    pub fn code(&self) -> u32 {
        match self {
            Self::User(slot) => USER_BASE_CODE + u32::from(*slot),
            factory => FACTORY_PROFILES
                .iter()
                .find(|(_, p, _)| p == factory)
                .map(|(_, _, code)| *code)
                .unwrap_or_default(),
        }
    }

    /// Every profile the device protocol defines, in code order.
    pub fn all() -> impl Iterator<Item = ConfigurationProfile> {
        FACTORY_PROFILES
            .iter()
            .map(|(_, p, _)| *p)
            .chain((0..USER_SLOTS).map(ConfigurationProfile::User))
    }
}

impl FromStr for ConfigurationProfile {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, profile, _)) = FACTORY_PROFILES.iter().find(|(name, _, _)| *name == s) {
            return Ok(*profile);
        }
        s.strip_prefix("User")
            .and_then(|slot| slot.parse::<u8>().ok())
            .filter(|slot| *slot < USER_SLOTS)
            .map(ConfigurationProfile::User)
            .ok_or_else(|| SensorError::UnknownConfigurationProfile(s.to_string()))
    }
}

impl fmt::Display for ConfigurationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(slot) => write!(f, "User{slot}"),
            factory => {
                let name = FACTORY_PROFILES
                    .iter()
                    .find(|(_, p, _)| p == factory)
                    .map(|(name, _, _)| *name)
                    .unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}
