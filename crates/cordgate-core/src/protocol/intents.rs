//! Gateway intents: a bit set selecting which event categories the server delivers.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;

use crate::error::{GatewayError, Result};

/// Validated intents mask. Only bits in [`Intents::ALL`] can be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Intents(u64);

impl Intents {
    pub const NONE: Intents = Intents(0);
    pub const GUILDS: Intents = Intents(1 << 0);
    pub const GUILD_MEMBERS: Intents = Intents(1 << 1);
    pub const GUILD_BANS: Intents = Intents(1 << 2);
    pub const GUILD_EMOJIS: Intents = Intents(1 << 3);
    pub const GUILD_INTEGRATIONS: Intents = Intents(1 << 4);
    pub const GUILD_WEBHOOKS: Intents = Intents(1 << 5);
    pub const GUILD_INVITES: Intents = Intents(1 << 6);
    pub const GUILD_VOICE_STATES: Intents = Intents(1 << 7);
    pub const GUILD_PRESENCES: Intents = Intents(1 << 8);
    pub const GUILD_MESSAGES: Intents = Intents(1 << 9);
    pub const GUILD_MESSAGE_REACTIONS: Intents = Intents(1 << 10);
    pub const GUILD_MESSAGE_TYPING: Intents = Intents(1 << 11);
    pub const DIRECT_MESSAGES: Intents = Intents(1 << 12);
    pub const DIRECT_MESSAGE_REACTIONS: Intents = Intents(1 << 13);
    pub const DIRECT_MESSAGE_TYPING: Intents = Intents(1 << 14);

    /// Every bit the protocol defines.
    pub const ALL: Intents = Intents((1 << 15) - 1);

    const NAMED: [(&'static str, Intents); 15] = [
        ("guilds", Intents::GUILDS),
        ("guild_members", Intents::GUILD_MEMBERS),
        ("guild_bans", Intents::GUILD_BANS),
        ("guild_emojis", Intents::GUILD_EMOJIS),
        ("guild_integrations", Intents::GUILD_INTEGRATIONS),
        ("guild_webhooks", Intents::GUILD_WEBHOOKS),
        ("guild_invites", Intents::GUILD_INVITES),
        ("guild_voice_states", Intents::GUILD_VOICE_STATES),
        ("guild_presences", Intents::GUILD_PRESENCES),
        ("guild_messages", Intents::GUILD_MESSAGES),
        ("guild_message_reactions", Intents::GUILD_MESSAGE_REACTIONS),
        ("guild_message_typing", Intents::GUILD_MESSAGE_TYPING),
        ("direct_messages", Intents::DIRECT_MESSAGES),
        ("direct_message_reactions", Intents::DIRECT_MESSAGE_REACTIONS),
        ("direct_message_typing", Intents::DIRECT_MESSAGE_TYPING),
    ];

    /// Validate a caller-supplied mask: non-negative, no bits outside [`Intents::ALL`].
    pub fn from_mask(mask: i64) -> Result<Self> {
        if mask < 0 {
            return Err(GatewayError::InvalidConfiguration(format!(
                "intents mask must be non-negative, got {mask}"
            )));
        }
        let bits = mask as u64;
        if bits & !Intents::ALL.0 != 0 {
            return Err(GatewayError::InvalidConfiguration(format!(
                "intents mask {bits:#x} sets bits outside {:#x}",
                Intents::ALL.0
            )));
        }
        Ok(Intents(bits))
    }

    /// Look up a single intent by its snake_case name (`"guild_messages"`).
    pub fn from_name(name: &str) -> Result<Self> {
        Intents::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, i)| *i)
            .ok_or_else(|| GatewayError::InvalidConfiguration(format!("unknown intent: {name}")))
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, other: Intents) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Intents {
    type Output = Intents;

    fn bitor(self, rhs: Intents) -> Intents {
        Intents(self.0 | rhs.0)
    }
}

impl BitOrAssign for Intents {
    fn bitor_assign(&mut self, rhs: Intents) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mask_validation() {
        assert_eq!(Intents::from_mask(0).map(Intents::bits).ok(), Some(0));
        assert_eq!(Intents::from_mask(513).map(Intents::bits).ok(), Some(513));
        assert!(Intents::from_mask(Intents::ALL.bits() as i64).is_ok());

        let neg = Intents::from_mask(-1).unwrap_err();
        assert_eq!(neg.code().as_str(), "INVALID_CONFIGURATION");
        assert!(Intents::from_mask(1 << 15).is_err());
    }

    #[test]
    fn names_and_composition() {
        let i = Intents::from_name("guilds").unwrap() | Intents::from_name("guild_messages").unwrap();
        assert_eq!(i, Intents::GUILDS | Intents::GUILD_MESSAGES);
        assert_eq!(i.bits(), 513);
        assert!(i.contains(Intents::GUILDS));
        assert!(!i.contains(Intents::GUILD_PRESENCES));
        assert!(Intents::from_name("guild_voice").is_err());
    }
}
