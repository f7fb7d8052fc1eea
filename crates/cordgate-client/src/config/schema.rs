use serde::Deserialize;
use tokio::time::Duration;

use cordgate_core::error::{GatewayError, Result};
use cordgate_core::protocol::{Identify, IdentifyProperties, Intents};

use crate::session::BackoffPolicy;

/// Protocol version requested in the default gateway URL.
pub const GATEWAY_VERSION: u8 = 9;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub gateway: GatewaySection,

    #[serde(default)]
    pub backoff: BackoffSection,
}

impl ClientConfig {
    /// In-code construction with defaults for everything but the credentials.
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            version: 1,
            gateway: GatewaySection {
                url: default_url(),
                token: token.into(),
                intents: IntentsSetting::Mask(intents.bits() as i64),
                reconnect: true,
                large_threshold: None,
                properties: IdentifyProperties::default(),
            },
            backoff: BackoffSection::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GatewayError::InvalidConfiguration(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.gateway.validate()?;
        self.backoff.validate()?;
        Ok(())
    }

    /// Identify payload for fresh sessions. Validates the intents on the way.
    pub fn identify(&self) -> Result<Identify> {
        Ok(Identify {
            token: self.gateway.token.clone(),
            intents: self.gateway.intents.resolve()?,
            properties: self.gateway.properties.clone(),
            compress: false,
            large_threshold: self.gateway.large_threshold,
        })
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial: Duration::from_millis(self.backoff.initial_ms),
            max: Duration::from_millis(self.backoff.max_ms),
            multiplier: self.backoff.multiplier as f64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_url")]
    pub url: String,

    pub token: String,

    pub intents: IntentsSetting,

    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    #[serde(default)]
    pub large_threshold: Option<u16>,

    #[serde(default)]
    pub properties: IdentifyProperties,
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("wss://") || self.url.starts_with("ws://")) {
            return Err(GatewayError::InvalidConfiguration(
                "gateway.url must be a ws:// or wss:// url".into(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(GatewayError::InvalidConfiguration(
                "gateway.token must not be empty".into(),
            ));
        }
        self.intents.resolve()?;
        if let Some(t) = self.large_threshold {
            if !(50..=250).contains(&t) {
                return Err(GatewayError::InvalidConfiguration(
                    "gateway.large_threshold must be between 50 and 250".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Intents as a raw mask (`513`) or a list of names (`[guilds, guild_messages]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IntentsSetting {
    Mask(i64),
    Names(Vec<String>),
}

impl IntentsSetting {
    pub fn resolve(&self) -> Result<Intents> {
        match self {
            IntentsSetting::Mask(mask) => Intents::from_mask(*mask),
            IntentsSetting::Names(names) => {
                let mut intents = Intents::NONE;
                for name in names {
                    intents |= Intents::from_name(name)?;
                }
                Ok(intents)
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffSection {
    #[serde(default = "default_backoff_initial_ms")]
    pub initial_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub max_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: u32,
}

impl Default for BackoffSection {
    fn default() -> Self {
        Self {
            initial_ms: default_backoff_initial_ms(),
            max_ms: default_backoff_max_ms(),
            multiplier: default_backoff_multiplier(),
        }
    }
}

impl BackoffSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.initial_ms) {
            return Err(GatewayError::InvalidConfiguration(
                "backoff.initial_ms must be between 100 and 60000".into(),
            ));
        }
        if self.max_ms < self.initial_ms || self.max_ms > 600_000 {
            return Err(GatewayError::InvalidConfiguration(
                "backoff.max_ms must be >= initial_ms and <= 600000".into(),
            ));
        }
        if !(1..=10).contains(&self.multiplier) {
            return Err(GatewayError::InvalidConfiguration(
                "backoff.multiplier must be between 1 and 10".into(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    format!("wss://gateway.discord.gg/?v={GATEWAY_VERSION}&encoding=json")
}
fn default_reconnect() -> bool {
    true
}
fn default_backoff_initial_ms() -> u64 {
    1000
}
fn default_backoff_max_ms() -> u64 {
    60_000
}
fn default_backoff_multiplier() -> u32 {
    2
}
