//! Push notification types
//!
//! Headers attached to every outbound push request and the claims signed
//! into the VAPID token.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Thirty days; the push service may drop a message after this window.
pub const DEFAULT_TTL: i64 = 60 * 60 * 24 * 30;

// =============================================================================
// Push Message Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushHeader {
    pub ttl: i64,
    pub urgency: Urgency,
}

impl Default for PushHeader {
    fn default() -> Self {
        PushHeader {
            ttl: DEFAULT_TTL,
            urgency: Urgency::Normal,
        }
    }
}

// =============================================================================
// Urgency Enum
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Urgency::VeryLow => write!(f, "very-low"),
            Urgency::Low => write!(f, "low"),
            Urgency::Normal => write!(f, "normal"),
            Urgency::High => write!(f, "high"),
        }
    }
}

impl FromStr for Urgency {
    type Err = Error;

    fn from_str(value: &str) -> Result<Urgency, Self::Err> {
        match value {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            _ => Err(Error::ConfigurationError(format!(
                "Urgency not supported: {}",
                value
            ))),
        }
    }
}

// =============================================================================
// JWT Claims
// =============================================================================

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub exp: i64,
}
