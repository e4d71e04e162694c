//! Stock criticality rules
//!
//! The dashboard aggregate and the per-row inventory listing must never
//! disagree about which products are low on stock, so both go through the
//! same pure classification here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default low-stock threshold when the `critical_stock_threshold`
/// setting is absent.
pub const DEFAULT_CRITICAL_THRESHOLD: i64 = 5;

/// Administrator override on an inventory row's criticality.
///
/// `Auto` (the default) defers to the quantity threshold; the other two
/// pin the classification regardless of quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualStatus {
    #[serde(rename = "AUTO")]
    Auto,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "CRITICO")]
    Critico,
}

impl ManualStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualStatus::Auto => "AUTO",
            ManualStatus::Normal => "NORMAL",
            ManualStatus::Critico => "CRITICO",
        }
    }
}

impl fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManualStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(ManualStatus::Auto),
            "NORMAL" => Ok(ManualStatus::Normal),
            "CRITICO" => Ok(ManualStatus::Critico),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown manual status: {}",
                other
            ))),
        }
    }
}

/// Classify an inventory row as low-stock or not.
///
/// A pinned status wins unconditionally; `Auto` compares the quantity
/// against the threshold (inclusive).
pub fn is_critical(quantity: i64, status: ManualStatus, threshold: i64) -> bool {
    match status {
        ManualStatus::Critico => true,
        ManualStatus::Normal => false,
        ManualStatus::Auto => quantity <= threshold,
    }
}
