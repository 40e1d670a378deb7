//! Runtime-tunable game settings.
//!
//! Seeded from the `[treasure]` and `[timers]` config sections. The store
//! keeps its own copy that admin commands may change; those changes live in
//! memory only and are gone after a restart.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::GameError;
use super::types::{Treasure, TreasureKind};

/// One row of the treasure weight table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureWeight {
    pub kind: TreasureKind,
    pub weight: u32,
    #[serde(default = "default_amount")]
    pub min_amount: u64,
    #[serde(default = "default_amount")]
    pub max_amount: u64,
}

fn default_amount() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureSettings {
    pub weights: Vec<TreasureWeight>,
    /// Time between redistributions.
    pub interval_ms: i64,
    /// Treasures placed per classroom on each redistribution.
    #[serde(default = "default_per_classroom")]
    pub per_classroom: usize,
    /// Random draws allowed per classroom before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_per_classroom() -> usize {
    2
}

fn default_max_attempts() -> usize {
    20
}

impl Default for TreasureSettings {
    fn default() -> Self {
        Self {
            weights: vec![
                TreasureWeight {
                    kind: TreasureKind::Coins,
                    weight: 60,
                    min_amount: 10,
                    max_amount: 50,
                },
                TreasureWeight {
                    kind: TreasureKind::Xp,
                    weight: 30,
                    min_amount: 20,
                    max_amount: 60,
                },
                TreasureWeight {
                    kind: TreasureKind::EnergyDrink,
                    weight: 10,
                    min_amount: 1,
                    max_amount: 1,
                },
            ],
            interval_ms: 5 * 60 * 1000,
            per_classroom: default_per_classroom(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl TreasureSettings {
    pub fn validate(&self) -> Result<(), GameError> {
        validate_weights(&self.weights)?;
        if self.interval_ms <= 0 {
            return Err(GameError::InvalidSetting(
                "treasure interval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Weighted draw over the table. `None` only when the table is empty or
    /// all weights are zero.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Treasure> {
        let total: u64 = self.weights.iter().map(|w| w.weight as u64).sum();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for w in &self.weights {
            let weight = w.weight as u64;
            if pick < weight {
                let lo = w.min_amount.min(w.max_amount);
                let hi = w.min_amount.max(w.max_amount);
                let amount = if lo == hi { lo } else { rng.gen_range(lo..=hi) };
                return Some(Treasure {
                    kind: w.kind,
                    amount: amount.max(1),
                });
            }
            pick -= weight;
        }
        None
    }
}

pub fn validate_weights(weights: &[TreasureWeight]) -> Result<(), GameError> {
    if weights.is_empty() {
        return Err(GameError::InvalidSetting("weight table is empty".into()));
    }
    if weights.iter().all(|w| w.weight == 0) {
        return Err(GameError::InvalidSetting("weights sum to zero".into()));
    }
    Ok(())
}

/// Everything the transforms need beyond the state itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    pub treasure: TreasureSettings,
    pub lesson_duration_ms: i64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            treasure: TreasureSettings::default(),
            lesson_duration_ms: 10 * 60 * 1000,
        }
    }
}
