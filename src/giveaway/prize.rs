//! Prize tiers and the weighted random draw.

use rand::Rng;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::core::error::{AppError, AppResult};

/// Prize category. The string form is what the code file and the database use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum Tier {
    Large,
    Medium,
    Small,
}

impl Tier {
    pub fn emoji(self) -> &'static str {
        match self {
            Tier::Large => "🎃",
            Tier::Medium => "🍭",
            Tier::Small => "🍬",
        }
    }
}

impl ToSql for Tier {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let name: &str = self.as_ref();
        Ok(ToSqlOutput::from(name))
    }
}

impl FromSql for Tier {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: strum::ParseError| FromSqlError::Other(Box::new(e)))
    }
}

/// One row of the prize table
#[derive(Debug, Clone, PartialEq)]
pub struct Prize {
    pub tier: Tier,
    pub probability: f64,
    /// Reply text; `{code}` is replaced with the redemption code
    pub message_template: String,
}

impl Prize {
    pub fn new(tier: Tier, probability: f64, message_template: impl Into<String>) -> Self {
        Self {
            tier,
            probability,
            message_template: message_template.into(),
        }
    }

    pub fn render(&self, code: &str) -> String {
        self.message_template.replace("{code}", code)
    }
}

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Ordered list of prizes whose probabilities sum to 1.0
#[derive(Debug, Clone)]
pub struct PrizeTable {
    prizes: Vec<Prize>,
}

impl PrizeTable {
    pub fn new(prizes: Vec<Prize>) -> AppResult<Self> {
        if prizes.is_empty() {
            return Err(AppError::Validation("prize table is empty".to_string()));
        }
        if let Some(bad) = prizes.iter().find(|p| !(0.0..=1.0).contains(&p.probability)) {
            return Err(AppError::Validation(format!(
                "probability {} for {} is outside [0, 1]",
                bad.probability, bad.tier
            )));
        }
        let sum: f64 = prizes.iter().map(|p| p.probability).sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(AppError::Validation(format!("prize probabilities sum to {}, expected 1.0", sum)));
        }
        Ok(Self { prizes })
    }

    /// Halloween candy table: 20% Large, 30% Medium, 50% Small.
    pub fn halloween() -> Self {
        Self {
            prizes: vec![
                Prize::new(Tier::Large, 0.20, "🎃 Whoa! You just unlocked Large Candy! CODE: {code}"),
                Prize::new(
                    Tier::Medium,
                    0.30,
                    "🍭 Half Spooky, Half Sweet – perfect for the Medium Candy! CODE: {code}",
                ),
                Prize::new(Tier::Small, 0.50, "🍬 Only the Small Candy left... lucky you! CODE: {code}"),
            ],
        }
    }

    pub fn prizes(&self) -> &[Prize] {
        &self.prizes
    }

    pub fn get(&self, tier: Tier) -> Option<&Prize> {
        self.prizes.iter().find(|p| p.tier == tier)
    }

    /// Picks the prize whose cumulative interval contains `sample` (in `[0, 1)`).
    ///
    /// Falls back to the last prize when float drift keeps the running sum
    /// below the sample.
    pub fn draw(&self, sample: f64) -> &Prize {
        let mut cumulative = 0.0;
        for prize in &self.prizes {
            cumulative += prize.probability;
            if sample <= cumulative {
                return prize;
            }
        }
        // `new` rejects empty tables
        &self.prizes[self.prizes.len() - 1]
    }

    pub fn draw_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &Prize {
        self.draw(rng.gen::<f64>())
    }
}

impl Default for PrizeTable {
    fn default() -> Self {
        Self::halloween()
    }
}
