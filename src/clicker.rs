//! Derivative Clicker idle game
//!
//! Click for money, buy "derivative" buildings that pay out once per
//! interval, unlock an achievement for every new building level.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::CLICKER_BASE_PRODUCTION;
use crate::settings::ClickerTuning;

/// A building and its running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub base_cost: f64,
    /// Price of the next unit
    pub cost: f64,
    pub owned: u32,
    /// Money per second this building contributes
    pub production: f64,
    pub growth: f64,
}

/// Result of a successful purchase
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub index: usize,
    pub owned: u32,
    pub paid: f64,
    /// Newly unlocked achievement, if this level had not been reached before
    pub achievement: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickerError {
    UnknownBuilding(usize),
    InsufficientFunds { cost: f64, money: f64 },
}

impl fmt::Display for ClickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickerError::UnknownBuilding(i) => write!(f, "no building at index {i}"),
            ClickerError::InsufficientFunds { cost, money } => {
                write!(f, "need ${cost:.2}, have ${money:.2}")
            }
        }
    }
}

impl std::error::Error for ClickerError {}

#[derive(Debug, Clone)]
pub struct Clicker {
    money: f64,
    money_per_click: f64,
    money_per_second: f64,
    buildings: Vec<Building>,
    achievements: Vec<String>,
    payout_interval_ms: f64,
    /// Time since the last payout
    accumulator_ms: f64,
}

impl Clicker {
    pub fn new(tuning: &ClickerTuning) -> Self {
        let buildings = tuning
            .buildings
            .iter()
            .map(|spec| Building {
                name: spec.name.clone(),
                base_cost: spec.base_cost,
                cost: spec.base_cost,
                owned: 0,
                production: 0.0,
                growth: spec.growth,
            })
            .collect();

        let mut clicker = Self {
            money: tuning.start_money,
            money_per_click: tuning.money_per_click,
            money_per_second: 0.0,
            buildings,
            achievements: Vec::new(),
            payout_interval_ms: tuning.payout_interval_ms,
            accumulator_ms: 0.0,
        };
        clicker.recalculate_production();
        clicker
    }

    pub fn click(&mut self) {
        self.money += self.money_per_click;
    }

    pub fn can_afford(&self, index: usize) -> bool {
        self.buildings
            .get(index)
            .is_some_and(|b| self.money >= b.cost)
    }

    /// Buy one unit of a building
    pub fn buy(&mut self, index: usize) -> Result<Purchase, ClickerError> {
        let building = self
            .buildings
            .get_mut(index)
            .ok_or(ClickerError::UnknownBuilding(index))?;
        if self.money < building.cost {
            return Err(ClickerError::InsufficientFunds {
                cost: building.cost,
                money: self.money,
            });
        }

        let paid = building.cost;
        self.money -= paid;
        building.owned += 1;
        building.cost = (building.cost * building.growth).floor();
        let owned = building.owned;
        let label = format!("{} Level {}", building.name, owned);
        log::info!("Bought {} for ${:.2}", label, paid);

        self.recalculate_production();

        let achievement = if self.achievements.contains(&label) {
            None
        } else {
            log::info!("Achievement unlocked: {}", label);
            self.achievements.push(label.clone());
            Some(label)
        };

        Ok(Purchase {
            index,
            owned,
            paid,
            achievement,
        })
    }

    /// First building pays `0.1 × owned`; each later one pays the previous one's count
    fn recalculate_production(&mut self) {
        let mut previous_owned = 0;
        for (i, building) in self.buildings.iter_mut().enumerate() {
            building.production = if i == 0 {
                CLICKER_BASE_PRODUCTION * f64::from(building.owned)
            } else {
                f64::from(previous_owned)
            };
            previous_owned = building.owned;
        }
        self.money_per_second = self.buildings.iter().map(|b| b.production).sum();
    }

    /// Pay out once per whole interval elapsed; returns the amount paid
    pub fn advance(&mut self, elapsed_ms: f64) -> f64 {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return 0.0;
        }
        if !(self.payout_interval_ms > 0.0) {
            log::warn!("Clicker payout interval {} ms is not positive", self.payout_interval_ms);
            return 0.0;
        }
        self.accumulator_ms += elapsed_ms;

        let mut paid = 0.0;
        while self.accumulator_ms >= self.payout_interval_ms {
            self.accumulator_ms -= self.payout_interval_ms;
            paid += self.money_per_second;
        }
        self.money += paid;
        paid
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn money_per_click(&self) -> f64 {
        self.money_per_click
    }

    pub fn money_per_second(&self) -> f64 {
        self.money_per_second
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn achievements(&self) -> &[String] {
        &self.achievements
    }

    pub fn snapshot(&self) -> ClickerSnapshot {
        ClickerSnapshot {
            money: self.money,
            money_per_click: self.money_per_click,
            money_per_second: self.money_per_second,
            buildings: self.buildings.clone(),
            achievements: self.achievements.clone(),
        }
    }
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickerSnapshot {
    pub money: f64,
    pub money_per_click: f64,
    pub money_per_second: f64,
    pub buildings: Vec<Building>,
    pub achievements: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn rich_clicker(clicks: u32) -> Clicker {
        let mut clicker = Clicker::new(&ClickerTuning::default());
        for _ in 0..clicks {
            clicker.click();
        }
        clicker
    }

    #[test]
    fn test_new_game() {
        let clicker = Clicker::new(&ClickerTuning::default());
        assert!(close(clicker.money(), 0.1));
        assert!(close(clicker.money_per_click(), 1.0));
        assert!(close(clicker.money_per_second(), 0.0));
        assert_eq!(clicker.buildings().len(), 3);
        assert!(clicker.achievements().is_empty());
    }

    #[test]
    fn test_click_adds_money() {
        let clicker = rich_clicker(3);
        assert!(close(clicker.money(), 3.1));
    }

    #[test]
    fn test_buy_requires_funds() {
        let mut clicker = rich_clicker(9);
        assert!(!clicker.can_afford(0));
        assert!(matches!(
            clicker.buy(0),
            Err(ClickerError::InsufficientFunds { cost, .. }) if close(cost, 10.0)
        ));
        assert_eq!(clicker.buy(7), Err(ClickerError::UnknownBuilding(7)));
        assert!(!clicker.can_afford(7));

        clicker.click();
        assert!(clicker.can_afford(0));
    }

    #[test]
    fn test_buy_updates_cost_production_and_achievements() {
        let mut clicker = rich_clicker(10);
        let purchase = clicker.buy(0).unwrap();

        assert_eq!(purchase.owned, 1);
        assert!(close(purchase.paid, 10.0));
        assert_eq!(purchase.achievement.as_deref(), Some("First Derivative Level 1"));
        assert!(close(clicker.money(), 0.1));

        let first = &clicker.buildings()[0];
        // floor(10 × 1.1)
        assert!(close(first.cost, 11.0));
        assert!(close(first.production, 0.1));
        // Second derivative pays the first one's count
        assert!(close(clicker.buildings()[1].production, 1.0));
        assert!(close(clicker.money_per_second(), 1.1));
        assert_eq!(clicker.achievements(), ["First Derivative Level 1".to_string()]);
    }

    #[test]
    fn test_cost_growth_floors() {
        let mut clicker = rich_clicker(2200);
        clicker.buy(2).unwrap();
        assert!(close(clicker.buildings()[2].cost, 1200.0));
        clicker.buy(2).unwrap();
        assert!(close(clicker.buildings()[2].cost, 1440.0));
        assert!(close(clicker.money(), 0.1));
        // Nothing below it is owned, so the third derivative pays nothing yet
        assert!(close(clicker.money_per_second(), 0.0));
        assert_eq!(
            clicker.achievements(),
            ["Third Derivative Level 1".to_string(), "Third Derivative Level 2".to_string()]
        );
    }

    #[test]
    fn test_payout_per_whole_interval() {
        let mut clicker = rich_clicker(10);
        clicker.buy(0).unwrap();
        let before = clicker.money();

        assert!(close(clicker.advance(999.0), 0.0));
        assert!(close(clicker.advance(1.0), 1.1));
        assert!(close(clicker.advance(2500.0), 2.2));
        assert!(close(clicker.money(), before + 3.3));
        assert!(close(clicker.advance(-5.0), 0.0));
        assert!(close(clicker.advance(f64::NAN), 0.0));
        // 500 ms left over from the 2500 ms frame
        assert!(close(clicker.advance(500.0), 1.1));
    }

    #[test]
    fn test_zero_interval_pays_nothing() {
        let tuning = ClickerTuning {
            payout_interval_ms: 0.0,
            ..Default::default()
        };
        let mut clicker = Clicker::new(&tuning);
        for _ in 0..10 {
            clicker.click();
        }
        clicker.buy(0).unwrap();
        assert!(close(clicker.advance(1_000.0), 0.0));
        assert!(close(clicker.money(), 0.1));
    }

    #[test]
    fn test_snapshot_serializes() {
        let clicker = rich_clicker(2);
        let snap = clicker.snapshot();
        assert!(close(snap.money, 2.1));
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("Third Derivative"));
    }
}
