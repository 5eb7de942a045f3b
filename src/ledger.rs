use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::nutrition::NutritionRecord;

/// One logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// ISO-8601 local time at which the entry was created.
    pub timestamp: String,
    pub food: String,
    // Older files folded the amount into `food`.
    #[serde(default)]
    pub amount: String,
    pub nutrition: NutritionRecord,
}

impl Entry {
    /// Create an entry stamped with the current local time.
    pub fn new(food: String, amount: String, nutrition: NutritionRecord) -> Self {
        let timestamp = Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        Self::with_timestamp(timestamp, food, amount, nutrition)
    }

    pub fn with_timestamp(
        timestamp: String,
        food: String,
        amount: String,
        nutrition: NutritionRecord,
    ) -> Self {
        Self {
            timestamp,
            food,
            amount,
            nutrition,
        }
    }

    /// `HH:MM` part of the timestamp, or the whole timestamp if it has no time part.
    pub fn time_of_day(&self) -> &str {
        match self.timestamp.split_once('T') {
            Some((_, time)) => time.get(..5).unwrap_or(time),
            None => &self.timestamp,
        }
    }

    /// Food and amount as one phrase, e.g. `2 slices pizza`.
    pub fn description(&self) -> String {
        if self.amount.is_empty() {
            self.food.clone()
        } else {
            format!("{} {}", self.amount, self.food)
        }
    }
}

/// The entries logged on one calendar date, with their calorie total.
///
/// Append-only: entries are never removed, reordered or edited, and
/// `total_calories` is always the sum over `entries`.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLedger {
    date: String,
    entries: Vec<Entry>,
    total_calories: f64,
}

impl DailyLedger {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            entries: Vec::new(),
            total_calories: 0.0,
        }
    }

    pub fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
        self.recompute_total();
    }

    pub fn total(&self) -> f64 {
        self.total_calories
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A day holds a few dozen entries at most, so summing from scratch is fine.
    fn recompute_total(&mut self) {
        self.total_calories = self.entries.iter().map(|e| e.nutrition.calories).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(calories: f64) -> Entry {
        Entry::with_timestamp(
            "2025-10-13T12:30:00.000000".to_string(),
            "toast".to_string(),
            "1 slice".to_string(),
            NutritionRecord {
                proteins: 3.0,
                carbs: 14.0,
                fat: 1.0,
                calories,
            },
        )
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = DailyLedger::new("25-10-13");
        assert_eq!(ledger.date(), "25-10-13");
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0.0);
    }

    #[test]
    fn test_total_matches_sum_after_every_append() {
        for n in 0..=50 {
            let mut ledger = DailyLedger::new("25-10-13");
            for i in 0..n {
                // Uneven values so float accumulation order actually matters.
                ledger.append(entry(i as f64 * 37.3 + 0.1));
                let fresh: f64 = ledger.entries().iter().map(|e| e.nutrition.calories).sum();
                assert_eq!(ledger.total(), fresh);
            }
            assert_eq!(ledger.len(), n);
        }
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut ledger = DailyLedger::new("25-10-13");
        ledger.append(entry(100.0));
        ledger.append(entry(250.0));
        ledger.append(entry(50.0));

        let calories: Vec<f64> = ledger.entries().iter().map(|e| e.nutrition.calories).collect();
        assert_eq!(calories, vec![100.0, 250.0, 50.0]);
        assert_eq!(ledger.total(), 400.0);
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(entry(1.0).time_of_day(), "12:30");

        let mut odd = entry(1.0);
        odd.timestamp = "yesterday".to_string();
        assert_eq!(odd.time_of_day(), "yesterday");
    }

    #[test]
    fn test_description_joins_amount_and_food() {
        assert_eq!(entry(1.0).description(), "1 slice toast");

        let mut legacy = entry(1.0);
        legacy.amount.clear();
        assert_eq!(legacy.description(), "toast");
    }

    #[test]
    fn test_new_entry_timestamp_is_iso8601() {
        let e = Entry::new("tea".to_string(), "1 cup".to_string(), entry(2.0).nutrition);
        assert!(chrono::NaiveDateTime::parse_from_str(&e.timestamp, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
