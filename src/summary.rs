use std::fmt;

use crate::ledger::DailyLedger;

/// How the day's intake compares to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalorieStatus {
    OnTrack,
    /// Within 20% of the limit, not yet over it.
    Caution,
    OverLimit,
}

impl CalorieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalorieStatus::OnTrack => "on track",
            CalorieStatus::Caution => "caution",
            CalorieStatus::OverLimit => "over limit",
        }
    }
}

impl fmt::Display for CalorieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumed/remaining calories for a day against its limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub limit: f64,
    pub consumed: f64,
    /// `limit - consumed`; negative once over the limit.
    pub remaining: f64,
    pub status: CalorieStatus,
}

impl Summary {
    pub fn compute(consumed: f64, limit: f64) -> Self {
        let remaining = limit - consumed;
        let status = if consumed > limit {
            CalorieStatus::OverLimit
        } else if remaining <= limit * 0.2 {
            CalorieStatus::Caution
        } else {
            CalorieStatus::OnTrack
        };

        Self {
            limit,
            consumed,
            remaining,
            status,
        }
    }

    fn message(&self) -> String {
        match self.status {
            CalorieStatus::OverLimit => format!(
                "⚠️  You've exceeded your daily limit by {:.1} calories!",
                -self.remaining
            ),
            CalorieStatus::Caution => "⚡ You're almost at your daily limit!".to_string(),
            CalorieStatus::OnTrack => "✅ You're doing great! Keep it up!".to_string(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(40);
        writeln!(f, "{}", rule)?;
        writeln!(f, "📈 Daily Calorie Summary")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "🎯 Daily Limit: {:.0} calories", self.limit)?;
        writeln!(f, "🔥 Consumed: {:.1} calories", self.consumed)?;
        writeln!(f, "💚 Remaining: {:.1} calories", self.remaining)?;
        write!(f, "{}", self.message())
    }
}

/// Numbered list of the day's entries, or a note that there are none.
pub fn format_entries(ledger: &DailyLedger) -> String {
    let rule = "-".repeat(40);
    if ledger.is_empty() {
        return format!("📋 No entries found for today ({})\n{}", ledger.date(), rule);
    }

    let mut out = format!("📋 Existing entries for today ({}):\n{}\n", ledger.date(), rule);
    for (i, entry) in ledger.entries().iter().enumerate() {
        let n = &entry.nutrition;
        out.push_str(&format!(
            "{}. [{}] {}\n   🥩 {:.1}g protein, 🍞 {:.1}g carbs, 🥑 {:.1}g fat, 🔥 {:.1} cal\n",
            i + 1,
            entry.time_of_day(),
            entry.description(),
            n.proteins,
            n.carbs,
            n.fat,
            n.calories,
        ));
    }
    out.push_str(&rule);
    out
}
