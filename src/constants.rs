// Runtime defaults, overridable from the environment (or a .env file).

use std::env;

/// Daily calorie budget when neither `--limit` nor the environment sets one.
pub const DEFAULT_DAILY_LIMIT: f64 = 3000.0;

/// Filename-stem format of a ledger date, e.g. `25-10-13`.
pub const LEDGER_DATE_FORMAT: &str = "%y-%m-%d";

lazy_static::lazy_static! {
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
    pub static ref NUTRITION_MODEL: String = env::var("CALORIE_TRACKER_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string());
    pub static ref TRACKER_DIR: String = env::var("CALORIE_TRACKER_DIR").unwrap_or_else(|_| "tracker".to_string());
    pub static ref GIT_REMOTE: String = env::var("CALORIE_TRACKER_GIT_REMOTE").unwrap_or_else(|_| "origin".to_string());
    pub static ref GIT_BRANCH: String = env::var("CALORIE_TRACKER_GIT_BRANCH").unwrap_or_else(|_| "main".to_string());
    // Local models can be slow on first load, so the LLM gets a generous budget.
    pub static ref LLM_TIMEOUT_SECS: u64 = parse_secs("CALORIE_TRACKER_LLM_TIMEOUT_SECS", 120);
    pub static ref GIT_TIMEOUT_SECS: u64 = parse_secs("CALORIE_TRACKER_GIT_TIMEOUT_SECS", 60);
}

fn parse_secs(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
