//! Log meals with nutrition estimates from a local LLM and keep a per-day
//! calorie ledger, archived to git.

pub mod archive;
pub mod constants;
pub mod errors;
pub mod ledger;
pub mod llm_interaction;
pub mod nutrition;
pub mod prompt;
pub mod session;
pub mod store;
pub mod summary;

pub use errors::TrackerError;
pub use ledger::{DailyLedger, Entry};
pub use nutrition::NutritionRecord;
pub use session::{LoggedEntry, TrackerSession};
pub use store::LedgerStore;
pub use summary::{CalorieStatus, Summary};
