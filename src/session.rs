use std::path::PathBuf;

use chrono::Local;
use tracing::{info, instrument, warn};

use crate::archive::{commit_message, Archiver};
use crate::constants::LEDGER_DATE_FORMAT;
use crate::errors::TrackerError;
use crate::ledger::{DailyLedger, Entry};
use crate::llm_interaction::NutritionEstimator;
use crate::nutrition::parse_nutrition_response;
use crate::store::LedgerStore;
use crate::summary::Summary;

/// Today's ledger key in local time, e.g. `25-10-13`.
pub fn today() -> String {
    Local::now().format(LEDGER_DATE_FORMAT).to_string()
}

/// Result of logging one meal.
#[derive(Debug)]
pub struct LoggedEntry {
    pub entry: Entry,
    pub summary: Summary,
    /// File the ledger was saved to.
    pub path: PathBuf,
    /// Archival is best-effort; the entry is saved either way.
    pub archive: Result<(), TrackerError>,
}

/// One run of the tracker against a single day's ledger.
///
/// The date is fixed when the session is opened, so a session started just
/// before midnight keeps writing to the day it started on.
pub struct TrackerSession<E, A> {
    store: LedgerStore,
    estimator: E,
    archiver: A,
    limit: f64,
    ledger: DailyLedger,
    sync_error: Option<TrackerError>,
}

impl<E, A> TrackerSession<E, A>
where
    E: NutritionEstimator,
    A: Archiver,
{
    /// Load the ledger for `date` without touching the remote.
    pub fn open(
        store: LedgerStore,
        estimator: E,
        archiver: A,
        limit: f64,
        date: &str,
    ) -> Result<Self, TrackerError> {
        let ledger = store.load(date)?;
        info!(date, entries = ledger.len(), total = ledger.total(), "Opened ledger");
        Ok(Self {
            store,
            estimator,
            archiver,
            limit,
            ledger,
            sync_error: None,
        })
    }

    /// Pull from the remote, then load the ledger for `date`.
    ///
    /// A failed pull is kept (see [`Self::sync_error`]) and the session carries on
    /// with local data. A corrupt ledger file is still fatal.
    pub async fn start(
        store: LedgerStore,
        estimator: E,
        archiver: A,
        limit: f64,
        date: &str,
    ) -> Result<Self, TrackerError> {
        let sync_error = match archiver.sync().await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Could not pull latest ledger files, continuing with local data");
                Some(e)
            }
        };

        let mut session = Self::open(store, estimator, archiver, limit, date)?;
        session.sync_error = sync_error;
        Ok(session)
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    pub fn sync_error(&self) -> Option<&TrackerError> {
        self.sync_error.as_ref()
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(self.ledger.total(), self.limit)
    }

    /// Estimate, record, save and archive one meal.
    ///
    /// Nothing is written unless the estimate was obtained and parsed. Once the
    /// ledger is saved, an archival failure is reported in the result rather
    /// than returned as an error.
    #[instrument(skip(self), fields(date = self.ledger.date()))]
    pub async fn log_entry(&mut self, food: &str, amount: &str) -> Result<LoggedEntry, TrackerError> {
        let food = food.trim();
        let amount = amount.trim();
        if food.is_empty() {
            return Err(TrackerError::EmptyInput { field: "food" });
        }

        let reply = self.estimator.estimate(food, amount).await?;
        let description = format!("{} {}", amount, food).trim().to_string();
        let nutrition = parse_nutrition_response(&reply, &description)?;
        let entry = Entry::new(food.to_string(), amount.to_string(), nutrition);

        // Save a staged copy so a failed write leaves memory matching disk.
        let mut staged = self.ledger.clone();
        staged.append(entry.clone());
        let path = self.store.save(&staged)?;
        self.ledger = staged;
        info!(calories = nutrition.calories, total = self.ledger.total(), "Logged entry");

        let summary = self.summary();

        // Named after the session's day even if the clock has passed midnight.
        let message = commit_message(self.ledger.date());
        let archive = self.archiver.archive(&path, &message).await;
        if let Err(e) = &archive {
            warn!(error = %e, "Archival failed; the ledger is saved locally");
        }

        Ok(LoggedEntry {
            entry,
            summary,
            path,
            archive,
        })
    }
}
