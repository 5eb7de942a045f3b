use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::errors::TrackerError;
use crate::ledger::{DailyLedger, Entry};

// On-disk shape of one day's file.
#[derive(Serialize)]
struct LedgerFileOut<'a> {
    entries: &'a [Entry],
    total_calories: f64,
    date: &'a str,
}

#[derive(Deserialize)]
struct LedgerFileIn {
    entries: Vec<Entry>,
    #[serde(default)]
    total_calories: Option<f64>,
}

/// Directory of `<YY-MM-DD>.json` ledger files.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    dir: PathBuf,
}

impl LedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{}.json", date))
    }

    /// Load the ledger for `date`, or an empty one if nothing was logged yet.
    ///
    /// A file that exists but cannot be read back is an error, never an empty
    /// ledger, so a later save cannot overwrite data we failed to understand.
    #[instrument(skip(self))]
    pub fn load(&self, date: &str) -> Result<DailyLedger, TrackerError> {
        let path = self.path_for(date);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ledger yet, starting empty");
                return Ok(DailyLedger::new(date));
            }
            Err(e) => {
                return Err(TrackerError::CorruptLedgerFile {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let stored: LedgerFileIn =
            serde_json::from_str(&raw).map_err(|e| TrackerError::CorruptLedgerFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let mut ledger = DailyLedger::new(date);
        for entry in stored.entries {
            ledger.append(entry);
        }

        if let Some(stored_total) = stored.total_calories {
            if stored_total != ledger.total() {
                warn!(
                    path = %path.display(),
                    stored_total,
                    recomputed = ledger.total(),
                    "Stored calorie total disagrees with entries; using recomputed total"
                );
            }
        }

        debug!(entries = ledger.len(), total = ledger.total(), "Loaded ledger");
        Ok(ledger)
    }

    /// Write the whole ledger for its date, replacing any previous file.
    ///
    /// The JSON goes to a temporary file in the same directory which is then
    /// renamed over the target, so readers see either the old or the new file.
    #[instrument(skip(self, ledger), fields(date = ledger.date()))]
    pub fn save(&self, ledger: &DailyLedger) -> Result<PathBuf, TrackerError> {
        let path = self.path_for(ledger.date());
        let write_err = |source: io::Error| TrackerError::LedgerWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        let out = LedgerFileOut {
            entries: ledger.entries(),
            total_calories: ledger.total(),
            date: ledger.date(),
        };
        serde_json::to_writer_pretty(&mut tmp, &out).map_err(|e| write_err(e.into()))?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        info!(path = %path.display(), entries = ledger.len(), "Saved ledger");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutritionRecord;
    use tempfile::TempDir;

    fn pizza() -> Entry {
        Entry::with_timestamp(
            "2025-10-13T19:02:11.512000".to_string(),
            "pizza".to_string(),
            "2 slices".to_string(),
            NutritionRecord {
                proteins: 25.0,
                carbs: 45.0,
                fat: 18.0,
                calories: 420.0,
            },
        )
    }

    #[test]
    fn test_load_missing_date_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        let ledger = store.load("25-10-13").unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0.0);
        assert_eq!(ledger.date(), "25-10-13");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        let mut ledger = DailyLedger::new("25-10-13");
        ledger.append(pizza());
        let mut salad = pizza();
        salad.food = "salad".to_string();
        salad.amount = "1 bowl".to_string();
        salad.nutrition.calories = 180.5;
        ledger.append(salad);

        let path = store.save(&ledger).unwrap();
        assert_eq!(path, temp_dir.path().join("25-10-13.json"));

        let loaded = store.load("25-10-13").unwrap();
        assert_eq!(loaded, ledger);
        assert_eq!(loaded.total(), 600.5);
    }

    #[test]
    fn test_saved_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        let mut ledger = DailyLedger::new("25-10-13");
        ledger.append(pizza());
        let path = store.save(&ledger).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["total_calories"], 420.0);
        assert_eq!(json["date"], "25-10-13");
        assert_eq!(json["entries"][0]["food"], "pizza");
        assert_eq!(json["entries"][0]["amount"], "2 slices");
        assert_eq!(json["entries"][0]["nutrition"]["proteins"], 25.0);
        assert_eq!(json["entries"][0]["nutrition"]["calories"], 420.0);
    }

    #[test]
    fn test_save_creates_directory_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("tracker");
        let store = LedgerStore::new(&dir);

        let mut ledger = DailyLedger::new("25-10-13");
        ledger.append(pizza());
        store.save(&ledger).unwrap();
        ledger.append(pizza());
        store.save(&ledger).unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["25-10-13.json".to_string()]);
        assert_eq!(store.load("25-10-13").unwrap().total(), 840.0);
    }

    #[test]
    fn test_failed_save_leaves_no_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());

        let mut yesterday = DailyLedger::new("25-10-12");
        yesterday.append(pizza());
        store.save(&yesterday).unwrap();
        let yesterday_before = fs::read_to_string(store.path_for("25-10-12")).unwrap();

        // A directory where the file should go makes the final rename fail.
        fs::create_dir(store.path_for("25-10-13")).unwrap();
        let mut today = DailyLedger::new("25-10-13");
        today.append(pizza());

        let err = store.save(&today).unwrap_err();
        assert!(matches!(err, TrackerError::LedgerWrite { .. }));

        let mut names: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["25-10-12.json".to_string(), "25-10-13.json".to_string()]);
        assert!(!names.iter().any(|n| n.starts_with(".tmp")));

        let target = store.path_for("25-10-13");
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
        assert_eq!(fs::read_to_string(store.path_for("25-10-12")).unwrap(), yesterday_before);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        fs::write(store.path_for("25-10-13"), "{\"entries\": [ {\"food\": ").unwrap();

        let err = store.load("25-10-13").unwrap_err();
        assert!(matches!(err, TrackerError::CorruptLedgerFile { .. }));
    }

    #[test]
    fn test_missing_nutrition_field_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        let content = r#"{
            "entries": [
                { "timestamp": "2025-10-13T08:00:00", "food": "egg", "amount": "1",
                  "nutrition": { "proteins": 6, "carbs": 0.5, "calories": 70 } }
            ],
            "total_calories": 70
        }"#;
        fs::write(store.path_for("25-10-13"), content).unwrap();

        let err = store.load("25-10-13").unwrap_err();
        assert!(matches!(err, TrackerError::CorruptLedgerFile { .. }));
    }

    #[test]
    fn test_loads_files_without_amount_and_recomputes_total() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path());
        let content = r#"{
            "entries": [
                { "timestamp": "2025-10-13T08:00:00.123456", "food": "2 boiled eggs",
                  "nutrition": { "proteins": 12, "carbs": 1, "fat": 10, "calories": 140 } },
                { "timestamp": "2025-10-13T13:10:00.000001", "food": "200g ramen",
                  "nutrition": { "proteins": 10, "carbs": 80, "fat": 14, "calories": 480 } }
            ],
            "total_calories": 999,
            "date": "25-10-13"
        }"#;
        fs::write(store.path_for("25-10-13"), content).unwrap();

        let ledger = store.load("25-10-13").unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].amount, "");
        assert_eq!(ledger.total(), 620.0);
    }
}
