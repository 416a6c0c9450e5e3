use crate::errors::StoreError;
use crate::models::{MacroEntry, MacroInput};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::fs;
use tracing::{debug, info};

pub const LOG_HEADER: [&str; 4] = ["Date", "Protein", "Carbs", "Fat"];

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Durable home of the macro log. Every save replaces the whole dataset.
pub trait MacroStore: Send + Sync {
    fn load(&self) -> StoreFuture<'_, Vec<MacroEntry>>;
    fn save<'a>(&'a self, entries: &'a [MacroEntry]) -> StoreFuture<'a, ()>;
}

/// Flat CSV file with a `Date,Protein,Carbs,Fat` header.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    async fn read_log(&self) -> Result<Vec<MacroEntry>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.write_log(&[]).await?;
                info!(path = %self.path.display(), "created empty macro log");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let entries = decode_log(&bytes)?;
        debug!(rows = entries.len(), "loaded macro log");
        Ok(entries)
    }

    async fn write_log(&self, entries: &[MacroEntry]) -> Result<(), StoreError> {
        let payload = encode_log(entries)?;
        let staging = self.staging_path();
        fs::write(&staging, payload).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

impl MacroStore for CsvFileStore {
    fn load(&self) -> StoreFuture<'_, Vec<MacroEntry>> {
        Box::pin(self.read_log())
    }

    fn save<'a>(&'a self, entries: &'a [MacroEntry]) -> StoreFuture<'a, ()> {
        Box::pin(self.write_log(entries))
    }
}

fn decode_log(bytes: &[u8]) -> Result<Vec<MacroEntry>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(LOG_HEADER) {
        return Err(StoreError::MalformedHeader {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    reader
        .deserialize::<LogRecord>()
        .map(|record| record.map(MacroEntry::from).map_err(StoreError::from))
        .collect()
}

fn encode_log(entries: &[MacroEntry]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(LOG_HEADER)?;
    for entry in entries {
        writer.serialize(LogRecord::from(*entry))?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

/// In-process store; clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<MacroEntry>>>,
}

impl MemoryStore {
    pub fn with_entries(entries: Vec<MacroEntry>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn snapshot(&self) -> Vec<MacroEntry> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, entries: &[MacroEntry]) {
        // A panicked writer cannot leave the Vec half-assigned, so the rows stay usable.
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        *rows = entries.to_vec();
    }
}

impl MacroStore for MemoryStore {
    fn load(&self) -> StoreFuture<'_, Vec<MacroEntry>> {
        let rows = self.snapshot();
        Box::pin(async move { Ok(rows) })
    }

    fn save<'a>(&'a self, entries: &'a [MacroEntry]) -> StoreFuture<'a, ()> {
        self.replace(entries);
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LogRecord {
    #[serde(rename = "Date", deserialize_with = "deserialize_log_date")]
    date: NaiveDate,
    #[serde(rename = "Protein")]
    protein: u32,
    #[serde(rename = "Carbs")]
    carbs: u32,
    #[serde(rename = "Fat")]
    fat: u32,
}

impl From<LogRecord> for MacroEntry {
    fn from(record: LogRecord) -> Self {
        Self {
            date: record.date,
            protein: record.protein,
            carbs: record.carbs,
            fat: record.fat,
        }
    }
}

impl From<MacroEntry> for LogRecord {
    fn from(entry: MacroEntry) -> Self {
        Self {
            date: entry.date,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
        }
    }
}

fn deserialize_log_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_log_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date {raw:?}")))
}

/// Accepts `YYYY-MM-DD`, or a midnight-style timestamp that some tools write.
pub fn parse_log_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|stamp| stamp.date())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodaySlot {
    pub index: usize,
    pub created: bool,
}

/// Finds today's row, appending a zeroed one at the end when it is missing.
pub fn ensure_today(entries: &mut Vec<MacroEntry>, today: NaiveDate) -> TodaySlot {
    if let Some(index) = entries.iter().position(|entry| entry.date == today) {
        return TodaySlot {
            index,
            created: false,
        };
    }

    entries.push(MacroEntry::empty(today));
    TodaySlot {
        index: entries.len() - 1,
        created: true,
    }
}

/// Overwrites all three values of the row at `index`, then rewrites the log.
pub async fn update_today(
    store: &dyn MacroStore,
    entries: &mut [MacroEntry],
    index: usize,
    input: MacroInput,
) -> Result<MacroEntry, StoreError> {
    let updated = {
        let entry = &mut entries[index];
        entry.protein = input.protein;
        entry.carbs = input.carbs;
        entry.fat = input.fat;
        *entry
    };

    store.save(entries).await?;
    Ok(updated)
}

/// The loaded dataset pinned to the date the process started on.
pub struct MacroLog {
    store: Box<dyn MacroStore>,
    entries: Vec<MacroEntry>,
    today: NaiveDate,
    today_index: usize,
}

impl MacroLog {
    pub async fn open(store: Box<dyn MacroStore>, today: NaiveDate) -> Result<Self, StoreError> {
        let mut entries = store.load().await?;
        let slot = ensure_today(&mut entries, today);
        if slot.created {
            store.save(&entries).await?;
            info!(%today, "added today's row to the macro log");
        }

        Ok(Self {
            store,
            entries,
            today,
            today_index: slot.index,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_entry(&self) -> MacroEntry {
        self.entries[self.today_index]
    }

    pub fn entries(&self) -> &[MacroEntry] {
        &self.entries
    }

    pub async fn update_today(&mut self, input: MacroInput) -> Result<MacroEntry, StoreError> {
        let updated = update_today(
            self.store.as_ref(),
            &mut self.entries,
            self.today_index,
            input,
        )
        .await?;
        debug!(
            date = %updated.date,
            protein = updated.protein,
            carbs = updated.carbs,
            fat = updated.fat,
            "updated today's macros"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn input(protein: u32, carbs: u32, fat: u32) -> MacroInput {
        MacroInput {
            protein,
            carbs,
            fat,
        }
    }

    #[tokio::test]
    async fn load_missing_file_creates_header_only_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");
        let store = CsvFileStore::new(&path);

        let entries = store.load().await.unwrap();

        assert!(entries.is_empty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim_end(), "Date,Protein,Carbs,Fat");
    }

    #[tokio::test]
    async fn load_reads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");
        std::fs::write(
            &path,
            "Date,Protein,Carbs,Fat\n2026-03-05,150,200,70\n2026-03-02 00:00:00,90,120,40\n",
        )
        .unwrap();

        let entries = CsvFileStore::new(&path).load().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, day(5));
        assert_eq!(entries[0].protein, 150);
        assert_eq!(entries[1].date, day(2));
        assert_eq!(entries[1].fat, 40);
    }

    #[tokio::test]
    async fn load_rejects_malformed_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");
        std::fs::write(&path, "Day,Protein,Carbs\n2026-03-05,1,2\n").unwrap();

        let err = CsvFileStore::new(&path).load().await.unwrap_err();

        assert!(matches!(err, StoreError::MalformedHeader { .. }));
    }

    #[tokio::test]
    async fn load_rejects_unparseable_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");
        std::fs::write(&path, "Date,Protein,Carbs,Fat\nyesterday,1,2,3\n").unwrap();

        let err = CsvFileStore::new(&path).load().await.unwrap_err();

        assert!(matches!(err, StoreError::Csv(_)));
    }

    #[tokio::test]
    async fn load_surfaces_unreadable_log() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists at the path, so reading fails with something other than NotFound.
        let err = CsvFileStore::new(dir.path()).load().await.unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn save_replaces_file_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");
        let store = CsvFileStore::new(&path);

        store.save(&[MacroEntry::empty(day(1))]).await.unwrap();
        store
            .save(&[MacroEntry {
                date: day(2),
                protein: 10,
                carbs: 20,
                fat: 30,
            }])
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Date,Protein,Carbs,Fat\n2026-03-02,10,20,30\n");
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn encoded_log_matches_header_and_row_order() {
        let bytes = encode_log(&[MacroEntry::empty(day(3)), MacroEntry::empty(day(1))]).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Date,Protein,Carbs,Fat\n2026-03-03,0,0,0\n2026-03-01,0,0,0\n"
        );
    }

    #[test]
    fn memory_store_recovers_from_poisoned_lock() {
        let store = MemoryStore::with_entries(vec![MacroEntry::empty(day(1))]);
        let rows = Arc::clone(&store.rows);
        let _ = std::thread::spawn(move || {
            let _held = rows.lock().unwrap();
            panic!("writer died while holding the rows");
        })
        .join();
        assert!(store.rows.is_poisoned());

        let fresh = [MacroEntry::empty(day(2))];
        store.replace(&fresh);

        assert_eq!(store.snapshot(), fresh.to_vec());
    }

    #[tokio::test]
    async fn memory_store_save_lands_after_poisoning() {
        let store = MemoryStore::default();
        let rows = Arc::clone(&store.rows);
        let _ = std::thread::spawn(move || {
            let _held = rows.lock().unwrap();
            panic!("writer died while holding the rows");
        })
        .join();

        let mut log = MacroLog::open(Box::new(store.clone()), day(5)).await.unwrap();
        log.update_today(input(120, 130, 40)).await.unwrap();

        assert_eq!(
            store.snapshot(),
            vec![MacroEntry {
                date: day(5),
                protein: 120,
                carbs: 130,
                fat: 40,
            }]
        );
    }

    #[test]
    fn ensure_today_is_idempotent() {
        let mut entries = vec![MacroEntry::empty(day(1))];

        let first = ensure_today(&mut entries, day(3));
        let second = ensure_today(&mut entries, day(3));

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.index, second.index);
        assert_eq!(entries.iter().filter(|e| e.date == day(3)).count(), 1);
        assert_eq!(entries.last().unwrap(), &MacroEntry::empty(day(3)));
    }

    #[test]
    fn ensure_today_keeps_existing_row_position() {
        let mut entries = vec![MacroEntry::empty(day(3)), MacroEntry::empty(day(1))];

        let slot = ensure_today(&mut entries, day(3));

        assert_eq!(slot.index, 0);
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn open_persists_new_day_once() {
        let store = MemoryStore::default();

        let log = MacroLog::open(Box::new(store.clone()), day(4)).await.unwrap();
        drop(log);
        let log = MacroLog::open(Box::new(store.clone()), day(4)).await.unwrap();

        assert_eq!(store.snapshot(), vec![MacroEntry::empty(day(4))]);
        assert_eq!(log.today_entry(), MacroEntry::empty(day(4)));
    }

    #[tokio::test]
    async fn last_update_wins_in_persisted_log() {
        let store = MemoryStore::with_entries(vec![MacroEntry::empty(day(1))]);
        let mut log = MacroLog::open(Box::new(store.clone()), day(2)).await.unwrap();

        log.update_today(input(10, 20, 30)).await.unwrap();
        log.update_today(input(11, 0, 31)).await.unwrap();
        log.update_today(input(150, 200, 70)).await.unwrap();

        let rows = store.snapshot();
        let today_rows: Vec<_> = rows.iter().filter(|e| e.date == day(2)).collect();
        assert_eq!(today_rows.len(), 1);
        assert_eq!(
            *today_rows[0],
            MacroEntry {
                date: day(2),
                protein: 150,
                carbs: 200,
                fat: 70,
            }
        );
        assert_eq!(rows[0], MacroEntry::empty(day(1)));
    }

    #[tokio::test]
    async fn file_log_survives_reopen_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro_log.csv");

        let mut log = MacroLog::open(Box::new(CsvFileStore::new(&path)), day(9))
            .await
            .unwrap();
        assert_eq!(log.entries(), &[MacroEntry::empty(day(9))]);
        log.update_today(input(150, 200, 70)).await.unwrap();

        let reopened = MacroLog::open(Box::new(CsvFileStore::new(&path)), day(9))
            .await
            .unwrap();

        assert_eq!(
            reopened.entries(),
            &[MacroEntry {
                date: day(9),
                protein: 150,
                carbs: 200,
                fat: 70,
            }]
        );
    }
}
