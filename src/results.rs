use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::recorder::ClickRecord;
use chrono::Local;
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed column order for record files. Aggregate loads normalize every file
/// to this shape, filling absent columns with null.
pub const COLUMNS: [&str; 10] = [
    "click_datetime",
    "reaction_time",
    "precision_factor",
    "round_start_time_iso",
    "game_version",
    "target_radius",
    "misses_since_last_hit",
    "round_number",
    "click_in_round_number",
    "clicked_quadrant",
];

/// A row of the aggregate table. Every field is optional because older
/// record files may predate a column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedRecord {
    pub click_datetime: Option<String>,
    pub reaction_time: Option<f64>,
    pub precision_factor: Option<f64>,
    pub round_start_time_iso: Option<String>,
    pub game_version: Option<String>,
    pub target_radius: Option<f64>,
    pub misses_since_last_hit: Option<u32>,
    pub round_number: Option<u32>,
    pub click_in_round_number: Option<u32>,
    pub clicked_quadrant: Option<String>,
}

impl From<&ClickRecord> for LoadedRecord {
    fn from(r: &ClickRecord) -> Self {
        Self {
            click_datetime: Some(r.click_datetime.clone()),
            reaction_time: Some(r.reaction_time),
            precision_factor: Some(r.precision_factor),
            round_start_time_iso: r.round_start_time_iso.clone(),
            game_version: Some(r.game_version.clone()),
            target_radius: Some(r.target_radius),
            misses_since_last_hit: Some(r.misses_since_last_hit),
            round_number: Some(r.round_number),
            click_in_round_number: Some(r.click_in_round_number),
            clicked_quadrant: Some(r.clicked_quadrant.clone()),
        }
    }
}

/// All historical click records, concatenated across record files in the
/// fixed column order.
#[derive(Clone, Debug, Default)]
pub struct ResultsTable {
    rows: Vec<LoadedRecord>,
}

impl ResultsTable {
    pub fn rows(&self) -> &[LoadedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Persists completed rounds as CSV record files and reloads them all into
/// one in-memory table on demand.
#[derive(Clone, Debug)]
pub struct ResultsStore {
    results_dir: PathBuf,
}

impl ResultsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let results_dir = AppDirs::results_dir().unwrap_or_else(|| PathBuf::from("results"));
        Self { results_dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            results_dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Writes one record file for a completed round and returns its path.
    ///
    /// File names carry second-resolution timestamps; two saves within the
    /// same second overwrite each other. Known limitation, not guarded
    /// against (normal play never completes two rounds in one second).
    pub fn save_round(&self, records: &[ClickRecord]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.results_dir)?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let filepath = self.results_dir.join(format!("results_{timestamp}.csv"));

        let mut writer = csv::Writer::from_path(&filepath)?;
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.write_record([
                record.click_datetime.clone(),
                record.reaction_time.to_string(),
                record.precision_factor.to_string(),
                record.round_start_time_iso.clone().unwrap_or_default(),
                record.game_version.clone(),
                record.target_radius.to_string(),
                record.misses_since_last_hit.to_string(),
                record.round_number.to_string(),
                record.click_in_round_number.to_string(),
                record.clicked_quadrant.clone(),
            ])?;
        }
        writer.flush()?;

        Ok(filepath)
    }

    /// Loads every record file into one table, in sorted filename order.
    ///
    /// Missing directory yields an empty table. Unreadable or corrupt files
    /// are logged and skipped; the aggregate never aborts on a bad file.
    /// Rows are normalized to [`COLUMNS`] with absent columns set to `None`.
    pub fn load_all(&self) -> Result<ResultsTable, StoreError> {
        if !self.results_dir.exists() {
            log::debug!(
                "results directory {:?} not found, returning empty table",
                self.results_dir
            );
            return Ok(ResultsTable::default());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.results_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .sorted()
            .collect();

        let mut rows = Vec::new();
        for path in paths.drain(..) {
            match Self::load_file(&path) {
                Ok(mut file_rows) => rows.append(&mut file_rows),
                Err(err) => {
                    log::warn!("skipping unreadable record file {path:?}: {err}");
                }
            }
        }

        log::debug!("loaded {} historical click records", rows.len());
        Ok(ResultsTable { rows })
    }

    fn load_file(path: &Path) -> Result<Vec<LoadedRecord>, StoreError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();

        let column_index = |name: &str| headers.iter().position(|h| h == name);
        let indexes: Vec<Option<usize>> = COLUMNS.iter().map(|c| column_index(c)).collect();

        let field = |row: &csv::StringRecord, col: usize| -> Option<String> {
            indexes[col]
                .and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            rows.push(LoadedRecord {
                click_datetime: field(&row, 0),
                reaction_time: field(&row, 1).and_then(|v| v.parse().ok()),
                precision_factor: field(&row, 2).and_then(|v| v.parse().ok()),
                round_start_time_iso: field(&row, 3),
                game_version: field(&row, 4),
                target_radius: field(&row, 5).and_then(|v| v.parse().ok()),
                misses_since_last_hit: field(&row, 6).and_then(|v| v.parse().ok()),
                round_number: field(&row, 7).and_then(|v| v.parse().ok()),
                click_in_round_number: field(&row, 8).and_then(|v| v.parse().ok()),
                clicked_quadrant: field(&row, 9),
            });
        }

        Ok(rows)
    }
}
