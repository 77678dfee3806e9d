use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::color::PitchPalette;
use crate::config::AppConfig;
use crate::data::export::export_csv;
use crate::data::filter::{pitcher_suggestions, FilterSpec, MonthFilter, RunnerFilter, SideFilter};
use crate::data::loader::{load_file, DatasetCache, Source};
use crate::data::model::{PitchDataset, PitchRecord};
use crate::data::pipeline::{self, Outcome, RunTrigger};

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------

/// Widget values in the side panel. Nothing here filters until Run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterForm {
    pub year: Option<i32>,
    pub month: MonthFilter,
    pub use_date_range: bool,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub pitcher_query: String,
    pub pitcher: Option<String>,
    pub batter_side: SideFilter,
    pub pitch_types: BTreeSet<String>,
    pub runners: RunnerFilter,
}

impl Default for FilterForm {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: None,
            month: MonthFilter::All,
            use_date_range: false,
            range_start: today,
            range_end: today,
            pitcher_query: String::new(),
            pitcher: None,
            batter_side: SideFilter::All,
            pitch_types: BTreeSet::new(),
            runners: RunnerFilter::All,
        }
    }
}

impl FilterForm {
    /// Fresh form for a newly loaded dataset: first year selected, date range
    /// spanning the data.
    pub fn for_dataset(dataset: &PitchDataset) -> Self {
        let mut form = Self {
            year: dataset.years.first().copied(),
            ..Self::default()
        };
        if let Some((first, last)) = dataset.date_span() {
            form.range_start = first;
            form.range_end = last;
        }
        form
    }

    /// Translate the widget values into a filter specification.
    ///
    /// A chosen pitcher only applies while the search still offers it.
    pub fn to_spec(&self, dataset: &PitchDataset) -> FilterSpec {
        let offered = pitcher_suggestions(dataset, &self.pitcher_query);
        let pitcher = self
            .pitcher
            .as_deref()
            .filter(|name| offered.contains(name))
            .map(str::to_string);

        FilterSpec {
            date_range: self
                .use_date_range
                .then_some((self.range_start, self.range_end)),
            year: self.year,
            month: self.month,
            pitcher,
            batter_side: self.batter_side,
            pitch_types: self.pitch_types.clone(),
            runners: self.runners,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Session cache so Run never re-fetches.
    cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<PitchDataset>>,

    /// Colours for the loaded pitch types.
    pub palette: Option<PitchPalette>,

    pub form: FilterForm,

    /// Result of the last Run.
    pub outcome: Outcome,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::default(),
            dataset: None,
            palette: None,
            form: FilterForm::default(),
            outcome: Outcome::NotRun,
            status_message: None,
        }
    }

    /// Load the configured sources, from cache when already fetched.
    pub fn load_configured_sources(&mut self) {
        let sources = self.config.sources();
        match self.cache.get_or_load(&sources, self.config.http_timeout()) {
            Ok(dataset) => {
                log::info!(
                    "Dataset ready: {} pitches from {} source(s)",
                    dataset.len(),
                    sources.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Drop the cached dataset and fetch the configured sources again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.load_configured_sources();
    }

    /// Replace the session dataset with a local file.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let dataset = Arc::new(
            load_file(path).with_context(|| format!("loading {}", path.display()))?,
        );
        self.cache
            .insert(vec![Source::Path(path.to_path_buf())], Arc::clone(&dataset));
        log::info!("Opened {} ({} pitches)", path.display(), dataset.len());
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a newly loaded dataset, reset filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<PitchDataset>) {
        self.form = FilterForm::for_dataset(&dataset);
        self.palette = Some(PitchPalette::new(&dataset.pitch_types));
        self.outcome = Outcome::NotRun;
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Apply the current form. Called only from the Run button.
    pub fn run(&mut self) {
        if let Some(ds) = &self.dataset {
            let spec = self.form.to_spec(ds);
            log::debug!("Running with {spec:?}");
            self.outcome = pipeline::run(ds, &spec, RunTrigger::Requested);
        }
    }

    /// Records kept by the last Run.
    pub fn filtered_records(&self) -> Vec<&PitchRecord> {
        match (&self.dataset, &self.outcome) {
            (Some(ds), Outcome::Ready(analysis)) => ds.select(&analysis.indices),
            _ => Vec::new(),
        }
    }

    /// Whether Run has produced something worth exporting (possibly empty).
    pub fn can_export(&self) -> bool {
        self.dataset.is_some() && self.outcome != Outcome::NotRun
    }

    /// Indices kept by the last Run.
    fn filtered_indices(&self) -> &[usize] {
        match &self.outcome {
            Outcome::Ready(analysis) => &analysis.indices,
            _ => &[],
        }
    }

    /// What the central panel says instead of charts, if anything.
    pub fn prompt(&self) -> Option<&'static str> {
        match (&self.dataset, &self.outcome) {
            (None, _) => Some("No data loaded. Use File → Open… or Reload sources."),
            (Some(ds), _) if ds.is_empty() => Some("The loaded data contains no pitches."),
            (_, Outcome::NotRun) => Some("Set filters and press Run."),
            (_, Outcome::NoMatches) => Some("No pitches match these filters. Adjust them and press Run."),
            (_, Outcome::Ready(_)) => None,
        }
    }

    /// Write the source rows kept by the last Run to `path` as CSV.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let dataset = self.dataset.as_ref().context("no data loaded")?;
        let rows = export_csv(path, &dataset.source, self.filtered_indices())
            .with_context(|| format!("exporting to {}", path.display()))?;
        log::info!("Exported {rows} pitches to {}", path.display());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> PitchDataset {
        PitchDataset::from_records(vec![
            PitchRecord::new(day(2023, 8, 1), "Kim", Some("직구")),
            PitchRecord::new(day(2024, 4, 2), "Park", Some("커브")),
            PitchRecord::new(day(2024, 4, 3), "Kim", Some("직구")),
        ])
    }

    fn state_with(ds: PitchDataset) -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.set_dataset(Arc::new(ds));
        state
    }

    #[test]
    fn new_dataset_selects_first_year_and_full_span() {
        let form = FilterForm::for_dataset(&dataset());
        assert_eq!(form.year, Some(2023));
        assert_eq!((form.range_start, form.range_end), (day(2023, 8, 1), day(2024, 4, 3)));
        assert!(!form.use_date_range);
    }

    #[test]
    fn pitcher_outside_current_search_is_ignored() {
        let ds = dataset();
        let mut form = FilterForm::for_dataset(&ds);
        form.pitcher = Some("Kim".into());
        assert_eq!(form.to_spec(&ds).pitcher.as_deref(), Some("Kim"));

        form.pitcher_query = "zzz".into();
        assert_eq!(form.to_spec(&ds).pitcher, None);
    }

    #[test]
    fn nothing_filters_until_run() {
        let mut state = state_with(dataset());
        assert_eq!(state.outcome, Outcome::NotRun);
        assert!(!state.can_export());

        state.form.year = Some(2024);
        state.run();
        assert_eq!(state.filtered_records().len(), 2);
        assert!(state.can_export());
    }

    #[test]
    fn run_with_no_matches_prompts_instead_of_failing() {
        let mut state = state_with(dataset());
        state.form.year = Some(2024);
        state.form.use_date_range = true;
        state.form.range_start = day(2023, 1, 1);
        state.form.range_end = day(2023, 12, 31);
        state.run();
        assert_eq!(state.outcome, Outcome::NoMatches);
        assert!(state.filtered_records().is_empty());
    }

    #[test]
    fn export_writes_the_filtered_rows() {
        let mut state = state_with(dataset());
        state.form.year = Some(2024);
        state.form.pitch_types.insert("커브".into());
        state.run();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.csv");
        assert_eq!(state.export_to(&path).unwrap(), 1);
    }

    #[test]
    fn prompt_tracks_dataset_and_run_state() {
        let mut empty = state_with(PitchDataset::default());
        assert_eq!(empty.prompt(), Some("The loaded data contains no pitches."));
        empty.run();
        assert_eq!(empty.prompt(), Some("The loaded data contains no pitches."));

        let mut state = state_with(dataset());
        assert_eq!(state.prompt(), Some("Set filters and press Run."));
        state.run();
        assert_eq!(state.prompt(), None);
    }

    #[test]
    fn opening_a_bad_file_keeps_the_current_dataset() {
        let mut state = state_with(dataset());
        assert!(state.open_path(Path::new("/nonexistent/pitches.csv")).is_err());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(3));
    }
}
