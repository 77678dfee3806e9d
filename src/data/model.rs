use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// Labels used by the tracking exports
// ---------------------------------------------------------------------------

/// Canonical pitch-type order. Summary rows and chart legends follow it.
///
/// Four-seam, two-seam, cutter, slider, sweeper, changeup, splitter,
/// curveball, knuckleball.
pub const PITCH_TYPE_ORDER: [&str; 9] = [
    "직구", "투심", "커터", "슬라", "스위퍼", "체인", "포크", "커브", "너클",
];

/// Umpire call recorded for a ball.
pub const BALL_CALL: &str = "B";

/// Runner-state label for "no runners on base".
pub const BASES_EMPTY: &str = "주자무";

pub const RIGHT_HANDED: &str = "우타";
pub const LEFT_HANDED: &str = "좌타";

/// Source column names for the fields of a [`PitchRecord`], in field order.
pub const RECORD_COLUMNS: [&str; 18] = [
    "Date",
    "투수",
    "구종",
    "타자유형",
    "주자",
    "심판콜",
    "RelSpeed",
    "SpinRate",
    "회전효율",
    "Tilt",
    "InducedVertBreak",
    "HorzBreak",
    "PlateLocSide",
    "PlateLocHeight",
    "ExitSpeed",
    "RelHeight",
    "RelSide",
    "Extension",
];

/// Position of `pitch_type` in [`PITCH_TYPE_ORDER`], if it is a known type.
pub fn canonical_rank(pitch_type: &str) -> Option<usize> {
    PITCH_TYPE_ORDER.iter().position(|p| *p == pitch_type)
}

// ---------------------------------------------------------------------------
// CellValue – a single parsed cell from any source format
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a spreadsheet, CSV, JSON or Parquet
/// source, before it is mapped onto a [`PitchRecord`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    /// Interpret the cell as a finite number. Numeric text is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Interpret the cell as a non-empty label.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Float(v) if v.is_finite() => Some(v.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.to_string()),
            CellValue::Float(_) | CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical fields
// ---------------------------------------------------------------------------

/// Batter handedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatterSide {
    Right,
    Left,
}

impl BatterSide {
    /// Parse a handedness label; anything unrecognised is treated as absent.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            RIGHT_HANDED => Some(BatterSide::Right),
            LEFT_HANDED => Some(BatterSide::Left),
            other if other.eq_ignore_ascii_case("r") || other.eq_ignore_ascii_case("right") => {
                Some(BatterSide::Right)
            }
            other if other.eq_ignore_ascii_case("l") || other.eq_ignore_ascii_case("left") => {
                Some(BatterSide::Left)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BatterSide::Right => RIGHT_HANDED,
            BatterSide::Left => LEFT_HANDED,
        }
    }
}

/// Whether any baserunners were present when the pitch was thrown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunnerState {
    Empty,
    /// Runners on base; keeps the source label (e.g. `1루`, `만루`).
    Occupied(String),
}

impl RunnerState {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label == BASES_EMPTY || label.eq_ignore_ascii_case("empty") {
            RunnerState::Empty
        } else {
            RunnerState::Occupied(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RunnerState::Empty => BASES_EMPTY,
            RunnerState::Occupied(label) => label,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RunnerState::Empty)
    }
}

// ---------------------------------------------------------------------------
// PitchRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single tracked pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchRecord {
    pub date: NaiveDate,
    pub pitcher_name: String,
    /// `None` when the source row left the pitch type blank.
    pub pitch_type: Option<String>,
    pub batter_side: Option<BatterSide>,
    pub runner_state: Option<RunnerState>,
    pub umpire_call: Option<String>,
    pub release_speed: Option<f64>,
    pub spin_rate: Option<f64>,
    pub spin_efficiency: Option<f64>,
    /// Clock-face spin axis, e.g. `1:30`.
    pub tilt: Option<String>,
    pub induced_vert_break: Option<f64>,
    pub horz_break: Option<f64>,
    pub plate_loc_side: Option<f64>,
    pub plate_loc_height: Option<f64>,
    pub exit_speed: Option<f64>,
    pub release_height: Option<f64>,
    pub release_side: Option<f64>,
    pub extension: Option<f64>,
}

impl PitchRecord {
    /// A record with the identifying fields set and every measurement absent.
    pub fn new(date: NaiveDate, pitcher_name: impl Into<String>, pitch_type: Option<&str>) -> Self {
        Self {
            date,
            pitcher_name: pitcher_name.into(),
            pitch_type: pitch_type.map(str::to_string),
            batter_side: None,
            runner_state: None,
            umpire_call: None,
            release_speed: None,
            spin_rate: None,
            spin_efficiency: None,
            tilt: None,
            induced_vert_break: None,
            horz_break: None,
            plate_loc_side: None,
            plate_loc_height: None,
            exit_speed: None,
            release_height: None,
            release_side: None,
            extension: None,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// The record as a source row laid out like [`RECORD_COLUMNS`].
    pub fn to_cells(&self) -> Vec<CellValue> {
        let text = |v: Option<&str>| v.map_or(CellValue::Null, |s| CellValue::String(s.to_string()));
        let num = |v: Option<f64>| v.map_or(CellValue::Null, CellValue::Float);
        vec![
            CellValue::DateTime(self.date.and_time(NaiveTime::MIN)),
            CellValue::String(self.pitcher_name.clone()),
            text(self.pitch_type.as_deref()),
            text(self.batter_side.map(BatterSide::label)),
            text(self.runner_state.as_ref().map(RunnerState::label)),
            text(self.umpire_call.as_deref()),
            num(self.release_speed),
            num(self.spin_rate),
            num(self.spin_efficiency),
            text(self.tilt.as_deref()),
            num(self.induced_vert_break),
            num(self.horz_break),
            num(self.plate_loc_side),
            num(self.plate_loc_height),
            num(self.exit_speed),
            num(self.release_height),
            num(self.release_side),
            num(self.extension),
        ]
    }
}

// ---------------------------------------------------------------------------
// SourceTable – the rows exactly as loaded
// ---------------------------------------------------------------------------

/// Every source column and cell, kept alongside the parsed records so an
/// export carries the columns the record model does not know about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub columns: Vec<String>,
    /// One row per record; every row is `columns.len()` wide.
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    /// Append rows read under `columns`. Columns new to the table are added
    /// at the end and left null in the rows already present.
    pub fn append(&mut self, columns: &[String], rows: Vec<Vec<CellValue>>) {
        let known = self.columns.len();
        let positions: Vec<usize> = columns
            .iter()
            .map(|name| match self.columns[..known].iter().position(|c| c == name) {
                Some(pos) => pos,
                None => {
                    self.columns.push(name.clone());
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, CellValue::Null);
        }
        for row in rows {
            let mut aligned = vec![CellValue::Null; width];
            for (cell, &pos) in row.into_iter().zip(&positions) {
                aligned[pos] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

// ---------------------------------------------------------------------------
// PitchDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All loaded pitches plus the value lists the filter widgets offer.
#[derive(Debug, Clone, Default)]
pub struct PitchDataset {
    pub records: Vec<PitchRecord>,
    /// The loaded table, row-aligned with `records`.
    pub source: SourceTable,
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Distinct non-empty pitcher names, sorted.
    pub pitcher_names: Vec<String>,
    /// Distinct pitch types in order of first appearance.
    pub pitch_types: Vec<String>,
}

impl PitchDataset {
    /// Dataset whose source table holds just the modelled columns.
    pub fn from_records(records: Vec<PitchRecord>) -> Self {
        let source = SourceTable {
            columns: RECORD_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(PitchRecord::to_cells).collect(),
        };
        Self::from_parts(records, source)
    }

    /// Build the value lists from the loaded records. `source` must hold one
    /// row per record, in the same order.
    pub fn from_parts(records: Vec<PitchRecord>, source: SourceTable) -> Self {
        debug_assert_eq!(records.len(), source.rows.len());
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut names: BTreeSet<String> = BTreeSet::new();
        let mut pitch_types: Vec<String> = Vec::new();

        for rec in &records {
            years.insert(rec.year());
            if !rec.pitcher_name.is_empty() {
                names.insert(rec.pitcher_name.clone());
            }
            if let Some(pt) = rec.pitch_type.as_deref() {
                if !pitch_types.iter().any(|seen| seen == pt) {
                    pitch_types.push(pt.to_string());
                }
            }
        }

        PitchDataset {
            years: years.into_iter().collect(),
            pitcher_names: names.into_iter().collect(),
            pitch_types,
            records,
            source,
        }
    }

    /// Number of pitches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Vec<&PitchRecord> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }

    /// Earliest and latest pitch dates.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dataset_indexes_years_names_and_types() {
        let ds = PitchDataset::from_records(vec![
            PitchRecord::new(day(2024, 4, 2), "Kim", Some("커브")),
            PitchRecord::new(day(2023, 9, 1), "Ahn", Some("직구")),
            PitchRecord::new(day(2024, 5, 2), "Kim", Some("커브")),
            PitchRecord::new(day(2024, 5, 3), "", None),
        ]);

        assert_eq!(ds.years, vec![2023, 2024]);
        assert_eq!(ds.pitcher_names, vec!["Ahn".to_string(), "Kim".to_string()]);
        assert_eq!(ds.pitch_types, vec!["커브".to_string(), "직구".to_string()]);
        assert_eq!(ds.date_span(), Some((day(2023, 9, 1), day(2024, 5, 3))));
    }

    #[test]
    fn labels_parse_into_categories() {
        assert_eq!(BatterSide::parse("우타"), Some(BatterSide::Right));
        assert_eq!(BatterSide::parse(" L "), Some(BatterSide::Left));
        assert_eq!(BatterSide::parse("스위치"), None);

        assert!(RunnerState::parse("주자무").is_empty());
        assert_eq!(RunnerState::parse("1,2루").label(), "1,2루");
    }

    #[test]
    fn cell_text_drops_trailing_zero_fraction() {
        assert_eq!(CellValue::Float(12.0).as_text().as_deref(), Some("12"));
        assert_eq!(CellValue::String("  ".into()).as_text(), None);
        assert_eq!(CellValue::String(" 88.5 ".into()).as_f64(), Some(88.5));
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn canonical_rank_follows_palette_order() {
        assert_eq!(canonical_rank("직구"), Some(0));
        assert_eq!(canonical_rank("너클"), Some(8));
        assert_eq!(canonical_rank("eephus"), None);
    }

    #[test]
    fn source_table_widens_for_new_columns() {
        let cols = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        let mut table = SourceTable::default();
        table.append(&cols(&["Date", "투수"]), vec![vec![CellValue::Integer(1), "Kim".into()]]);
        table.append(
            &cols(&["투수", "Date", "Catcher"]),
            vec![vec!["Park".into(), CellValue::Integer(2), "Yang".into()]],
        );

        assert_eq!(table.columns, cols(&["Date", "투수", "Catcher"]));
        assert_eq!(
            table.rows,
            vec![
                vec![CellValue::Integer(1), "Kim".into(), CellValue::Null],
                vec![CellValue::Integer(2), "Park".into(), "Yang".into()],
            ]
        );
    }

    #[test]
    fn records_without_a_source_get_the_modelled_columns() {
        let mut rec = PitchRecord::new(day(2024, 4, 2), "Kim", Some("직구"));
        rec.batter_side = Some(BatterSide::Left);
        let ds = PitchDataset::from_records(vec![rec]);

        assert_eq!(ds.source.columns.len(), RECORD_COLUMNS.len());
        assert_eq!(ds.source.rows[0][3], CellValue::String("좌타".into()));
        assert_eq!(ds.source.rows[0][6], CellValue::Null);
    }

    #[test]
    fn empty_dataset_reports_empty() {
        assert!(PitchDataset::default().is_empty());
        assert!(!PitchDataset::from_records(vec![PitchRecord::new(day(2024, 4, 2), "Kim", None)]).is_empty());
    }
}
