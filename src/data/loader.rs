use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{BatterSide, CellValue, PitchDataset, PitchRecord, RunnerState, SourceTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching {origin}")]
    Fetch {
        origin: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading {origin}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {origin}: {reason}")]
    Parse { origin: String, reason: String },

    #[error("{origin}: unsupported file extension '.{extension}'")]
    UnsupportedFormat { origin: String, extension: String },

    #[error("{origin}: missing required column '{column}'")]
    MissingColumn { origin: String, column: &'static str },

    #[error("{origin}, row {row}: cannot read '{value}' as a date")]
    DateCoercion {
        origin: String,
        row: usize,
        value: String,
    },
}

fn parse_error(origin: &str, reason: impl fmt::Display) -> LoadError {
    LoadError::Parse {
        origin: origin.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` locations are remote, everything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Source::Url(location.to_string())
        } else {
            Source::Path(PathBuf::from(location))
        }
    }

    /// Final path segment without query string or fragment.
    fn file_name(&self) -> String {
        match self {
            Source::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|u| u.rsplit('/').next())
                .unwrap_or("download")
                .to_string(),
            Source::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch every source and concatenate the rows: source order first, then
/// the original row order inside each source.
///
/// `timeout` bounds each HTTP request; `None` waits indefinitely.
pub fn load_sources(sources: &[Source], timeout: Option<Duration>) -> Result<PitchDataset, LoadError> {
    let mut records = Vec::new();
    let mut table = SourceTable::default();
    for source in sources {
        let (mut part, raw) = load_one(source, timeout)?;
        records.append(&mut part);
        table.append(&raw.headers, raw.rows);
    }
    Ok(PitchDataset::from_parts(records, table))
}

/// Load a single local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xls` / `.xlsm` / `.xlsb` – first worksheet, header row first
/// * `.csv`     – header row, one pitch per line
/// * `.json`    – `[{ "Date": "2024-04-02", "투수": "...", ... }, ...]`
/// * `.parquet` – one scalar column per field
pub fn load_file(path: &Path) -> Result<PitchDataset, LoadError> {
    let origin = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        origin: origin.clone(),
        source,
    })?;
    let (records, raw) = parse_bytes(&bytes, &Source::Path(path.to_path_buf()).file_name(), &origin)?;
    info!("Loaded {} pitches from {origin}", records.len());

    let mut table = SourceTable::default();
    table.append(&raw.headers, raw.rows);
    Ok(PitchDataset::from_parts(records, table))
}

fn load_one(source: &Source, timeout: Option<Duration>) -> Result<(Vec<PitchRecord>, RawTable), LoadError> {
    let origin = source.to_string();
    let bytes = fetch(source, timeout)?;
    let parsed = parse_bytes(&bytes, &source.file_name(), &origin)?;
    info!("Loaded {} pitches from {origin}", parsed.0.len());
    Ok(parsed)
}

fn fetch(source: &Source, timeout: Option<Duration>) -> Result<Vec<u8>, LoadError> {
    let origin = source.to_string();
    match source {
        Source::Path(path) => std::fs::read(path).map_err(|source| LoadError::Io { origin, source }),
        Source::Url(url) => {
            debug!("GET {url}");
            let fetch_err = |source| LoadError::Fetch {
                origin: origin.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .user_agent(concat!("pitch-scope/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .map_err(fetch_err)?;
            let body = client
                .get(url)
                .send()
                .and_then(|res| res.error_for_status())
                .and_then(|res| res.bytes())
                .map_err(fetch_err)?;
            Ok(body.to_vec())
        }
    }
}

/// Parse one file into records plus the table they came from, with the date
/// column normalised in place.
fn parse_bytes(
    bytes: &[u8],
    file_name: &str,
    origin: &str,
) -> Result<(Vec<PitchRecord>, RawTable), LoadError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" => read_workbook(bytes, origin)?,
        "csv" => read_csv(bytes, origin)?,
        "json" => read_json(bytes, origin)?,
        "parquet" | "pq" => read_parquet(bytes, origin)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                origin: origin.to_string(),
                extension: other.to_string(),
            })
        }
    };
    let records = records_from_table(&mut table, origin)?;
    Ok((records, table))
}

// ---------------------------------------------------------------------------
// Raw tables
// ---------------------------------------------------------------------------

/// Header row plus cells, independent of the source format.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(bytes: &[u8], origin: &str) -> Result<RawTable, LoadError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| parse_error(origin, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error(origin, "workbook has no worksheets"))?
        .map_err(|e| parse_error(origin, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn workbook_cell(cell: &Data) -> CellValue {
    use calamine::DataType;
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => parse_datetime_str(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(bytes: &[u8], origin: &str) -> Result<RawTable, LoadError> {
    // Excel writes a BOM in front of UTF-8 CSV exports.
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(origin, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_error(origin, format!("row {row_no}: {e}")))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn read_json(bytes: &[u8], origin: &str) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes).map_err(|e| parse_error(origin, e))?;
    let records = root
        .as_array()
        .ok_or_else(|| parse_error(origin, "expected top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| parse_error(origin, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat tables only; nested columns come through as their type name.
fn read_parquet(data: &[u8], origin: &str) -> Result<RawTable, LoadError> {
    let body = bytes::Bytes::copy_from_slice(data);
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(body).map_err(|e| parse_error(origin, e))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| parse_error(origin, e))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parse_error(origin, e))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col.as_ref(), row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &dyn Array, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let datetime = |dt: Option<NaiveDateTime>| dt.map(CellValue::DateTime).unwrap_or(CellValue::Null);
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => datetime(
            col.as_primitive::<Date32Type>()
                .value_as_date(row)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        ),
        DataType::Date64 => datetime(col.as_primitive::<Date64Type>().value_as_datetime(row)),
        DataType::Timestamp(TimeUnit::Second, _) => {
            datetime(col.as_primitive::<TimestampSecondType>().value_as_datetime(row))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            datetime(col.as_primitive::<TimestampMillisecondType>().value_as_datetime(row))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            datetime(col.as_primitive::<TimestampMicrosecondType>().value_as_datetime(row))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            datetime(col.as_primitive::<TimestampNanosecondType>().value_as_datetime(row))
        }
        other => CellValue::String(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

const DATE: &[&str] = &["Date", "날짜"];
const PITCHER: &[&str] = &["투수", "Pitcher"];
const PITCH_TYPE: &[&str] = &["구종", "PitchType", "TaggedPitchType"];
const BATTER_SIDE: &[&str] = &["타자유형", "BatterSide"];
const RUNNERS: &[&str] = &["주자", "Runners"];
const UMPIRE_CALL: &[&str] = &["심판콜", "PitchCall"];
const RELEASE_SPEED: &[&str] = &["RelSpeed"];
const SPIN_RATE: &[&str] = &["SpinRate"];
const SPIN_EFFICIENCY: &[&str] = &["회전효율", "SpinEfficiency"];
const TILT: &[&str] = &["Tilt"];
const VERT_BREAK: &[&str] = &["InducedVertBreak"];
const HORZ_BREAK: &[&str] = &["HorzBreak"];
const PLATE_SIDE: &[&str] = &["PlateLocSide"];
const PLATE_HEIGHT: &[&str] = &["PlateLocHeight"];
const EXIT_SPEED: &[&str] = &["ExitSpeed"];
const RELEASE_HEIGHT: &[&str] = &["RelHeight"];
const RELEASE_SIDE: &[&str] = &["RelSide"];
const EXTENSION: &[&str] = &["Extension"];

/// Column positions of every field the record model knows about.
struct ColumnIndex {
    date: usize,
    pitcher: usize,
    pitch_type: usize,
    batter_side: Option<usize>,
    runners: Option<usize>,
    umpire_call: Option<usize>,
    release_speed: Option<usize>,
    spin_rate: Option<usize>,
    spin_efficiency: Option<usize>,
    tilt: Option<usize>,
    vert_break: Option<usize>,
    horz_break: Option<usize>,
    plate_side: Option<usize>,
    plate_height: Option<usize>,
    exit_speed: Option<usize>,
    release_height: Option<usize>,
    release_side: Option<usize>,
    extension: Option<usize>,
}

impl ColumnIndex {
    fn locate(headers: &[String], origin: &str) -> Result<Self, LoadError> {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h.trim().eq_ignore_ascii_case(a)))
        };
        let require = |aliases: &[&'static str]| {
            find(aliases).ok_or_else(|| LoadError::MissingColumn {
                origin: origin.to_string(),
                column: aliases[0],
            })
        };

        Ok(ColumnIndex {
            date: require(DATE)?,
            pitcher: require(PITCHER)?,
            pitch_type: require(PITCH_TYPE)?,
            batter_side: find(BATTER_SIDE),
            runners: find(RUNNERS),
            umpire_call: find(UMPIRE_CALL),
            release_speed: find(RELEASE_SPEED),
            spin_rate: find(SPIN_RATE),
            spin_efficiency: find(SPIN_EFFICIENCY),
            tilt: find(TILT),
            vert_break: find(VERT_BREAK),
            horz_break: find(HORZ_BREAK),
            plate_side: find(PLATE_SIDE),
            plate_height: find(PLATE_HEIGHT),
            exit_speed: find(EXIT_SPEED),
            release_height: find(RELEASE_HEIGHT),
            release_side: find(RELEASE_SIDE),
            extension: find(EXTENSION),
        })
    }
}

fn records_from_table(table: &mut RawTable, origin: &str) -> Result<Vec<PitchRecord>, LoadError> {
    if table.headers.is_empty() && table.rows.is_empty() {
        return Ok(Vec::new());
    }
    let cols = ColumnIndex::locate(&table.headers, origin)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_no, row) in table.rows.iter_mut().enumerate() {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));
        let number = |idx: Option<usize>| cell(idx).and_then(CellValue::as_f64);
        let text = |idx: Option<usize>| cell(idx).and_then(CellValue::as_text);

        // Header is row 1 of the sheet, so data rows start at 2.
        let date = cell(Some(cols.date))
            .and_then(coerce_date)
            .ok_or_else(|| LoadError::DateCoercion {
                origin: origin.to_string(),
                row: row_no + 2,
                value: cell(Some(cols.date))
                    .map(CellValue::to_string)
                    .unwrap_or_else(|| CellValue::Null.to_string()),
            })?;

        records.push(PitchRecord {
            date,
            pitcher_name: text(Some(cols.pitcher)).unwrap_or_default(),
            pitch_type: text(Some(cols.pitch_type)),
            batter_side: text(cols.batter_side).and_then(|s| BatterSide::parse(&s)),
            runner_state: text(cols.runners).map(|s| RunnerState::parse(&s)),
            umpire_call: text(cols.umpire_call),
            release_speed: number(cols.release_speed),
            spin_rate: number(cols.spin_rate),
            spin_efficiency: number(cols.spin_efficiency),
            tilt: cell(cols.tilt).and_then(tilt_text),
            induced_vert_break: number(cols.vert_break),
            horz_break: number(cols.horz_break),
            plate_loc_side: number(cols.plate_side),
            plate_loc_height: number(cols.plate_height),
            exit_speed: number(cols.exit_speed),
            release_height: number(cols.release_height),
            release_side: number(cols.release_side),
            extension: number(cols.extension),
        });

        if let Some(cell) = row.get_mut(cols.date) {
            *cell = CellValue::DateTime(date.and_time(NaiveTime::MIN));
        }
    }
    Ok(records)
}

/// Spreadsheets often store a tilt such as `1:30` as a time of day, which
/// comes back either as a datetime cell or as `01:30:00` text.
fn tilt_text(cell: &CellValue) -> Option<String> {
    let clock = |t: NaiveTime| format!("{}:{:02}", t.hour(), t.minute());
    match cell {
        CellValue::DateTime(dt) => Some(clock(dt.time())),
        CellValue::String(s) => match NaiveTime::parse_from_str(s.trim(), "%H:%M:%S") {
            Ok(t) => Some(clock(t)),
            Err(_) => cell.as_text(),
        },
        other => other.as_text(),
    }
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

/// Excel day zero as used by serial date numbers (1900 date system).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Serial number of 9999-12-31.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::String(s) => parse_datetime_str(s).map(|dt| dt.date()),
        CellValue::Integer(i) => integer_date(*i),
        CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => integer_date(*f as i64),
        CellValue::Float(f) => excel_serial_to_date(*f),
        CellValue::Bool(_) | CellValue::Null => None,
    }
}

/// A whole number is an Excel serial when in range, else a compact
/// `YYYYMMDD` date, else epoch milliseconds (pandas' JSON default).
fn integer_date(n: i64) -> Option<NaiveDate> {
    if n <= EXCEL_MAX_SERIAL as i64 {
        return excel_serial_to_date(n as f64);
    }
    if (10_000_101..=99_991_231).contains(&n) {
        if let Ok(date) = NaiveDate::parse_from_str(&n.to_string(), "%Y%m%d") {
            return Some(date);
        }
    }
    DateTime::from_timestamp_millis(n).map(|dt| dt.date_naive())
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Parses date or datetime text; tries the formats in order.
fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Session cache
// ---------------------------------------------------------------------------

/// Keeps the last loaded dataset so repeated runs do not re-fetch.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(Vec<Source>, Arc<PitchDataset>)>,
}

impl DatasetCache {
    /// Return the cached dataset for `sources`, loading it on a miss.
    pub fn get_or_load(
        &mut self,
        sources: &[Source],
        timeout: Option<Duration>,
    ) -> Result<Arc<PitchDataset>, LoadError> {
        self.get_or_load_with(sources, |s| load_sources(s, timeout))
    }

    pub fn get_or_load_with<F>(
        &mut self,
        sources: &[Source],
        load: F,
    ) -> Result<Arc<PitchDataset>, LoadError>
    where
        F: FnOnce(&[Source]) -> Result<PitchDataset, LoadError>,
    {
        if let Some((cached_sources, dataset)) = &self.entry {
            if cached_sources.as_slice() == sources {
                debug!("Dataset cache hit ({} pitches)", dataset.len());
                return Ok(Arc::clone(dataset));
            }
        }
        let dataset = Arc::new(load(sources)?);
        self.entry = Some((sources.to_vec(), Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Replace the cached entry, e.g. after opening a local file.
    pub fn insert(&mut self, sources: Vec<Source>, dataset: Arc<PitchDataset>) {
        self.entry = Some((sources, dataset));
    }

    /// Forget the cached dataset so the next load fetches again.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
