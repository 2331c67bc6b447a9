//! CSV ingest for light curves and model templates.
//!
//! Light-curve schema: required `time`, `flux`; optional `flux_err`, `model`.
//! Template schema: required `time` plus `model` (or `flux`).
//!
//! Rows that fail to parse are skipped and reported; they never abort the load
//! unless nothing usable remains.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::LightCurve;
use crate::error::AppError;
use crate::models::TabulatedModel;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the light curve plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedCurve {
    pub curve: LightCurve,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedCurve {
    pub fn rows_used(&self) -> usize {
        self.curve.len()
    }
}

/// Load a light curve CSV.
pub fn load_light_curve(path: &Path) -> Result<IngestedCurve, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_light_curve(file)
}

/// Parse a light curve CSV from any reader.
pub fn read_light_curve<R: Read>(input: R) -> Result<IngestedCurve, AppError> {
    let mut reader = csv_reader(input);
    let header_map = read_header_map(&mut reader)?;

    ensure_column(&header_map, "time")?;
    ensure_column(&header_map, "flux")?;
    let has_err = header_map.contains_key("flux_err");
    let has_model = header_map.contains_key("model");

    let mut curve = LightCurve {
        flux_err: has_err.then(Vec::new),
        model: has_model.then(Vec::new),
        ..LightCurve::default()
    };
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, has_err, has_model) {
            Ok(row) => {
                curve.time.push(row.time);
                curve.flux.push(row.flux);
                if let (Some(col), Some(v)) = (curve.flux_err.as_mut(), row.flux_err) {
                    col.push(v);
                }
                if let (Some(col), Some(v)) = (curve.model.as_mut(), row.model) {
                    col.push(v);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if curve.is_empty() {
        return Err(AppError::new(2, "No valid rows in light curve CSV."));
    }

    Ok(IngestedCurve {
        curve,
        row_errors,
        rows_read,
    })
}

/// Load a model template CSV.
pub fn load_template(path: &Path) -> Result<TabulatedModel, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open template '{}': {e}", path.display()))
    })?;
    read_template(file)
}

/// Parse a model template CSV from any reader.
///
/// Unlike light curves, templates are strict: any bad row is an error.
pub fn read_template<R: Read>(input: R) -> Result<TabulatedModel, AppError> {
    let mut reader = csv_reader(input);
    let header_map = read_header_map(&mut reader)?;

    ensure_column(&header_map, "time")?;
    let value_col = if header_map.contains_key("model") {
        "model"
    } else if header_map.contains_key("flux") {
        "flux"
    } else {
        return Err(AppError::new(2, "Template needs a `model` (or `flux`) column."));
    };

    let mut time = Vec::new();
    let mut flux = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("Template line {line}: {e}")))?;
        let t = get_f64(&record, &header_map, "time")
            .map_err(|e| AppError::new(2, format!("Template line {line}: {e}")))?;
        let v = get_f64(&record, &header_map, value_col)
            .map_err(|e| AppError::new(2, format!("Template line {line}: {e}")))?;
        time.push(t);
        flux.push(v);
    }

    Ok(TabulatedModel::new(time, flux)?)
}

struct Row {
    time: f64,
    flux: f64,
    flux_err: Option<f64>,
    model: Option<f64>,
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    has_err: bool,
    has_model: bool,
) -> Result<Row, String> {
    let time = get_f64(record, header_map, "time")?;
    let flux = get_f64(record, header_map, "flux")?;
    let flux_err = if has_err {
        Some(get_f64(record, header_map, "flux_err")?)
    } else {
        None
    };
    let model = if has_model {
        Some(get_f64(record, header_map, "model")?)
    } else {
        None
    };
    Ok(Row {
        time,
        flux,
        flux_err,
        model,
    })
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input)
}

fn read_header_map<R: Read>(reader: &mut csv::Reader<R>) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    Ok(build_header_map(&headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_column(header_map: &HashMap<String, usize>, name: &str) -> Result<(), AppError> {
    if header_map.contains_key(name) {
        Ok(())
    } else {
        Err(AppError::new(2, format!("Missing required column: `{name}`")))
    }
}

fn get_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    let raw = record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{raw}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value for `{name}`: '{raw}'"))
    }
}
