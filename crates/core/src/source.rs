//! Reading the seismic event table

use std::path::Path;

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{QuakemapError, Result},
    types::EventRecord,
};

/// Accepted header names per field, compared case-insensitively.
const MAGNITUDE: &[&str] = &["mag", "magnitude"];
const DEPTH: &[&str] = &["focaldepth", "focal_depth", "depth"];
const LONGITUDE: &[&str] = &["longitude", "lon", "lng"];
const LATITUDE: &[&str] = &["latitude", "lat"];
const YEAR: &[&str] = &["year"];
const MONTH: &[&str] = &["mo", "month"];
const DAY: &[&str] = &["dy", "day"];
const HOUR: &[&str] = &["hr", "hour"];
const MINUTE: &[&str] = &["mn", "minute"];
const SECOND: &[&str] = &["sec", "second"];
const LOCATION: &[&str] = &["location", "place"];
const CASUALTY: &[&str] = &["deathdescription", "casualty_index", "casualties"];

/// Header plus untyped cells, before any field is interpreted.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

struct Columns {
    magnitude: usize,
    depth: usize,
    longitude: usize,
    latitude: usize,
    year: usize,
    month: usize,
    day: usize,
    hour: usize,
    minute: usize,
    second: usize,
    location: usize,
    casualty: Option<usize>,
}

impl RawTable {
    pub fn from_csv(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let Some(header_line) = lines.next() else {
            return Ok(Self::default());
        };
        let headers: Vec<String> = split_csv_line(header_line, 0)?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let row = i + 1;
            let cells = split_csv_line(line, row)?;
            if cells.len() > headers.len() {
                return Err(QuakemapError::malformed(
                    row,
                    "*",
                    format!(
                        "has {} cells but the header has {} columns",
                        cells.len(),
                        headers.len()
                    ),
                ));
            }
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    /// Parse a JSON array of flat objects. Keys of the first object define column order.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Array(items) = value else {
            return Err(QuakemapError::malformed(0, "*", "JSON input must be an array"));
        };

        let mut headers: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let Value::Object(map) = item else {
                return Err(QuakemapError::malformed(i + 1, "*", "is not a JSON object"));
            };
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            objects.push(map);
        }

        let rows = objects
            .into_iter()
            .map(|map| {
                headers
                    .iter()
                    .map(|h| match map.get(h) {
                        None | Some(Value::Null) => String::new(),
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    fn column(&self, aliases: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
    }

    fn require(&self, field: &str, aliases: &[&str]) -> Result<usize> {
        self.column(aliases).ok_or_else(|| {
            QuakemapError::malformed(0, field, format!("is missing (expected one of {aliases:?})"))
        })
    }

    fn columns(&self) -> Result<Columns> {
        Ok(Columns {
            magnitude: self.require("magnitude", MAGNITUDE)?,
            depth: self.require("depth", DEPTH)?,
            longitude: self.require("longitude", LONGITUDE)?,
            latitude: self.require("latitude", LATITUDE)?,
            year: self.require("year", YEAR)?,
            month: self.require("month", MONTH)?,
            day: self.require("day", DAY)?,
            hour: self.require("hour", HOUR)?,
            minute: self.require("minute", MINUTE)?,
            second: self.require("second", SECOND)?,
            location: self.require("location", LOCATION)?,
            casualty: self.column(CASUALTY),
        })
    }

    /// Interpret every row. The first bad cell aborts the whole read.
    pub fn records(&self) -> Result<Vec<EventRecord>> {
        let cols = self.columns()?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                let row = i + 1;
                let cell = |idx: usize| cells.get(idx).map(|c| c.trim()).unwrap_or("");

                let casualty_index = match cols.casualty.map(cell) {
                    None | Some("") => 0,
                    Some(value) => parse_whole(value, row, "casualty_index")?,
                };

                Ok(EventRecord {
                    row,
                    magnitude: parse_real(cell(cols.magnitude), row, "magnitude")?,
                    depth: parse_real(cell(cols.depth), row, "depth")?,
                    longitude: parse_real(cell(cols.longitude), row, "longitude")?,
                    latitude: parse_real(cell(cols.latitude), row, "latitude")?,
                    year: narrow(parse_whole(cell(cols.year), row, "year")?, row, "year")?,
                    month: narrow(parse_whole(cell(cols.month), row, "month")?, row, "month")?,
                    day: narrow(parse_whole(cell(cols.day), row, "day")?, row, "day")?,
                    hour: narrow(parse_truncated(cell(cols.hour), row, "hour")?, row, "hour")?,
                    minute: narrow(
                        parse_truncated(cell(cols.minute), row, "minute")?,
                        row,
                        "minute",
                    )?,
                    second: narrow(
                        parse_truncated(cell(cols.second), row, "second")?,
                        row,
                        "second",
                    )?,
                    location: cell(cols.location).to_string(),
                    casualty_index,
                })
            })
            .collect()
    }
}

/// Load event records from a `.json` or CSV file
pub async fn load_table(path: &Path) -> Result<Vec<EventRecord>> {
    let content = fs::read_to_string(path).await?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let table = if is_json {
        RawTable::from_json(&content)?
    } else {
        RawTable::from_csv(&content)?
    };
    debug!(
        "Read {} rows with columns {:?} from {}",
        table.rows.len(),
        table.headers,
        path.display()
    );

    let records = table.records()?;
    info!("Loaded {} event records from {}", records.len(), path.display());
    Ok(records)
}

/// Split one CSV line, honouring double quotes and `""` escapes.
fn split_csv_line(line: &str, row: usize) -> Result<Vec<String>> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(QuakemapError::malformed(row, "*", "has an unterminated quoted cell"));
    }
    cells.push(current);
    Ok(cells)
}

fn parse_real(value: &str, row: usize, field: &str) -> Result<f64> {
    if value.is_empty() {
        return Err(QuakemapError::malformed(row, field, "is missing"));
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(QuakemapError::malformed(
            row,
            field,
            format!("is not a finite number: '{value}'"),
        )),
    }
}

/// Integer cell; `2020.0` is accepted, `2020.5` is not.
fn parse_whole(value: &str, row: usize, field: &str) -> Result<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    let real = parse_real(value, row, field)?;
    if real.fract() != 0.0 {
        return Err(QuakemapError::malformed(
            row,
            field,
            format!("is not a whole number: '{value}'"),
        ));
    }
    Ok(real as i64)
}

/// Clock cells may carry fractions (e.g. `12.5` seconds); they are truncated.
fn parse_truncated(value: &str, row: usize, field: &str) -> Result<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    Ok(parse_real(value, row, field)?.trunc() as i64)
}

fn narrow<T: TryFrom<i64>>(value: i64, row: usize, field: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| QuakemapError::malformed(row, field, format!("is out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "year,mo,dy,hr,mn,sec,latitude,longitude,focaldepth,mag,location,deathdescription";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_reads_typed_record() {
        let table =
            RawTable::from_csv(&csv(&["2008,5,12,6,28,1.5,31.0,103.4,19,7.9,CHINA: SICHUAN,4"]))
                .unwrap();
        let records = table.records().unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.row, 1);
        assert_eq!(r.year, 2008);
        assert_eq!(r.month, 5);
        assert_eq!(r.second, 1);
        assert_eq!(r.magnitude, 7.9);
        assert_eq!(r.depth, 19.0);
        assert_eq!(r.location, "CHINA: SICHUAN");
        assert_eq!(r.casualty_index, 4);
    }

    #[test]
    fn test_quoted_location_with_comma() {
        let table = RawTable::from_csv(&csv(&[
            r#"1976,7,27,19,42,54,39.6,118.0,23,7.5,"CHINA: HEBEI, TANGSHAN",4"#,
        ]))
        .unwrap();
        let records = table.records().unwrap();
        assert_eq!(records[0].location, "CHINA: HEBEI, TANGSHAN");
    }

    #[test]
    fn test_escaped_quotes_are_unescaped() {
        let cells = split_csv_line(r#"a,"say ""hi""",c"#, 1).unwrap();
        assert_eq!(cells, vec!["a", r#"say "hi""#, "c"]);
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = split_csv_line(r#"a,"open"#, 3).unwrap_err();
        assert!(matches!(err, QuakemapError::MalformedRecord { row: 3, .. }));
    }

    #[test]
    fn test_missing_casualty_cell_defaults_to_zero() {
        let table =
            RawTable::from_csv(&csv(&["2013,4,20,0,2,47,30.3,103.0,13,6.6,CHINA: SICHUAN,"]))
                .unwrap();
        assert_eq!(table.records().unwrap()[0].casualty_index, 0);
    }

    #[test]
    fn test_absent_casualty_column_defaults_to_zero() {
        let text = "year,mo,dy,hr,mn,sec,latitude,longitude,focaldepth,mag,location\n\
                    2013,4,20,0,2,47,30.3,103.0,13,6.6,CHINA: SICHUAN";
        let records = RawTable::from_csv(text).unwrap().records().unwrap();
        assert_eq!(records[0].casualty_index, 0);
    }

    #[test]
    fn test_missing_required_column_names_field() {
        let text = "year,mo,dy,hr,mn,sec,latitude,longitude,mag,location\n2013,4,20,0,2,47,30.3,103.0,6.6,X";
        let err = RawTable::from_csv(text).unwrap().records().unwrap_err();
        match err {
            QuakemapError::MalformedRecord { row, field, .. } => {
                assert_eq!(row, 0);
                assert_eq!(field, "depth");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_magnitude_is_malformed() {
        let table =
            RawTable::from_csv(&csv(&["2013,4,20,0,2,47,30.3,103.0,13,big,CHINA: SICHUAN,0"]))
                .unwrap();
        let err = table.records().unwrap_err();
        match err {
            QuakemapError::MalformedRecord { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "magnitude");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_year_is_malformed() {
        let table =
            RawTable::from_csv(&csv(&["2013.5,4,20,0,2,47,30.3,103.0,13,6.6,CHINA: SICHUAN,0"]))
                .unwrap();
        let err = table.records().unwrap_err();
        assert!(matches!(
            err,
            QuakemapError::MalformedRecord { ref field, .. } if field == "year"
        ));
    }

    #[test]
    fn test_whole_float_year_is_accepted() {
        let table =
            RawTable::from_csv(&csv(&["2013.0,4,20,0,2,47,30.3,103.0,13,6.6,CHINA: SICHUAN,1.0"]))
                .unwrap();
        let records = table.records().unwrap();
        assert_eq!(records[0].year, 2013);
        assert_eq!(records[0].casualty_index, 1);
    }

    #[test]
    fn test_nan_is_rejected() {
        let table =
            RawTable::from_csv(&csv(&["2013,4,20,0,2,47,30.3,103.0,NaN,6.6,CHINA: SICHUAN,0"]))
                .unwrap();
        assert!(table.records().is_err());
    }

    #[test]
    fn test_json_rows_match_csv_rows() {
        let json = r#"[
            {"year": 2008, "mo": 5, "dy": 12, "hr": 6, "mn": 28, "sec": 1.5,
             "latitude": 31.0, "longitude": 103.4, "focaldepth": 19, "mag": 7.9,
             "location": "CHINA: SICHUAN", "deathdescription": null}
        ]"#;
        let from_json = RawTable::from_json(json).unwrap().records().unwrap();
        let from_csv =
            RawTable::from_csv(&csv(&["2008,5,12,6,28,1.5,31.0,103.4,19,7.9,CHINA: SICHUAN,"]))
                .unwrap()
                .records()
                .unwrap();
        assert_eq!(from_json, from_csv);
    }

    #[test]
    fn test_json_must_be_array() {
        assert!(RawTable::from_json(r#"{"mag": 7.0}"#).is_err());
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let records = RawTable::from_csv(HEADER).unwrap().records().unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_load_table_picks_parser_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quake.json");
        tokio::fs::write(
            &path,
            r#"[{"year": 2020, "mo": 1, "dy": 1, "hr": 0, "mn": 0, "sec": 0,
                 "latitude": 30, "longitude": 100, "focaldepth": 10, "mag": 7.2,
                 "location": "TEST"}]"#,
        )
        .await
        .unwrap();

        let records = load_table(&path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "TEST");
    }
}
