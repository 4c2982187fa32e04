//! CSV exchange for storm records and derived unit hydrographs.
//!
//! # File Format
//!
//! ```text
//! Time_hr,Rainfall_in_hr,Discharge_cfs
//! 0,0,100
//! 1,0.5,100
//! 2,1.5,300
//! ```
//!
//! Columns are found by name, so their order does not matter and extra
//! columns are ignored. A results file can therefore be read back as input.
//! Results add `Rainfall_Excess_in_hr`, `Direct_Runoff_cfs` and `UH_cfs`.
//!
//! Fields may be wrapped in double quotes, in which case commas inside them
//! do not split the field and `""` stands for a literal quote. A quoted field
//! cannot span lines.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{HydrographError, Result};
use crate::storm::StormRecord;
use crate::unit_hydrograph::UnitHydrograph;

pub const TIME_COLUMN: &str = "Time_hr";
pub const RAINFALL_COLUMN: &str = "Rainfall_in_hr";
pub const DISCHARGE_COLUMN: &str = "Discharge_cfs";
pub const EXCESS_COLUMN: &str = "Rainfall_Excess_in_hr";
pub const RUNOFF_COLUMN: &str = "Direct_Runoff_cfs";
pub const UH_COLUMN: &str = "UH_cfs";

const INPUT_COLUMNS: [&str; 3] = [TIME_COLUMN, RAINFALL_COLUMN, DISCHARGE_COLUMN];
const RESULT_COLUMNS: [&str; 6] = [
    TIME_COLUMN,
    RAINFALL_COLUMN,
    DISCHARGE_COLUMN,
    EXCESS_COLUMN,
    RUNOFF_COLUMN,
    UH_COLUMN,
];

/// Reads a storm record from a CSV file.
pub fn read_storm_csv(path: &Path) -> Result<StormRecord> {
    let file = File::open(path)?;
    let record = parse_storm_csv(BufReader::new(file))?;
    tracing::info!(path = %path.display(), samples = record.len(), "read storm record");
    Ok(record)
}

/// Parses a storm record from CSV text.
///
/// The first non-blank line is the header. Blank lines are skipped.
///
/// # Errors
/// - `MissingColumn` if a required column is absent from the header
/// - `Parse` if a row is too short or a value is not a number
/// - any error from [`StormRecord::new`]
pub fn parse_storm_csv<R: BufRead>(reader: R) -> Result<StormRecord> {
    let mut indices: Option<[usize; 3]> = None;
    let mut columns: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let raw_fields = split_fields(line);
        let fields: Vec<&str> = raw_fields.iter().map(|f| clean_field(f)).collect();

        let Some(idx) = indices else {
            indices = Some(locate_columns(&fields)?);
            continue;
        };

        for (column, (&i, name)) in columns.iter_mut().zip(idx.iter().zip(INPUT_COLUMNS)) {
            let raw = fields.get(i).ok_or_else(|| HydrographError::Parse {
                line: line_num + 1,
                message: format!(
                    "expected at least {} fields, found {}",
                    i + 1,
                    fields.len()
                ),
            })?;
            let value: f64 = raw.parse().map_err(|_| HydrographError::Parse {
                line: line_num + 1,
                message: format!("{} value '{}' is not a number", name, raw),
            })?;
            column.push(value);
        }
    }

    if indices.is_none() {
        return Err(HydrographError::InvalidInput(
            "CSV input is empty; expected a header row".to_string(),
        ));
    }

    let [time, rainfall, discharge] = columns;
    StormRecord::new(time, rainfall, discharge)
}

// Split one line on commas outside double quotes, unquoting as it goes
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

// Strip whitespace and a UTF-8 BOM
fn clean_field(field: &str) -> &str {
    field.trim().trim_start_matches('\u{feff}').trim()
}

fn locate_columns(header: &[&str]) -> Result<[usize; 3]> {
    let mut indices = [0; 3];
    for (slot, name) in indices.iter_mut().zip(INPUT_COLUMNS) {
        *slot = header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| HydrographError::MissingColumn(name.to_string()))?;
    }
    Ok(indices)
}

/// Writes the three input columns of a record.
pub fn write_storm_csv<W: Write>(mut writer: W, record: &StormRecord) -> Result<()> {
    writeln!(writer, "{}", INPUT_COLUMNS.join(","))?;
    let (time, rainfall, discharge) = (record.time(), record.rainfall(), record.discharge());
    for i in 0..record.len() {
        writeln!(writer, "{},{},{}", time[i], rainfall[i], discharge[i])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the storm the hydrograph was derived from, augmented with excess
/// rainfall, direct runoff and unit hydrograph ordinates, one row per sample.
pub fn write_results_csv<W: Write>(mut writer: W, uh: &UnitHydrograph) -> Result<()> {
    writeln!(writer, "{}", RESULT_COLUMNS.join(","))?;
    for row in result_rows(uh) {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            row[0], row[1], row[2], row[3], row[4], row[5]
        )?;
    }
    writer.flush()?;
    Ok(())
}

// One [time, rainfall, discharge, excess, runoff, ordinate] array per sample
fn result_rows(uh: &UnitHydrograph) -> impl Iterator<Item = [f64; 6]> + '_ {
    let record = uh.record();
    (0..uh.len()).map(move |i| {
        [
            record.time()[i],
            record.rainfall()[i],
            record.discharge()[i],
            uh.excess_rainfall()[i],
            uh.direct_runoff()[i],
            uh.ordinates()[i],
        ]
    })
}

pub fn save_template(path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_storm_csv(BufWriter::new(file), &StormRecord::template())?;
    tracing::info!(path = %path.display(), "wrote CSV template");
    Ok(())
}

pub fn save_results(path: &Path, uh: &UnitHydrograph) -> Result<()> {
    let file = File::create(path)?;
    write_results_csv(BufWriter::new(file), uh)?;
    tracing::info!(path = %path.display(), rows = uh.len(), "wrote results");
    Ok(())
}

/// Renders the computed table as aligned text for the terminal.
pub fn format_table(uh: &UnitHydrograph) -> String {
    let rows: Vec<[String; 6]> = result_rows(uh)
        .map(|r| {
            [
                format!("{}", r[0]),
                format!("{:.2}", r[1]),
                format!("{:.1}", r[2]),
                format!("{:.2}", r[3]),
                format!("{:.1}", r[4]),
                format!("{:.2}", r[5]),
            ]
        })
        .collect();

    let mut widths = RESULT_COLUMNS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = RESULT_COLUMNS
        .iter()
        .zip(widths)
        .map(|(name, w)| format!("{:>w$}", name, w = w))
        .collect();
    out.push_str(&header.join("  "));
    out.push('\n');
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:>w$}", cell, w = w))
            .collect();
        out.push_str(&cells.join("  "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TransformParams;
    use std::io::Cursor;

    const STORM_CSV: &str = "Time_hr,Rainfall_in_hr,Discharge_cfs\n\
                             0,0,100\n\
                             1,0.5,100\n\
                             2,1.5,300\n";

    #[test]
    fn parses_named_columns() {
        let record = parse_storm_csv(Cursor::new(STORM_CSV)).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.time().as_slice(), &[0.0, 1.0, 2.0]);
        assert_eq!(record.rainfall().as_slice(), &[0.0, 0.5, 1.5]);
        assert_eq!(record.discharge().as_slice(), &[100.0, 100.0, 300.0]);
    }

    #[test]
    fn column_order_and_extras_do_not_matter() {
        let csv = "\u{feff}\"Discharge_cfs\", Notes ,\"Time_hr\",Rainfall_in_hr\n\
                   \n\
                   120, dry ,0,0.0\n\
                   180,wet,1,0.8\n";
        let record = parse_storm_csv(Cursor::new(csv)).unwrap();
        assert_eq!(record.time().as_slice(), &[0.0, 1.0]);
        assert_eq!(record.rainfall().as_slice(), &[0.0, 0.8]);
        assert_eq!(record.discharge().as_slice(), &[120.0, 180.0]);
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let csv = "\"Gauge, upstream\",Time_hr,Rainfall_in_hr,Discharge_cfs\n\
                   \"Elm Creek, \"\"north\"\" fork\",0,0.2,40\n\
                   plain,1,0.6,90\n";
        let record = parse_storm_csv(Cursor::new(csv)).unwrap();
        assert_eq!(record.time().as_slice(), &[0.0, 1.0]);
        assert_eq!(record.rainfall().as_slice(), &[0.2, 0.6]);
        assert_eq!(record.discharge().as_slice(), &[40.0, 90.0]);
    }

    #[test]
    fn split_fields_unquotes() {
        assert_eq!(
            split_fields("a,\"b,c\",\"say \"\"hi\"\"\",,d"),
            vec!["a", "b,c", "say \"hi\"", "", "d"]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "Time_hr,Rainfall_in_hr\n0,0.5\n";
        let err = parse_storm_csv(Cursor::new(csv)).unwrap_err();
        match err {
            HydrographError::MissingColumn(name) => assert_eq!(name, DISCHARGE_COLUMN),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_value_reports_line() {
        let csv = "Time_hr,Rainfall_in_hr,Discharge_cfs\n0,0,100\n1,heavy,100\n";
        let err = parse_storm_csv(Cursor::new(csv)).unwrap_err();
        match err {
            HydrographError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("Rainfall_in_hr"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_row_reports_line() {
        let csv = "Time_hr,Rainfall_in_hr,Discharge_cfs\n0,0\n";
        let err = parse_storm_csv(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, HydrographError::Parse { line: 2, .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_storm_csv(Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(err, HydrographError::InvalidInput(_)));
    }

    #[test]
    fn header_without_rows_is_rejected() {
        let err = parse_storm_csv(Cursor::new("Time_hr,Rainfall_in_hr,Discharge_cfs\n"))
            .unwrap_err();
        assert!(matches!(err, HydrographError::InvalidInput(_)));
    }

    #[test]
    fn template_csv_reads_back() {
        let mut buf = Vec::new();
        write_storm_csv(&mut buf, &StormRecord::template()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Time_hr,Rainfall_in_hr,Discharge_cfs\n0,0,100\n1,0.5,100\n"));

        let record = parse_storm_csv(Cursor::new(text)).unwrap();
        assert_eq!(record, StormRecord::template());
    }

    #[test]
    fn results_csv_has_derived_columns() {
        let record = StormRecord::template();
        let uh = UnitHydrograph::derive(&record, &TransformParams::new(0.25, 100.0)).unwrap();
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &uh).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Time_hr,Rainfall_in_hr,Discharge_cfs,Rainfall_Excess_in_hr,Direct_Runoff_cfs,UH_cfs"
        );
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[5], "4,0.5,1000,0.25,900,300");

        // Results are valid input too
        let again = parse_storm_csv(Cursor::new(text.as_str())).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn results_rows_come_from_the_derived_storm() {
        let short = StormRecord::new(vec![0.0, 1.0], vec![1.0, 0.0], vec![50.0, 30.0]).unwrap();
        let uh = UnitHydrograph::derive(&short, &TransformParams::new(0.0, 10.0)).unwrap();

        let mut buf = Vec::new();
        write_results_csv(&mut buf, &uh).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "0,1,50,1,40,40");
        assert_eq!(lines[2], "1,0,30,0,20,20");

        assert_eq!(format_table(&uh).lines().count(), 3);
    }

    #[test]
    fn save_and_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.csv");
        save_template(&path).unwrap();
        let record = read_storm_csv(&path).unwrap();
        assert_eq!(record, StormRecord::template());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_storm_csv(Path::new("no/such/storm.csv")).unwrap_err();
        assert!(matches!(err, HydrographError::Io(_)));
    }

    #[test]
    fn table_text_is_aligned() {
        let record = StormRecord::template();
        let uh = UnitHydrograph::derive(&record, &TransformParams::new(0.25, 100.0)).unwrap();
        let table = format_table(&uh);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].trim_start().starts_with("Time_hr"));
        assert!(lines[0].ends_with("UH_cfs"));
        assert!(lines[5].ends_with("300.00"));
        let width = lines[0].len();
        assert!(lines.iter().all(|l| l.len() == width));
    }
}
