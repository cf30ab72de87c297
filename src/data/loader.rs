use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{LoadError, Result};
use super::model::{CoreDataset, Profile};
use super::table::{Cell, RawTable};
use crate::config::{PlotConfig, SeriesSource};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every enabled series named by the configuration.
///
/// All input files are checked up front, so a missing file fails the run
/// before anything is read or drawn.
pub fn load_core(config: &PlotConfig) -> Result<CoreDataset> {
    for source in config.panels().filter_map(|p| p.active_source()) {
        if !source.path.is_file() {
            return Err(LoadError::FileNotFound(source.path.clone()));
        }
    }

    let load = |source: Option<&SeriesSource>| source.map(load_profile).transpose();

    Ok(CoreDataset {
        age_model: load(config.age_model.active_source())?,
        titanium: load(config.titanium.active_source())?,
        extra: config
            .extra_panels
            .iter()
            .map(|p| load(p.active_source()))
            .collect::<Result<Vec<_>>>()?,
    })
}

/// Read the depth and value columns of one source.
pub fn load_profile(source: &SeriesSource) -> Result<Profile> {
    let table = load_table(&source.path, source.sheet.as_deref())?;
    let column_err = |e| LoadError::Column {
        path: source.path.clone(),
        source: e,
    };

    let mut depth = table
        .numeric_column(&source.depth_column, &source.na_values)
        .map_err(column_err)?;
    let values = table
        .numeric_column(&source.value_column, &source.na_values)
        .map_err(column_err)?;

    if source.depth_scale != 1.0 {
        depth.iter_mut().for_each(|d| *d *= source.depth_scale);
    }

    let profile = Profile {
        source: source.path.clone(),
        ..Profile::new(depth, values)
    };
    log::info!(
        "Loaded {} rows from {} (depth {}, value {})",
        profile.len(),
        source.path.display(),
        source.depth_column,
        source.value_column
    );
    Ok(profile)
}

/// Load a sheet from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – workbook, first sheet by default
/// * `.csv`     – header row, then data rows
/// * `.parquet` – one column per field, field names as headers
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    if !path.is_file() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path, sheet),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: "<first>".to_string(),
            })?,
    };
    if !workbook.sheet_names().contains(&sheet_name) {
        return Err(LoadError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet_name,
        });
    }

    let range = workbook.worksheet_range(&sheet_name)?;

    // Pad on the left so column letters stay absolute when the used range
    // does not start in column A.
    let first_col = range.start().map(|(_, c)| c as usize).unwrap_or(0);
    let pad = || std::iter::repeat(Cell::Empty).take(first_col);

    let mut rows = range
        .rows()
        .map(|row| pad().chain(row.iter().map(cell_from_data)).collect::<Vec<_>>());

    let headers = rows
        .next()
        .map(|h| h.iter().map(Cell::to_header).collect())
        .unwrap_or_default();

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // #N/A, #DIV/0! etc. read as missing
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one row per sample.
/// Rows may be shorter than the header.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file: each field is a column, field names are headers.
/// Numeric fields become numbers, string fields text, nulls empty cells.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| cell_from_arrow(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn cell_from_arrow(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Empty;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Cell::Number(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| Cell::Number(a.value(row) as f64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Cell::Number(a.value(row) as f64)),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| Cell::Number(a.value(row) as f64)),
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        other => Some(Cell::Text(format!("{other:?}"))),
    };
    cell.unwrap_or(Cell::Empty)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use calamine::CellErrorType;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::config::PanelConfig;
    use crate::data::error::ColumnError;
    use crate::data::table::ColumnSelector;

    fn source(path: &Path, depth: ColumnSelector, value: ColumnSelector) -> SeriesSource {
        SeriesSource {
            path: path.to_path_buf(),
            sheet: None,
            depth_column: depth,
            value_column: value,
            na_values: vec!["NA".to_string()],
            depth_scale: 1.0,
            enabled: true,
        }
    }

    fn letter(l: &str) -> ColumnSelector {
        ColumnSelector::Letter(l.to_string())
    }

    fn name(n: &str) -> ColumnSelector {
        ColumnSelector::Name(n.to_string())
    }

    fn write_csv(dir: &Path, file: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(file);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    /// Two sheets: an age model in A..F with an "NA" age, and an XRF
    /// scan whose used range starts in column C (depth) and ends in N (Ti).
    fn write_workbook(dir: &Path, file: &str) -> std::path::PathBuf {
        let path = dir.join(file);
        let mut workbook = Workbook::new();

        let ages = workbook.add_worksheet();
        ages.set_name("Age model").unwrap();
        for (col, header) in ["MCD", "min", "max", "median", "mean", "Age"]
            .into_iter()
            .enumerate()
        {
            ages.write_string(0, col as u16, header).unwrap();
        }
        for (row, (depth, age)) in [(0.0, Some(2020.0)), (10.0, None), (20.0, Some(2000.0))]
            .into_iter()
            .enumerate()
        {
            let row = row as u32 + 1;
            ages.write_number(row, 0, depth).unwrap();
            match age {
                Some(age) => ages.write_number(row, 5, age).unwrap(),
                None => ages.write_string(row, 5, "NA").unwrap(),
            };
        }

        let xrf = workbook.add_worksheet();
        xrf.set_name("XRF").unwrap();
        xrf.write_string(0, 2, "Depth (mm)").unwrap();
        xrf.write_string(0, 13, "Ti").unwrap();
        for (row, (depth, ti)) in [(0.0, 5.0), (10.0, 7.0), (20.0, 9.0)]
            .into_iter()
            .enumerate()
        {
            let row = row as u32 + 1;
            xrf.write_number(row, 2, depth).unwrap();
            xrf.write_number(row, 13, ti).unwrap();
        }

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn workbook_first_sheet_by_letter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(dir.path(), "age-model.xlsx");

        let table = load_table(&path, None).unwrap();
        assert_eq!(table.headers[0], "MCD");
        assert_eq!(table.headers[5], "Age");

        let p = load_profile(&source(&path, letter("A"), letter("F"))).unwrap();
        assert_eq!(p.depth, vec![0.0, 10.0, 20.0]);
        assert_eq!(p.values[0], 2020.0);
        assert!(p.values[1].is_nan());
        assert_eq!(p.values[2], 2000.0);
    }

    #[test]
    fn workbook_letters_stay_absolute_when_sheet_starts_right_of_a() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(dir.path(), "xrf.xlsx");

        let mut src = source(&path, letter("C"), letter("N"));
        src.sheet = Some("XRF".to_string());
        let p = load_profile(&src).unwrap();
        assert_eq!(p.depth, vec![0.0, 10.0, 20.0]);
        assert_eq!(p.values, vec![5.0, 7.0, 9.0]);

        let mut by_name = source(&path, name("Depth (mm)"), name("Ti"));
        by_name.sheet = Some("XRF".to_string());
        assert_eq!(load_profile(&by_name).unwrap().values, p.values);
    }

    #[test]
    fn workbook_unknown_sheet_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(dir.path(), "core.xlsx");
        match load_table(&path, Some("LOI")) {
            Err(LoadError::SheetNotFound { sheet, .. }) => assert_eq!(sheet, "LOI"),
            other => panic!("expected SheetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn workbook_error_cells_read_as_missing() {
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::NA)), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::Div0)), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(
            cell_from_data(&Data::String("#N/A".into())),
            Cell::Text("#N/A".into())
        );
    }

    #[test]
    fn csv_columns_by_letter_with_na() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "age.csv",
            "MCD,b,c,d,e,Age\n0,,,,,2020\n10,,,,,NA\n20,,,,,2000\n",
        );
        let p = load_profile(&source(&path, letter("A"), letter("F"))).unwrap();
        assert_eq!(p.depth, vec![0.0, 10.0, 20.0]);
        assert_eq!(p.values[0], 2020.0);
        assert!(p.values[1].is_nan());
        assert_eq!(p.values[2], 2000.0);
        assert_eq!(p.source, path);
    }

    #[test]
    fn csv_columns_by_name_and_depth_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "ms.csv",
            "Core Pos. (cm),Raw Data\n0.5,12\n1.0,14\n",
        );
        let mut src = source(&path, name("Core Pos. (cm)"), name("Raw Data"));
        src.depth_scale = 10.0;
        let p = load_profile(&src).unwrap();
        assert_eq!(p.depth, vec![5.0, 10.0]);
        assert_eq!(p.values, vec![12.0, 14.0]);
    }

    #[test]
    fn non_numeric_cell_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "bad.csv", "depth,Ti\n0,5\n1,oops\n");
        let err = load_profile(&source(&path, name("depth"), name("Ti"))).unwrap_err();
        match &err {
            LoadError::Column {
                path: p,
                source: ColumnError::NotNumeric { row, .. },
            } => {
                assert_eq!(p, &path);
                assert_eq!(*row, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("bad.csv"));
    }

    #[test]
    fn parquet_columns_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xrf.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("depth", DataType::Float64, false),
            Field::new("Ti", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.0, 10.0, 20.0])),
                Arc::new(Int64Array::from(vec![Some(5), None, Some(9)])),
            ],
        )
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let p = load_profile(&source(&path, name("depth"), letter("B"))).unwrap();
        assert_eq!(p.depth, vec![0.0, 10.0, 20.0]);
        assert_eq!(p.values[0], 5.0);
        assert!(p.values[1].is_nan());
        assert_eq!(p.values[2], 9.0);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "core.txt", "a\n1\n");
        assert!(matches!(
            load_table(&path, None),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn missing_file_fails_before_reading_anything() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_csv(dir.path(), "age.csv", "MCD,Age\n0,2020\n");
        let missing = dir.path().join("NTG-mastercore-XRF.xlsx");

        let cfg = PlotConfig {
            figure: Default::default(),
            age_model: PanelConfig {
                source: Some(source(&good, letter("A"), letter("B"))),
                ..Default::default()
            },
            titanium: PanelConfig {
                source: Some(source(&missing, letter("C"), letter("N"))),
                ..Default::default()
            },
            extra_panels: vec![],
            age_scale: Default::default(),
            export: None,
            display: false,
        };

        match load_core(&cfg) {
            Err(LoadError::FileNotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn disabled_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let age = write_csv(dir.path(), "age.csv", "MCD,Age\n0,2020\n10,2010\n");
        let mut disabled = source(&dir.path().join("absent.csv"), letter("A"), letter("B"));
        disabled.enabled = false;

        let cfg = PlotConfig {
            figure: Default::default(),
            age_model: PanelConfig {
                source: Some(source(&age, letter("A"), letter("B"))),
                ..Default::default()
            },
            titanium: PanelConfig::default(),
            extra_panels: vec![PanelConfig {
                source: Some(disabled),
                ..Default::default()
            }],
            age_scale: Default::default(),
            export: None,
            display: false,
        };

        let ds = load_core(&cfg).unwrap();
        assert_eq!(ds.age_model.as_ref().map(Profile::len), Some(2));
        assert!(ds.titanium.is_none());
        assert_eq!(ds.extra.len(), 1);
        assert!(ds.extra[0].is_none());
    }
}
