use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use padded_csv_upload::UploadError;
use padded_csv_upload::ingestion::csv::{CsvReadOptions, read_csv};
use padded_csv_upload::padded::{HeaderLength, padded_csv_lines, padded_csv_reader};
use padded_csv_upload::source::CsvSource;
use padded_csv_upload::types::{DataType, Value};

fn tmp_file(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("padded-csv-upload-{tag}-{nanos}.csv"))
}

fn region_lines(input: &[&str], header_length: HeaderLength) -> Result<Vec<String>, UploadError> {
    let text: String = input.iter().map(|l| format!("{l}\n")).collect();
    let lines = padded_csv_lines(Cursor::new(text), header_length)?;
    Ok(lines
        .map(|l| String::from_utf8(l.unwrap()).unwrap().trim_end().to_string())
        .collect())
}

fn amount_options() -> CsvReadOptions {
    CsvReadOptions {
        dtypes: BTreeMap::from([
            ("id".to_string(), DataType::Int64),
            ("amount".to_string(), DataType::Float64),
        ]),
        ..Default::default()
    }
}

#[test]
fn auto_region_between_banner_and_trailer() {
    let out = region_lines(&["banner", "", "", "h1,h2", "1,2", ""], HeaderLength::Auto).unwrap();
    assert_eq!(out, vec!["h1,h2", "1,2"]);
}

#[test]
fn auto_single_blank_line_is_not_a_separator() {
    let err = region_lines(&["banner", "", "h1,h2", "1,2"], HeaderLength::Auto).unwrap_err();
    assert!(matches!(err, UploadError::DataRegionNotFound { .. }));
}

#[test]
fn fixed_region_skips_exact_count() {
    let out = region_lines(&["x", "y", "h1,h2", "1,2", ""], HeaderLength::Fixed(2)).unwrap();
    assert_eq!(out, vec!["h1,h2", "1,2"]);

    let out = region_lines(&["x", "y", "h1,h2"], HeaderLength::Fixed(10)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn banner_fixture_parses_only_the_table() {
    let file = File::open("tests/fixtures/padded/banner_report.csv").unwrap();
    let reader = padded_csv_reader(BufReader::new(file), HeaderLength::Auto).unwrap();
    let ds = read_csv(reader, &amount_options()).unwrap();

    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["id", "name", "amount"]);
    assert_eq!(ds.row_count(), 3);
    assert_eq!(ds.rows[1], vec![Value::Int64(2), Value::Utf8("Grace".to_string()), Value::Float64(20.0)]);
    assert_eq!(ds.rows[2][2], Value::Null);
}

#[test]
fn fixed_fixture_through_csv_source() {
    let source = CsvSource {
        path: PathBuf::from("tests/fixtures/padded/fixed_header.csv"),
        header_length: HeaderLength::Fixed(3),
        remap: BTreeMap::new(),
    };
    let ds = read_csv(source.open().unwrap(), &amount_options()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::Int64(4));
    assert_eq!(ds.rows[1][1], Value::Utf8("Edsger".to_string()));
}

#[test]
fn single_gap_fixture_fails_in_auto_mode() {
    let source = CsvSource {
        path: PathBuf::from("tests/fixtures/padded/single_gap.csv"),
        header_length: HeaderLength::Auto,
        remap: BTreeMap::new(),
    };
    let err = source.open().unwrap_err();
    assert!(matches!(err, UploadError::DataRegionNotFound { lines_scanned: 4 }));
}

#[test]
fn crlf_files_behave_like_lf_files() {
    let path = tmp_file("crlf");
    fs::write(&path, "Title\r\n\r\n\"\",\"\"\r\nid,name\r\n1,Ada\r\n\r\nnotes\r\n").unwrap();

    let mut reader = padded_csv_reader(BufReader::new(File::open(&path).unwrap()), HeaderLength::Auto).unwrap();
    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    assert_eq!(text, "id,name\r\n1,Ada\r\n");

    let _ = fs::remove_file(&path);
}

#[test]
fn quoted_values_keep_embedded_commas() {
    let input = "Report\n\n\nid,label\n1,\"a, b\"\n";
    let reader = padded_csv_reader(Cursor::new(input), HeaderLength::Auto).unwrap();
    let ds = read_csv(reader, &CsvReadOptions::default()).unwrap();
    assert_eq!(ds.rows[0][1], Value::Utf8("a, b".to_string()));
}
