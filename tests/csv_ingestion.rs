use std::collections::BTreeMap;
use std::fs::File;

use padded_csv_upload::UploadError;
use padded_csv_upload::ingestion::csv::{CsvReadOptions, read_csv, read_csv_records};
use padded_csv_upload::types::{DataType, Value};

fn people_options() -> CsvReadOptions {
    CsvReadOptions {
        dtypes: BTreeMap::from([
            ("id".to_string(), DataType::Int64),
            ("score".to_string(), DataType::Float64),
            ("active".to_string(), DataType::Bool),
        ]),
        ..Default::default()
    }
}

#[test]
fn read_csv_from_file_happy_path() {
    let file = File::open("tests/fixtures/people.csv").unwrap();
    let ds = read_csv(file, &people_options()).unwrap();

    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
        ]
    );
}

#[test]
fn unhinted_columns_are_text() {
    let ds = read_csv("id,name\n1,Ada\n".as_bytes(), &CsvReadOptions::default()).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
    assert_eq!(ds.rows[0][0], Value::Utf8("1".to_string()));
}

#[test]
fn hints_for_absent_columns_are_ignored() {
    let input = "name\nAda\n";
    let ds = read_csv(input.as_bytes(), &people_options()).unwrap();
    assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), vec!["name"]);
}

#[test]
fn empty_cells_and_null_tokens_are_null() {
    let options = CsvReadOptions {
        null_values: vec!["NA".to_string()],
        ..people_options()
    };
    let input = "id,name,score,active\n1,,NA, \n";
    let ds = read_csv(input.as_bytes(), &options).unwrap();
    assert_eq!(ds.rows[0], vec![Value::Int64(1), Value::Null, Value::Null, Value::Null]);
}

#[test]
fn custom_delimiter_and_existing_reader() {
    let input = "id;name\n7;Ada\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let ds = read_csv_records(&mut rdr, &people_options()).unwrap();
    assert_eq!(ds.rows[0][0], Value::Int64(7));
}

#[test]
fn empty_input_has_no_columns() {
    let ds = read_csv("".as_bytes(), &CsvReadOptions::default()).unwrap();
    assert!(ds.schema.is_empty());
    assert_eq!(ds.row_count(), 0);
}

#[test]
fn read_csv_errors_on_type_parse() {
    let input = "id,name,score,active\nnot_an_int,Ada,98.5,true\n";
    let err = read_csv(input.as_bytes(), &people_options()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to parse value at row 2"));
    assert!(msg.contains("column 'id'"));
}

#[test]
fn ragged_rows_are_tokenizer_errors() {
    let err = read_csv("a,b\n1,2,3\n".as_bytes(), &CsvReadOptions::default()).unwrap_err();
    assert!(matches!(err, UploadError::Csv(_)));
}

#[test]
fn non_ascii_delimiter_is_config_error() {
    let options = CsvReadOptions {
        delimiter: '§',
        ..Default::default()
    };
    let err = read_csv("a\n1\n".as_bytes(), &options).unwrap_err();
    assert!(matches!(err, UploadError::Config { .. }));
}
