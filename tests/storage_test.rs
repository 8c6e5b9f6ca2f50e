//! Parquet persistence of the attribute table

use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use palmline::dataset::{extract_records, CocoDataset};
use palmline::geometry::GeometryExtractor;
use palmline::storage::AttributeTable;
use palmline::Error;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::sync::Arc;

fn sample_table() -> AttributeTable {
    let dataset = CocoDataset::from_json_str(
        r#"{
        "images": [ { "id": 3, "file_name": "h.jpg", "width": 320, "height": 240 } ],
        "categories": [ { "id": 1, "name": "fate" }, { "id": 2, "name": "heart" } ],
        "annotations": [
            { "id": 1, "image_id": 3, "category_id": 1, "segmentation": [[160, 230, 158, 150]] },
            { "id": 2, "image_id": 3, "category_id": 1, "segmentation": [[157, 140, 150, 60]] },
            { "id": 3, "image_id": 3, "category_id": 2,
              "segmentation": [[40, 80, 100, 70, 170, 75, 240, 95]] }
        ]
    }"#,
    )
    .unwrap();
    AttributeTable::new(extract_records(&dataset, &GeometryExtractor::default()).unwrap())
}

#[test]
fn test_parquet_roundtrip() {
    let table = sample_table();
    assert_eq!(table.len(), 3);

    let path = "/tmp/palmline_storage_roundtrip.parquet";
    table.write_parquet(path).unwrap();
    let loaded = AttributeTable::load_parquet(path).unwrap();
    std::fs::remove_file(path).ok();

    assert_eq!(loaded, table);
    assert_eq!(loaded.records()[0].breaks, 1);
    assert_eq!(loaded.records()[2].crop_ref, "heart/3_3.jpg");
}

#[test]
fn test_empty_table_roundtrip() {
    let path = "/tmp/palmline_storage_empty.parquet";
    AttributeTable::default().write_parquet(path).unwrap();
    let loaded = AttributeTable::load_parquet(path).unwrap();
    std::fs::remove_file(path).ok();
    assert!(loaded.is_empty());
}

#[test]
fn test_record_batch_columns() {
    let batch = sample_table().to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 10);
    assert_eq!(batch.schema(), AttributeTable::schema());
    assert_eq!(AttributeTable::records_from_batch(&batch).unwrap(), sample_table().into_records());
}

#[test]
fn test_load_missing_file() {
    let err = AttributeTable::load_parquet("/tmp/palmline_does_not_exist.parquet").unwrap_err();
    assert!(matches!(err, Error::StorageError(ref m) if m.contains("Failed to open")));
}

#[test]
fn test_load_foreign_schema() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("crop_ref", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["life/1_1.jpg"])) as ArrayRef,
            Arc::new(Float64Array::from(vec![0.5])) as ArrayRef,
        ],
    )
    .unwrap();

    let path = "/tmp/palmline_storage_foreign.parquet";
    let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let err = AttributeTable::load_parquet(path).unwrap_err();
    std::fs::remove_file(path).ok();
    assert!(matches!(err, Error::StorageError(ref m) if m.contains("label")));
}
