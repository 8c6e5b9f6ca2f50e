//! Attribute table storage (Arrow/Parquet)
//!
//! The offline extraction step hands its output to the training process as a
//! columnar table with one row per cropped annotation:
//!
//! ```text
//! crop_ref: Utf8 | label: Utf8 | length_norm: Float64 | slope_deg: Float64
//! curv_deg: Float64 | breaks: UInt32 | x1, y1, x2, y2: UInt32
//! ```
//!
//! Write pattern is whole-table: a table is built from a finished extraction
//! and written once.

use crate::dataset::AttributeRecord;
use crate::geometry::{BoundingBox, CurveType};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// In-memory attribute table with Arrow/Parquet conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTable {
    records: Vec<AttributeRecord>,
}

impl AttributeTable {
    /// Wrap extracted records.
    #[must_use]
    pub const fn new(records: Vec<AttributeRecord>) -> Self {
        Self { records }
    }

    /// All rows.
    #[must_use]
    pub fn records(&self) -> &[AttributeRecord] {
        &self.records
    }

    /// Take ownership of the rows.
    #[must_use]
    pub fn into_records(self) -> Vec<AttributeRecord> {
        self.records
    }

    /// Row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Arrow schema of the table.
    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("crop_ref", DataType::Utf8, false),
            Field::new("label", DataType::Utf8, false),
            Field::new("length_norm", DataType::Float64, false),
            Field::new("slope_deg", DataType::Float64, false),
            Field::new("curv_deg", DataType::Float64, false),
            Field::new("breaks", DataType::UInt32, false),
            Field::new("x1", DataType::UInt32, false),
            Field::new("y1", DataType::UInt32, false),
            Field::new("x2", DataType::UInt32, false),
            Field::new("y2", DataType::UInt32, false),
        ]))
    }

    /// Convert to a single record batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Arrow`] if the batch cannot be assembled.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let r = &self.records;
        let u32_col = |f: fn(&AttributeRecord) -> u32| -> ArrayRef {
            Arc::new(UInt32Array::from_iter_values(r.iter().map(f)))
        };
        let f64_col = |f: fn(&AttributeRecord) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(r.iter().map(f)))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(r.iter().map(|x| x.crop_ref.as_str()))),
            Arc::new(StringArray::from_iter_values(r.iter().map(|x| x.label.as_str()))),
            f64_col(|x| x.length_norm),
            f64_col(|x| x.slope_deg),
            f64_col(|x| x.curv_deg),
            u32_col(|x| x.breaks),
            u32_col(|x| x.crop.x1),
            u32_col(|x| x.crop.y1),
            u32_col(|x| x.crop.x2),
            u32_col(|x| x.crop.y2),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    /// Parse rows out of a record batch with this table's schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageError`] if a column is missing, has the wrong
    /// type or holds nulls, and [`Error::InvalidCategory`] for an unknown
    /// label.
    pub fn records_from_batch(batch: &RecordBatch) -> Result<Vec<AttributeRecord>> {
        let crop_ref = column::<StringArray>(batch, "crop_ref")?;
        let label = column::<StringArray>(batch, "label")?;
        let length_norm = column::<Float64Array>(batch, "length_norm")?;
        let slope_deg = column::<Float64Array>(batch, "slope_deg")?;
        let curv_deg = column::<Float64Array>(batch, "curv_deg")?;
        let breaks = column::<UInt32Array>(batch, "breaks")?;
        let x1 = column::<UInt32Array>(batch, "x1")?;
        let y1 = column::<UInt32Array>(batch, "y1")?;
        let x2 = column::<UInt32Array>(batch, "x2")?;
        let y2 = column::<UInt32Array>(batch, "y2")?;

        (0..batch.num_rows())
            .map(|i| -> Result<AttributeRecord> {
                Ok(AttributeRecord {
                    crop_ref: crop_ref.value(i).to_string(),
                    label: label.value(i).parse::<CurveType>()?,
                    length_norm: length_norm.value(i),
                    slope_deg: slope_deg.value(i),
                    curv_deg: curv_deg.value(i),
                    breaks: breaks.value(i),
                    crop: BoundingBox {
                        x1: x1.value(i),
                        y1: y1.value(i),
                        x2: x2.value(i),
                        y2: y2.value(i),
                    },
                })
            })
            .collect()
    }

    /// Write the table as a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created and
    /// [`Error::Parquet`] if writing fails.
    pub fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use parquet::arrow::ArrowWriter;

        let path = path.as_ref();
        let batch = self.to_record_batch()?;
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, Self::schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        info!(path = %path.display(), rows = self.len(), "wrote attribute table");
        Ok(())
    }

    /// Load a table from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageError`] if the file cannot be opened or parsed,
    /// or any error of [`records_from_batch`](Self::records_from_batch).
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let file = File::open(path.as_ref()).map_err(|e| {
            Error::StorageError(format!("Failed to open Parquet file: {e}"))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse Parquet file: {e}"))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            records.extend(Self::records_from_batch(&batch)?);
        }

        Ok(Self { records })
    }
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| Error::StorageError(format!("missing column {name}")))?;
    if array.null_count() > 0 {
        return Err(Error::StorageError(format!("column {name} contains nulls")));
    }
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| {
            Error::StorageError(format!(
                "column {name} has unexpected type {:?}",
                array.data_type()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(crop_ref: &str, label: CurveType, breaks: u32) -> AttributeRecord {
        AttributeRecord {
            crop_ref: crop_ref.to_string(),
            label,
            length_norm: 0.5,
            slope_deg: -12.25,
            curv_deg: 9.5,
            breaks,
            crop: BoundingBox {
                x1: 1,
                y1: 2,
                x2: 30,
                y2: 40,
            },
        }
    }

    #[test]
    fn test_schema_columns() {
        let schema = AttributeTable::schema();
        assert_eq!(schema.fields().len(), 10);
        assert_eq!(schema.field(0).name(), "crop_ref");
        assert_eq!(schema.field(5).data_type(), &DataType::UInt32);
    }

    #[test]
    fn test_batch_conversion_preserves_rows() {
        let table = AttributeTable::new(vec![
            record("life/1_1.jpg", CurveType::Life, 0),
            record("fate/1_2.jpg", CurveType::Fate, 3),
        ]);
        let batch = table.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        let back = AttributeTable::records_from_batch(&batch).unwrap();
        assert_eq!(back, table.records());
    }

    #[test]
    fn test_empty_table_batch() {
        let batch = AttributeTable::default().to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert!(AttributeTable::records_from_batch(&batch).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_rejected() {
        let schema = Arc::new(Schema::new(vec![Field::new("crop_ref", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["x"])) as ArrayRef],
        )
        .unwrap();
        let err = AttributeTable::records_from_batch(&batch).unwrap_err();
        assert!(matches!(err, Error::StorageError(ref m) if m.contains("label")));
    }
}
