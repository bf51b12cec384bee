//! Applying schemas to in-memory column data.
//!
//! The dispatch registry lives in [`column_conversion`]; this module wires it
//! to [`Schema`]: applying a schema to a `RecordBatch` coerces each column
//! toward the corresponding schema type and renames the columns to the
//! schema's names. Matching is positional, which is what makes the rename
//! useful: a batch with the right shape but wrong labels comes out carrying
//! the schema's labels.
//!
//! The input batch is never mutated. Arrow arrays are immutable and cheaply
//! shareable, so untouched columns are reused as-is in the output.

pub mod column_conversion;

pub use column_conversion::{
    convert_column, register_conversion, ColumnConversionFn, SourcePattern, TypeTag,
};

use arrow::record_batch::RecordBatch;
use arrow_schema::{Field, Schema as ArrowSchema};
use std::sync::Arc;

use crate::errors::SchemaError;
use crate::models::datatypes::ToArrowType;
use crate::models::schemas::Schema;

impl Schema {
    /// Coerces a record batch to this schema.
    ///
    /// Columns are matched by position and must match in count. A column is
    /// converted when its Arrow type differs from the schema type's
    /// rendering, when the schema type cannot be rendered at all (the
    /// comparison is then conservatively treated as a mismatch and the
    /// conversion attempt reports the real problem), or when the target is a
    /// string type. Output columns carry the schema's names and nullability.
    pub fn apply_to(&self, batch: &RecordBatch) -> Result<RecordBatch, SchemaError> {
        if batch.num_columns() != self.len() {
            return Err(SchemaError::ColumnCountMismatch {
                expected: self.len(),
                actual: batch.num_columns(),
            });
        }

        let mut columns = Vec::with_capacity(self.len());
        for (position, dtype) in self.types().iter().enumerate() {
            let column = batch.column(position);
            let differs = match dtype.to_arrow_type() {
                Ok(arrow_type) => &arrow_type != column.data_type(),
                Err(_) => true,
            };
            if differs || dtype.is_string() {
                columns.push(convert_column(column, dtype)?);
            } else {
                columns.push(Arc::clone(column));
            }
        }

        let fields: Vec<Field> = self
            .iter()
            .zip(columns.iter())
            .map(|((name, dtype), column)| {
                Field::new(name, column.data_type().clone(), dtype.nullable())
            })
            .collect();
        let arrow_schema = Arc::new(ArrowSchema::new(fields));
        Ok(RecordBatch::try_new(arrow_schema, columns)?)
    }
}
