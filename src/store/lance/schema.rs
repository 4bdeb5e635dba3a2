// file: src/store/lance/schema.rs
// description: Arrow schema for embedded chunk tables
// reference: https://docs.rs/lancedb

use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const VECTOR_COLUMN: &str = "vector";
pub const DISTANCE_COLUMN: &str = "_distance";

/// One row per chunk: identity, provenance, text and its embedding.
pub fn chunk_schema(embedding_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("chunk_id", DataType::UInt64, false),
        Field::new("page_number", DataType::UInt32, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                embedding_dim as i32,
            ),
            false,
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema = chunk_schema(384);
        assert_eq!(schema.fields().len(), 6);

        let vector_field = schema.field_with_name(VECTOR_COLUMN).unwrap();
        assert!(matches!(
            vector_field.data_type(),
            DataType::FixedSizeList(_, 384)
        ));
    }
}
