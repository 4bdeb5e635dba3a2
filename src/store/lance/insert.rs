// file: src/store/lance/insert.rs
// description: Arrow record batch construction for embedded chunks
// reference: https://docs.rs/arrow-array

use crate::error::{BackendError, BackendResult};
use crate::models::EmbeddedChunk;
use crate::store::lance::schema::chunk_schema;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt32Array,
    UInt64Array,
};
use arrow_schema::{ArrowError, Field, Schema};
use std::sync::Arc;

pub(crate) const BACKEND: &str = "lancedb";

pub(crate) type BatchReader =
    RecordBatchIterator<std::vec::IntoIter<std::result::Result<RecordBatch, ArrowError>>>;

/// Builds a single-batch reader; every record must share one dimensionality.
pub(crate) fn record_reader(records: &[EmbeddedChunk]) -> BackendResult<BatchReader> {
    let dim = records
        .first()
        .map(EmbeddedChunk::dimensions)
        .ok_or_else(|| BackendError::store(BACKEND, "cannot write an empty batch"))?;

    if let Some(bad) = records.iter().find(|r| r.dimensions() != dim) {
        return Err(BackendError::store(
            BACKEND,
            format!(
                "chunk {} has {} dimensions, batch uses {}",
                bad.chunk.chunk_id,
                bad.dimensions(),
                dim
            ),
        ));
    }

    let schema = chunk_schema(dim);
    let batch = create_record_batch(schema.clone(), records, dim)?;
    Ok(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema))
}

fn create_record_batch(
    schema: Arc<Schema>,
    records: &[EmbeddedChunk],
    dim: usize,
) -> BackendResult<RecordBatch> {
    let ids: StringArray = records
        .iter()
        .map(|r| Some(r.chunk.point_id()))
        .collect();

    let chunk_ids: UInt64Array = records.iter().map(|r| Some(r.chunk.chunk_id)).collect();

    let page_numbers: UInt32Array = records
        .iter()
        .map(|r| Some(r.chunk.page_number))
        .collect();

    let sources: StringArray = records
        .iter()
        .map(|r| Some(r.chunk.source.as_str()))
        .collect();

    let texts: StringArray = records
        .iter()
        .map(|r| Some(r.chunk.text.as_str()))
        .collect();

    let vector_values: Float32Array = records
        .iter()
        .flat_map(|r| r.vector.iter().copied())
        .collect();

    let item_field = Arc::new(Field::new("item", vector_values.data_type().clone(), true));
    let vectors = FixedSizeListArray::try_new(item_field, dim as i32, Arc::new(vector_values), None)
        .map_err(|e| BackendError::store(BACKEND, format!("Failed to create vector array: {}", e)))?;

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(ids),
            Arc::new(chunk_ids),
            Arc::new(page_numbers),
            Arc::new(sources),
            Arc::new(texts),
            Arc::new(vectors),
        ],
    )
    .map_err(|e| BackendError::store(BACKEND, format!("Failed to create record batch: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use arrow_array::RecordBatchReader;

    fn record(id: u64, vector: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk::new(Chunk::new(format!("text {}", id), 2, id, "doc.pdf"), vector)
    }

    #[test]
    fn test_record_reader_builds_one_batch() {
        let reader = record_reader(&[record(1, vec![0.1, 0.2]), record(2, vec![0.3, 0.4])]).unwrap();
        assert_eq!(reader.schema().fields().len(), 6);

        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 2);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(record_reader(&[]).is_err());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        assert!(record_reader(&[record(1, vec![0.1]), record(2, vec![0.1, 0.2])]).is_err());
    }
}
