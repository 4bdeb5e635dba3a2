// file: src/store/lance/client.rs
// description: LanceDB connection wrapper implementing the vector store contract
// reference: https://docs.rs/lancedb

use crate::error::{BackendError, BackendResult};
use crate::models::{Chunk, EmbeddedChunk, ScoredChunk};
use crate::store::lance::insert::{BACKEND, record_reader};
use crate::store::lance::schema::{DISTANCE_COLUMN, VECTOR_COLUMN};
use crate::store::{VectorStore, rank_by_score};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt32Array, UInt64Array};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Clone)]
pub struct LanceDbStore {
    connection: Connection,
}

impl LanceDbStore {
    pub async fn connect(uri: &str) -> BackendResult<Self> {
        info!("Connecting to LanceDB at {}", uri);

        let connection = connect(uri).execute().await.map_err(|e| {
            BackendError::store(BACKEND, format!("Failed to connect to LanceDB: {}", e))
        })?;

        Ok(Self { connection })
    }

    async fn open(&self, name: &str) -> BackendResult<Table> {
        self.connection
            .open_table(name)
            .execute()
            .await
            .map_err(|e| BackendError::store(BACKEND, format!("Failed to open table {}: {}", name, e)))
    }
}

fn column<'b, A: Array + 'static>(batch: &'b RecordBatch, name: &str) -> BackendResult<&'b A> {
    batch
        .column_by_name(name)
        .ok_or_else(|| BackendError::store(BACKEND, format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| BackendError::store(BACKEND, format!("Invalid '{}' column type", name)))
}

fn batch_to_hits(batch: &RecordBatch) -> BackendResult<Vec<ScoredChunk>> {
    let chunk_ids = column::<UInt64Array>(batch, "chunk_id")?;
    let page_numbers = column::<UInt32Array>(batch, "page_number")?;
    let sources = column::<StringArray>(batch, "source")?;
    let texts = column::<StringArray>(batch, "text")?;

    let distances = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let hits = (0..batch.num_rows())
        .map(|i| {
            let chunk = Chunk::new(
                texts.value(i),
                page_numbers.value(i),
                chunk_ids.value(i),
                sources.value(i),
            );

            match distances {
                // lower distance = higher similarity
                Some(dist) => {
                    let d = dist.value(i);
                    ScoredChunk::scored(chunk, 1.0 / (1.0 + d), Some(d))
                }
                None => ScoredChunk::scored(chunk, 1.0, None),
            }
        })
        .collect();

    Ok(hits)
}

#[async_trait]
impl VectorStore for LanceDbStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn list_collections(&self) -> BackendResult<HashSet<String>> {
        let names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| BackendError::store(BACKEND, format!("Failed to list tables: {}", e)))?;

        Ok(names.into_iter().collect())
    }

    async fn create_and_populate(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()> {
        let reader = record_reader(records)?;

        self.connection
            .create_table(name, reader)
            .execute()
            .await
            .map_err(|e| {
                BackendError::store(BACKEND, format!("Failed to create table {}: {}", name, e))
            })?;

        info!("Created table {} with {} rows", name, records.len());
        Ok(())
    }

    async fn append(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()> {
        let reader = record_reader(records)?;
        let table = self.open(name).await?;

        table.add(reader).execute().await.map_err(|e| {
            BackendError::store(BACKEND, format!("Failed to append to table {}: {}", name, e))
        })?;

        debug!("Appended {} rows to {}", records.len(), name);
        Ok(())
    }

    async fn similarity_search(
        &self,
        name: &str,
        query: &[f32],
        k: usize,
    ) -> BackendResult<Vec<ScoredChunk>> {
        let table = self.open(name).await?;

        let mut results_stream = table
            .vector_search(query.to_vec())
            .map_err(|e| {
                BackendError::store(BACKEND, format!("Failed to create vector search: {}", e))
            })?
            .column(VECTOR_COLUMN)
            .limit(k)
            .execute()
            .await
            .map_err(|e| BackendError::store(BACKEND, format!("Vector search failed: {}", e)))?;

        let mut hits = Vec::new();
        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result.map_err(|e| {
                BackendError::store(BACKEND, format!("Failed to read result batch: {}", e))
            })?;
            hits.extend(batch_to_hits(&batch)?);
        }

        rank_by_score(&mut hits);
        hits.truncate(k);

        debug!("Vector search on {} returned {} hits", name, hits.len());
        Ok(hits)
    }

    async fn count(&self, name: &str) -> BackendResult<usize> {
        if !self.list_collections().await?.contains(name) {
            return Ok(0);
        }

        let table = self.open(name).await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| BackendError::store(BACKEND, format!("Failed to count rows: {}", e)))
    }
}
