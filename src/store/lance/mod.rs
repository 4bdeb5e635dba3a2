// file: src/store/lance/mod.rs
// description: LanceDB-backed vector store exports
// reference: internal module structure

pub mod client;
pub mod insert;
pub mod schema;

pub use client::LanceDbStore;
