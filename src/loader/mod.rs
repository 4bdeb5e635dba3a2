// file: src/loader/mod.rs
// description: document loading module exports
// reference: internal module structure

pub mod pdf;

pub use pdf::PdfLoader;
