//! Document loading and text splitting for the ingestion pipeline.

pub mod loader;
pub mod splitter;

pub use loader::{load, RawSegment};
pub use splitter::{RecursiveSplitter, TextChunk};
