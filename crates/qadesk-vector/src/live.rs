//! The live index reference.
//!
//! Readers take a snapshot (`Arc<Index>`) with one atomic load and keep using
//! it for the whole query, even if a rebuild publishes a newer generation in
//! the meantime. Rebuilds are serialized; a build runs to completion before
//! the swap.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use tracing::info;

use qadesk_core::types::DocumentChunk;
use qadesk_text::VocabularyBuilder;

use crate::index_build::Index;

pub struct LiveIndex {
    current: ArcSwap<Index>,
    writer: Mutex<()>,
}

impl Default for LiveIndex {
    fn default() -> Self {
        Self::new(Index::empty())
    }
}

impl LiveIndex {
    pub fn new(index: Index) -> Self {
        Self { current: ArcSwap::from_pointee(index), writer: Mutex::new(()) }
    }

    pub fn snapshot(&self) -> Arc<Index> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    /// Swap in an already-built index as-is.
    pub fn publish(&self, index: Index) -> Arc<Index> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        self.swap_in(index)
    }

    /// Build a new generation (current + 1) from `chunks` and publish it.
    pub fn rebuild(&self, chunks: Vec<DocumentChunk>, builder: &VocabularyBuilder) -> Arc<Index> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let next = self.current.load().generation() + 1;
        self.swap_in(Index::build(next, chunks, builder))
    }

    fn swap_in(&self, index: Index) -> Arc<Index> {
        let index = Arc::new(index);
        let previous = self.current.swap(Arc::clone(&index));
        info!(from = previous.generation(), to = index.generation(), chunks = index.len(), "published index generation");
        index
    }
}
