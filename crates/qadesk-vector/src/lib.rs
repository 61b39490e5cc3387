//! qadesk-vector
//!
//! Index generations and retrieval: building an immutable [`Index`] from a chunk
//! corpus, persisting and loading it, holding the live generation behind an
//! atomic pointer, and ranking entries against a query.

pub mod index_build;
pub mod live;
pub mod persist;
pub mod search;

pub use index_build::{corpus_fingerprint, Index, IndexStatus, VectorEntry};
pub use live::LiveIndex;
pub use persist::{load, load_or_empty, persist, INDEX_FORMAT_VERSION};
pub use search::{Retrieval, Retriever};
