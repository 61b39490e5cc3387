//! qadesk-text
//!
//! Text-side building blocks of the retrieval core: the shared tokenizer, the
//! sentence chunker, vocabulary/IDF construction and the TF-IDF vectorizer.

pub mod chunker;
pub mod tokenize;
pub mod vectorizer;
pub mod vocabulary;

pub use chunker::{chunk_documents, Chunker};
pub use tokenize::Tokenizer;
pub use vectorizer::{cosine_similarity, l2_norm, Vectorizer};
pub use vocabulary::{BuiltVocabulary, IdfTable, Vocabulary, VocabularyBuilder};
