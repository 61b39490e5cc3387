//! qadesk-core
//!
//! Shared vocabulary of the question desk: documents, chunks, retrieval
//! results, the closed [`Strategy`](types::Strategy) enum, the error type,
//! configuration, and the contracts of the external collaborators.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;
