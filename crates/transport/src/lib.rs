//! In-memory search transport.
//!
//! [`MemoryIndex`] implements [`marquee_searcher::SearchTransport`] over a
//! record set: prefix matching, facet and numeric filtering, disjunctive
//! faceting, pagination and highlighting. [`SearchClient`] groups named
//! indices, including the bundled `movies` and `actors` datasets.

mod client;
pub mod datasets;
mod error;
mod filter;
mod index;
mod matching;
mod settings;

pub use client::SearchClient;
pub use error::DatasetError;
pub use index::MemoryIndex;
pub use settings::{IndexSettings, SimulatedLatency};
