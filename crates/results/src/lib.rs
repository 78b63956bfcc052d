//! Result pages and their accumulation across pagination.
//!
//! A [`ResultPage`] is one transport response. A [`ResultAccumulator`]
//! merges the pages of one logical query; [`SearchResults`] is the
//! immutable snapshot handed to result handlers.

mod accumulator;
mod error;
mod facets;
pub mod highlight;
mod hit;
mod page;
mod results;

pub use accumulator::ResultAccumulator;
pub use error::{InvalidResponseError, SequenceError};
pub use facets::FacetValue;
pub use highlight::{Emphasis, HighlightResult, MatchLevel, SnippetResult, parse_emphasis};
pub use hit::{Hit, RankingInfo};
pub use page::{FacetCounts, Origin, ResultPage};
pub use results::SearchResults;
