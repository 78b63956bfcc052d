//! Search intent value types for marquee.
//!
//! [`QuerySpec`] is the value a searcher snapshots on every request. Facet
//! refinements live in a [`FacetRefinementSet`], which knows how to encode
//! itself into the transport's nested facet filter list.

pub mod error;
pub mod numeric;
pub mod refinement;
pub mod refinement_set;
pub mod spec;

pub use error::{QueryError, Result};
pub use numeric::{NumericOp, NumericRefinement};
pub use refinement::FacetRefinement;
pub use refinement_set::{FacetFilter, FacetRefinementSet, FilterTerm};
pub use spec::QuerySpec;
