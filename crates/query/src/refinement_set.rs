//! Ordered facet refinements with conjunctive/disjunctive grouping.
//!
//! Refinements added in a facet's current mode become standalone AND-terms
//! on a conjunctive facet and join the facet's OR-group on a disjunctive one.
//! The set owns which facet names are disjunctive so that mode switches can
//! migrate the existing refinements between the two representations.
//!
//! `add_refinement(_, true)` groups regardless of the facet's mode, so a
//! conjunctive facet may still carry an OR-group. Such a group is kept until
//! the next mode switch for that facet.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::refinement::FacetRefinement;

/// One AND-term of the conjunctive filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterTerm {
	/// A standalone refinement.
	Single(FacetRefinement),
	/// Refinements on one facet, any of which may match.
	AnyOf {
		/// Facet name shared by every refinement of the group.
		name: String,
		/// Group members in insertion order.
		refinements: Vec<FacetRefinement>,
	},
}

impl FilterTerm {
	/// Facet this term constrains.
	pub fn facet_name(&self) -> &str {
		match self {
			Self::Single(refinement) => &refinement.name,
			Self::AnyOf { name, .. } => name,
		}
	}

	/// Refinements of the term; one for a standalone refinement.
	pub fn refinements(&self) -> &[FacetRefinement] {
		match self {
			Self::Single(refinement) => std::slice::from_ref(refinement),
			Self::AnyOf { refinements, .. } => refinements,
		}
	}
}

/// Wire form of one conjunctive filter item, as sent to the transport.
///
/// Serializes untagged: a string for a single filter, an array for an OR-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetFilter {
	/// One encoded refinement.
	Term(String),
	/// Encoded refinements combined with OR.
	AnyOf(Vec<String>),
}

/// Facet refinements of one query, plus the facets that combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetRefinementSet {
	terms: Vec<FilterTerm>,
	disjunctive: BTreeSet<String>,
}

impl FacetRefinementSet {
	/// Creates an empty set with every facet conjunctive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when no refinement is present.
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Returns the AND-terms in order.
	pub fn terms(&self) -> &[FilterTerm] {
		&self.terms
	}

	/// Iterates every refinement, flattening OR-groups.
	pub fn iter(&self) -> impl Iterator<Item = &FacetRefinement> {
		self.terms.iter().flat_map(FilterTerm::refinements)
	}

	/// Facet names that currently use OR semantics.
	pub fn disjunctive_facets(&self) -> &BTreeSet<String> {
		&self.disjunctive
	}

	/// Returns true when `name` uses OR semantics.
	pub fn is_disjunctive(&self, name: &str) -> bool {
		self.disjunctive.contains(name)
	}

	/// Adds a refinement unless an identical one is already present.
	///
	/// Refinements on a disjunctive facet, or any refinement when
	/// `disjunctive_always` is set, join that facet's OR-group; others are
	/// appended as standalone AND-terms.
	pub fn add_refinement(&mut self, refinement: FacetRefinement, disjunctive_always: bool) {
		if self.iter().any(|existing| *existing == refinement) {
			return;
		}

		if disjunctive_always || self.is_disjunctive(&refinement.name) {
			let group = self.terms.iter_mut().find_map(|term| match term {
				FilterTerm::AnyOf { name, refinements } if *name == refinement.name => Some(refinements),
				_ => None,
			});
			match group {
				Some(refinements) => refinements.push(refinement),
				None => self.terms.push(FilterTerm::AnyOf {
					name: refinement.name.clone(),
					refinements: vec![refinement],
				}),
			}
		} else {
			self.terms.push(FilterTerm::Single(refinement));
		}
	}

	/// Removes the first refinement on `(name, value)`. No-op when absent.
	///
	/// Returns true when something was removed. OR-groups left empty are dropped.
	pub fn remove_refinement(&mut self, name: &str, value: &str) -> bool {
		for i in 0..self.terms.len() {
			match &mut self.terms[i] {
				FilterTerm::Single(refinement) if refinement.targets(name, value) => {
					self.terms.remove(i);
					return true;
				}
				FilterTerm::AnyOf { refinements, .. } => {
					if let Some(pos) = refinements.iter().position(|r| r.targets(name, value)) {
						refinements.remove(pos);
						if refinements.is_empty() {
							self.terms.remove(i);
						}
						return true;
					}
				}
				FilterTerm::Single(_) => {}
			}
		}
		false
	}

	/// Returns true when a refinement on `(name, value)` is present.
	pub fn has_refinement(&self, name: &str, value: &str) -> bool {
		self.iter().any(|refinement| refinement.targets(name, value))
	}

	/// Removes `(name, value)` if present, else adds it inclusively in the facet's current mode.
	///
	/// Returns true when the refinement is present afterwards.
	pub fn toggle_refinement(&mut self, name: &str, value: &str) -> bool {
		if self.remove_refinement(name, value) {
			false
		} else {
			self.add_refinement(FacetRefinement::new(name, value), false);
			true
		}
	}

	/// Switches `name` between AND and OR semantics, migrating its refinements.
	///
	/// Switching to OR collapses the facet's AND-terms into one OR-group at the
	/// position of its first term. Switching to AND expands every OR-group of
	/// the facet in place. Values are neither lost nor duplicated.
	pub fn set_facet_mode(&mut self, name: &str, disjunctive: bool) {
		if disjunctive {
			self.disjunctive.insert(name.to_string());
			self.collapse_into_group(name);
		} else {
			self.disjunctive.remove(name);
			self.expand_groups(name);
		}
	}

	fn collapse_into_group(&mut self, name: &str) {
		let Some(anchor) = self.terms.iter().position(|term| term.facet_name() == name) else {
			return;
		};

		let mut merged: Vec<FacetRefinement> = Vec::new();
		let mut kept = Vec::with_capacity(self.terms.len());
		for term in self.terms.drain(..) {
			if term.facet_name() != name {
				kept.push(term);
				continue;
			}
			for refinement in term.refinements() {
				if !merged.contains(refinement) {
					merged.push(refinement.clone());
				}
			}
		}

		let insert_at = anchor.min(kept.len());
		kept.insert(
			insert_at,
			FilterTerm::AnyOf {
				name: name.to_string(),
				refinements: merged,
			},
		);
		self.terms = kept;
	}

	fn expand_groups(&mut self, name: &str) {
		let mut expanded: Vec<FilterTerm> = Vec::with_capacity(self.terms.len());
		for term in self.terms.drain(..) {
			match term {
				FilterTerm::AnyOf { name: group, refinements } if group == name => {
					for refinement in refinements {
						let duplicate = expanded.iter().any(|t| matches!(t, FilterTerm::Single(r) if *r == refinement));
						if !duplicate {
							expanded.push(FilterTerm::Single(refinement));
						}
					}
				}
				other => expanded.push(other),
			}
		}
		self.terms = expanded;
	}

	/// Flattens every refinement into `facet name -> values`, ignoring grouping.
	///
	/// This is the shape disjunctive-faceting transports take, and the shape
	/// used to keep refined values visible in facet listings.
	pub fn build_filter_refinement_map(&self) -> BTreeMap<String, Vec<String>> {
		let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for refinement in self.iter() {
			map.entry(refinement.name.clone()).or_default().push(refinement.value.clone());
		}
		map
	}

	/// Encodes the set into the transport's nested facet filter list.
	pub fn to_facet_filters(&self) -> Vec<FacetFilter> {
		self.terms
			.iter()
			.map(|term| match term {
				FilterTerm::Single(refinement) => FacetFilter::Term(refinement.encode()),
				FilterTerm::AnyOf { refinements, .. } => FacetFilter::AnyOf(refinements.iter().map(FacetRefinement::encode).collect()),
			})
			.collect()
	}

	/// Decodes a nested facet filter list.
	///
	/// Every facet appearing inside an OR-group is marked disjunctive.
	pub fn from_facet_filters(filters: &[FacetFilter]) -> Result<Self> {
		let mut set = Self::new();
		for filter in filters {
			match filter {
				FacetFilter::Term(encoded) => set.add_refinement(FacetRefinement::parse(encoded)?, false),
				FacetFilter::AnyOf(encoded) => {
					for item in encoded {
						let refinement = FacetRefinement::parse(item)?;
						set.disjunctive.insert(refinement.name.clone());
						set.add_refinement(refinement, true);
					}
				}
			}
		}
		Ok(set)
	}
}

#[cfg(test)]
mod tests;
