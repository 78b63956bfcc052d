//! Query specification: the value describing one search intent.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::numeric::{NumericOp, NumericRefinement};
use crate::refinement::FacetRefinement;
use crate::refinement_set::FacetRefinementSet;

/// One search intent.
///
/// `QuerySpec` is a plain value: cloning it yields an independent snapshot,
/// so a spec captured when a request is issued never observes later edits.
///
/// Two specs express the same intent when everything but `page` matches;
/// see [`Self::same_intent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
	/// Free-text query.
	pub text: String,
	/// Facet refinements, including which facets are disjunctive.
	pub filters: FacetRefinementSet,
	/// Range/threshold filters, in insertion order.
	pub numeric_refinements: Vec<NumericRefinement>,
	/// Page size requested from the transport. `None` uses the transport default.
	pub hits_per_page: Option<usize>,
	/// Starting page of a new query. `None` means page 0.
	pub page: Option<usize>,
}

impl QuerySpec {
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			..Self::default()
		}
	}

	/// First page requested when this spec starts a new query.
	pub fn initial_page(&self) -> usize {
		self.page.unwrap_or(0)
	}

	/// Returns true when both specs describe the same intent, ignoring `page`.
	pub fn same_intent(&self, other: &Self) -> bool {
		self.text == other.text
			&& self.filters == other.filters
			&& self.numeric_refinements == other.numeric_refinements
			&& self.hits_per_page == other.hits_per_page
	}

	/// Facet names using OR semantics.
	pub fn disjunctive_facets(&self) -> &BTreeSet<String> {
		self.filters.disjunctive_facets()
	}

	/// Adds a facet refinement in the facet's current mode.
	pub fn add_refinement(&mut self, refinement: FacetRefinement) {
		self.filters.add_refinement(refinement, false);
	}

	/// Switches a facet between AND and OR semantics.
	pub fn set_facet_mode(&mut self, name: &str, disjunctive: bool) {
		self.filters.set_facet_mode(name, disjunctive);
	}

	/// Sets the refinement for `(attribute, op)`, replacing any previous value.
	pub fn update_numeric_refinement(&mut self, attribute: &str, op: NumericOp, value: f64) {
		match self
			.numeric_refinements
			.iter_mut()
			.find(|refinement| refinement.attribute == attribute && refinement.op == op)
		{
			Some(existing) => existing.value = value,
			None => self.numeric_refinements.push(NumericRefinement::new(attribute, op, value)),
		}
	}

	/// Removes the refinement for `(attribute, op)`. Returns true if one was removed.
	pub fn remove_numeric_refinement(&mut self, attribute: &str, op: NumericOp) -> bool {
		let before = self.numeric_refinements.len();
		self.numeric_refinements
			.retain(|refinement| !(refinement.attribute == attribute && refinement.op == op));
		self.numeric_refinements.len() != before
	}

	/// Removes every refinement on `attribute`.
	pub fn clear_numeric_refinements(&mut self, attribute: &str) {
		self.numeric_refinements.retain(|refinement| refinement.attribute != attribute);
	}

	/// Refinements on `attribute`, in insertion order.
	pub fn numeric_refinements(&self, attribute: &str) -> impl Iterator<Item = &NumericRefinement> {
		self.numeric_refinements
			.iter()
			.filter(move |refinement| refinement.attribute == attribute)
	}

	/// Encoded numeric filters, e.g. `["year>=1990", "rating>=4"]`.
	pub fn numeric_filters(&self) -> Vec<String> {
		self.numeric_refinements.iter().map(ToString::to_string).collect()
	}
}
