use pretty_assertions::assert_eq;

use super::*;

fn drama() -> FacetRefinement {
	FacetRefinement::new("genre", "Drama")
}

fn comedy() -> FacetRefinement {
	FacetRefinement::new("genre", "Comedy")
}

#[test]
fn conjunctive_refinements_are_standalone_terms() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(drama(), false);
	set.add_refinement(comedy(), false);

	assert_eq!(set.terms(), &[FilterTerm::Single(drama()), FilterTerm::Single(comedy())]);
}

#[test]
fn disjunctive_refinements_share_one_group() {
	let mut set = FacetRefinementSet::new();
	set.set_facet_mode("genre", true);
	set.add_refinement(drama(), false);
	set.add_refinement(FacetRefinement::new("actors", "Tom Hanks"), false);
	set.add_refinement(comedy(), false);

	assert_eq!(
		set.terms(),
		&[
			FilterTerm::AnyOf {
				name: "genre".into(),
				refinements: vec![drama(), comedy()],
			},
			FilterTerm::Single(FacetRefinement::new("actors", "Tom Hanks")),
		]
	);
}

#[test]
fn disjunctive_always_groups_without_changing_mode() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(drama(), true);

	assert!(!set.is_disjunctive("genre"));
	assert!(matches!(&set.terms()[0], FilterTerm::AnyOf { name, .. } if name == "genre"));
}

#[test]
fn adding_twice_is_idempotent() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(drama(), false);
	set.add_refinement(drama(), false);
	assert_eq!(set.iter().count(), 1);
}

#[test]
fn remove_drops_first_match_and_empty_groups() {
	let mut set = FacetRefinementSet::new();
	set.set_facet_mode("genre", true);
	set.add_refinement(drama(), false);

	assert!(set.remove_refinement("genre", "Drama"));
	assert!(set.is_empty());
	assert!(!set.remove_refinement("genre", "Drama"));
}

#[test]
fn remove_matches_exclusive_refinements_too() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(FacetRefinement::excluding("genre", "Horror"), false);
	assert!(set.has_refinement("genre", "Horror"));
	assert!(set.remove_refinement("genre", "Horror"));
	assert!(!set.has_refinement("genre", "Horror"));
}

#[test]
fn toggle_flips_presence() {
	let mut set = FacetRefinementSet::new();
	assert!(set.toggle_refinement("genre", "Drama"));
	assert!(set.has_refinement("genre", "Drama"));
	assert!(!set.toggle_refinement("genre", "Drama"));
	assert!(set.is_empty());
}

#[test]
fn switching_to_disjunctive_collapses_terms_in_place() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(FacetRefinement::new("year", "1994"), false);
	set.add_refinement(drama(), false);
	set.add_refinement(FacetRefinement::new("actors", "Tom Hanks"), false);
	set.add_refinement(comedy(), false);

	set.set_facet_mode("genre", true);

	assert_eq!(
		set.terms(),
		&[
			FilterTerm::Single(FacetRefinement::new("year", "1994")),
			FilterTerm::AnyOf {
				name: "genre".into(),
				refinements: vec![drama(), comedy()],
			},
			FilterTerm::Single(FacetRefinement::new("actors", "Tom Hanks")),
		]
	);
}

#[test]
fn switching_back_to_conjunctive_expands_groups() {
	let mut set = FacetRefinementSet::new();
	set.set_facet_mode("genre", true);
	set.add_refinement(drama(), false);
	set.add_refinement(comedy(), false);

	set.set_facet_mode("genre", false);

	assert!(!set.is_disjunctive("genre"));
	assert_eq!(set.terms(), &[FilterTerm::Single(drama()), FilterTerm::Single(comedy())]);
}

#[test]
fn mode_round_trip_preserves_values() {
	let mut set = FacetRefinementSet::new();
	set.add_refinement(drama(), false);
	set.add_refinement(comedy(), true);

	set.set_facet_mode("genre", true);
	set.set_facet_mode("genre", false);
	set.set_facet_mode("genre", true);

	let map = set.build_filter_refinement_map();
	assert_eq!(map.get("genre"), Some(&vec!["Drama".to_string(), "Comedy".to_string()]));
}

#[test]
fn refinement_map_flattens_groups() {
	let mut set = FacetRefinementSet::new();
	set.set_facet_mode("genre", true);
	set.add_refinement(drama(), false);
	set.add_refinement(comedy(), false);
	set.add_refinement(FacetRefinement::new("actors", "Meg Ryan"), false);

	let map = set.build_filter_refinement_map();
	assert_eq!(map.len(), 2);
	assert_eq!(map["genre"], vec!["Drama", "Comedy"]);
	assert_eq!(map["actors"], vec!["Meg Ryan"]);
}

#[test]
fn facet_filters_serialize_as_nested_lists() {
	let mut set = FacetRefinementSet::new();
	set.set_facet_mode("genre", true);
	set.add_refinement(drama(), false);
	set.add_refinement(comedy(), false);
	set.add_refinement(FacetRefinement::excluding("actors", "Nobody: Jr"), false);

	let json = serde_json::to_value(set.to_facet_filters()).expect("serialize");
	assert_eq!(json, serde_json::json!([["genre:Drama", "genre:Comedy"], "actors:-Nobody\\: Jr"]));

	let decoded = FacetRefinementSet::from_facet_filters(&set.to_facet_filters()).expect("decode");
	assert_eq!(decoded, set);
}
