use std::collections::BTreeMap;

use marquee_query::NumericOp;
use marquee_results::{FacetCounts, Hit};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn page_for(request: &SequencedRequest, hits: usize, total_pages: usize) -> ResultPage {
	let hits = (0..hits)
		.map(|i| {
			serde_json::from_value::<Hit>(serde_json::json!({
				"objectID": format!("{}-{}-{i}", request.query.text, request.page),
			}))
			.expect("hit")
		})
		.collect();
	ResultPage {
		hits,
		page: request.page,
		total_pages,
		total_hits: total_pages * 10,
		hits_per_page: 10,
		facet_counts: FacetCounts::new(),
		..ResultPage::default()
	}
}

fn accept(sequencer: &mut SearchSequencer, request: &SequencedRequest, hits: usize, total_pages: usize) -> SearchResults {
	match sequencer.apply_response(request, Ok(page_for(request, hits, total_pages))) {
		Disposition::Accepted(Ok(results)) => results,
		other => panic!("expected accepted results, got {other:?}"),
	}
}

fn issued(load_more: LoadMore) -> SequencedRequest {
	match load_more {
		LoadMore::Issued(request) => request,
		LoadMore::Skipped(reason) => panic!("load_more skipped: {reason:?}"),
	}
}

#[test]
fn search_snapshots_next_query() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("keanu"));
	let request = sequencer.search();
	sequencer.next_query_mut().text = "reeves".into();

	assert_eq!(request.sequence, 1);
	assert_eq!(request.page, 0);
	assert_eq!(request.query.text, "keanu");
	assert_eq!(sequencer.last_issued().map(|r| r.sequence), Some(1));
}

#[test]
fn search_honors_explicit_starting_page() {
	let mut query = QuerySpec::new("keanu");
	query.page = Some(2);
	let mut sequencer = SearchSequencer::with_query(query);

	let request = sequencer.search();
	assert_eq!(request.page, 2);
	assert!(request.is_initial_page());
}

#[test]
fn older_search_accepted_before_newer_one_resolves() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("a"));
	let first = sequencer.search();
	sequencer.next_query_mut().text = "ab".into();
	let second = sequencer.search();

	let results = accept(&mut sequencer, &first, 3, 1);
	assert_eq!(results.query().text, "a");

	let results = accept(&mut sequencer, &second, 2, 1);
	assert_eq!(results.query().text, "ab");
	assert!(results.is_initial_page());
	assert_eq!(sequencer.last_accepted().map(|r| r.sequence), Some(2));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(2));
}

#[test]
fn stale_response_is_discarded() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("a"));
	let first = sequencer.search();
	let second = sequencer.search();

	accept(&mut sequencer, &second, 2, 1);
	let disposition = sequencer.apply_response(&first, Ok(page_for(&first, 5, 1)));

	assert!(matches!(disposition, Disposition::Discarded { newest_accepted: 2 }));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(2));
}

#[test]
fn stale_errors_are_discarded_too() {
	let mut sequencer = SearchSequencer::new();
	let first = sequencer.search();
	let second = sequencer.search();
	accept(&mut sequencer, &second, 1, 1);

	let disposition = sequencer.apply_response(&first, Err(TransportError::Unavailable("offline".into())));
	assert!(matches!(disposition, Disposition::Discarded { .. }));
}

#[test]
fn load_more_guards() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::NothingAccepted));

	let first = sequencer.search();
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::NothingAccepted));
	accept(&mut sequencer, &first, 10, 3);

	let page1 = issued(sequencer.load_more());
	assert_eq!(page1.page, 1);
	assert_eq!(page1.sequence, 2);
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::AlreadyRequested));

	let results = accept(&mut sequencer, &page1, 10, 3);
	assert_eq!(results.len(), 20);
	assert!(!results.is_initial_page());

	let page2 = issued(sequencer.load_more());
	accept(&mut sequencer, &page2, 4, 3);
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::LastPage));
}

#[test]
fn load_more_refuses_once_a_new_query_is_requested() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	sequencer.next_query_mut().text = "comedy".into();
	sequencer.search();
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::QueryChanged));
}

#[test]
fn load_more_refuses_across_a_facet_mode_switch() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	sequencer.next_query_mut().set_facet_mode("genre", true);
	sequencer.search();
	assert_eq!(sequencer.load_more(), LoadMore::Skipped(LoadMoreSkip::QueryChanged));
}

#[test]
fn editing_next_query_alone_does_not_block_load_more() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	sequencer
		.next_query_mut()
		.update_numeric_refinement("year", NumericOp::GreaterThanOrEqual, 1990.0);
	let page1 = issued(sequencer.load_more());
	assert!(page1.query.numeric_refinements.is_empty());
}

#[test]
fn load_more_continues_a_query_with_a_nan_refinement() {
	let mut query = QuerySpec::new("drama");
	query.update_numeric_refinement("rating", NumericOp::GreaterThanOrEqual, f64::NAN);
	let mut sequencer = SearchSequencer::with_query(query);
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	let page1 = issued(sequencer.load_more());
	assert_eq!(page1.page, 1);
	assert_eq!(accept(&mut sequencer, &page1, 10, 3).len(), 20);
}

#[test]
fn load_more_retries_a_failed_page() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	let page1 = issued(sequencer.load_more());
	let disposition = sequencer.apply_response(&page1, Err(TransportError::Unavailable("timeout".into())));
	assert!(matches!(disposition, Disposition::Accepted(Err(SearchError::Transport(_)))));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(10));

	let retry = issued(sequencer.load_more());
	assert_eq!(retry.page, 1);
	assert_eq!(retry.sequence, 3);
}

#[test]
fn out_of_order_pagination_reports_sequence_error_without_corruption() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 5);

	let page1 = issued(sequencer.load_more());
	// Pretend the transport answered a different page than requested for page 2.
	let forged = SequencedRequest {
		sequence: page1.sequence + 1,
		query: Arc::clone(&page1.query),
		page: 2,
	};
	let disposition = sequencer.apply_response(&forged, Ok(page_for(&forged, 10, 5)));
	assert!(matches!(
		disposition,
		Disposition::Accepted(Err(SearchError::Sequence(SequenceError::NonContiguousPage { expected: 1, got: 2 })))
	));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(10));
}

#[test]
fn later_page_for_a_foreign_query_is_a_query_mismatch() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);

	let forged = SequencedRequest {
		sequence: first.sequence + 1,
		query: Arc::new(QuerySpec::new("comedy")),
		page: 1,
	};
	let disposition = sequencer.apply_response(&forged, Ok(page_for(&forged, 10, 3)));
	assert!(matches!(
		disposition,
		Disposition::Accepted(Err(SearchError::Sequence(SequenceError::QueryMismatch { page: 1 })))
	));
	assert_eq!(sequencer.accumulated().map(|a| a.query().text.clone()), Some("drama".to_string()));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(10));
}

#[test]
fn page_mismatch_is_an_invalid_response() {
	let mut sequencer = SearchSequencer::new();
	let request = sequencer.search();
	let mut page = page_for(&request, 1, 3);
	page.page = 1;

	let disposition = sequencer.apply_response(&request, Ok(page));
	assert!(matches!(disposition, Disposition::Accepted(Err(SearchError::InvalidResponse(_)))));
	assert!(sequencer.accumulated().is_none());
}

#[test]
fn malformed_transport_errors_surface_as_invalid_response() {
	let mut sequencer = SearchSequencer::new();
	let request = sequencer.search();
	let error = TransportError::Malformed(marquee_results::InvalidResponseError::new("missing hits"));

	let disposition = sequencer.apply_response(&request, Err(error));
	assert!(matches!(disposition, Disposition::Accepted(Err(SearchError::InvalidResponse(_)))));
}

#[test]
fn initial_page_resets_even_after_later_pages() {
	let mut sequencer = SearchSequencer::with_query(QuerySpec::new("drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 10, 3);
	let page1 = issued(sequencer.load_more());

	sequencer.next_query_mut().text = "comedy".into();
	let fresh = sequencer.search();
	let results = accept(&mut sequencer, &fresh, 4, 1);
	assert_eq!(results.len(), 4);

	// The older page-1 response arrives late: discarded, never merged.
	let disposition = sequencer.apply_response(&page1, Ok(page_for(&page1, 10, 3)));
	assert!(matches!(disposition, Disposition::Discarded { newest_accepted: 3 }));
	assert_eq!(sequencer.accumulated().map(|a| a.query().text.clone()), Some("comedy".to_string()));
	assert_eq!(sequencer.accumulated().map(ResultAccumulator::total_merged_hits), Some(4));
}

#[test]
fn toggle_reads_accepted_state() {
	let mut sequencer = SearchSequencer::new();
	sequencer.next_query_mut().add_refinement(FacetRefinement::new("genre", "Drama"));
	let first = sequencer.search();
	accept(&mut sequencer, &first, 1, 1);

	// The accepted state shows Drama, so the toggle removes it.
	assert!(!sequencer.toggle_facet_refinement("genre", "Drama"));
	assert!(!sequencer.next_query().filters.has_refinement("genre", "Drama"));

	// Toggling again still means "remove" while the accepted state shows Drama.
	assert!(!sequencer.toggle_facet_refinement("genre", "Drama"));
	assert!(!sequencer.next_query().filters.has_refinement("genre", "Drama"));
}

#[test]
fn toggle_adds_in_the_accepted_facet_mode() {
	let mut sequencer = SearchSequencer::new();
	sequencer.next_query_mut().set_facet_mode("genre", true);
	let first = sequencer.search();
	accept(&mut sequencer, &first, 1, 1);

	sequencer.next_query_mut().set_facet_mode("genre", false);
	assert!(sequencer.toggle_facet_refinement("genre", "Drama"));
	assert!(sequencer.toggle_facet_refinement("genre", "Comedy"));

	let map = sequencer.next_query().filters.build_filter_refinement_map();
	assert_eq!(map.get("genre").map(Vec::len), Some(2));
	assert_eq!(sequencer.next_query().filters.terms().len(), 1);
}

#[test]
fn toggle_before_any_response_uses_next_query() {
	let mut sequencer = SearchSequencer::new();
	assert!(sequencer.toggle_facet_refinement("genre", "Drama"));
	assert!(!sequencer.toggle_facet_refinement("genre", "Drama"));
	assert!(sequencer.next_query().filters.is_empty());
}

#[derive(Debug, Clone, Copy)]
enum Op {
	Search,
	LoadMore,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![Just(Op::Search), Just(Op::LoadMore)]
}

proptest! {
	#[test]
	fn acceptance_is_monotonic_under_any_completion_order(
		ops in prop::collection::vec(op(), 1..12),
		order_seed in prop::collection::vec(any::<u32>(), 12),
	) {
		let mut sequencer = SearchSequencer::with_query(QuerySpec::new("q"));
		let mut in_flight: Vec<SequencedRequest> = Vec::new();
		let mut accepted: Vec<u64> = Vec::new();
		let mut outcomes_by_sequence: BTreeMap<u64, usize> = BTreeMap::new();

		for (i, op) in ops.iter().enumerate() {
			match op {
				Op::Search => {
					sequencer.next_query_mut().text = format!("q{i}");
					in_flight.push(sequencer.search());
				}
				Op::LoadMore => {
					if let LoadMore::Issued(request) = sequencer.load_more() {
						in_flight.push(request);
					}
				}
			}

			// Resolve one in-flight request, picked pseudo-randomly.
			if !in_flight.is_empty() && order_seed[i] % 2 == 0 {
				let idx = order_seed[i] as usize % in_flight.len();
				let request = in_flight.swap_remove(idx);
				if let Disposition::Accepted(_) = sequencer.apply_response(&request, Ok(page_for(&request, 2, 4))) {
					accepted.push(request.sequence);
					*outcomes_by_sequence.entry(request.sequence).or_default() += 1;
				}
			}
		}

		while let Some(request) = in_flight.pop() {
			if let Disposition::Accepted(_) = sequencer.apply_response(&request, Ok(page_for(&request, 2, 4))) {
				accepted.push(request.sequence);
				*outcomes_by_sequence.entry(request.sequence).or_default() += 1;
			}
		}

		prop_assert!(accepted.windows(2).all(|w| w[0] < w[1]));
		prop_assert!(outcomes_by_sequence.values().all(|count| *count == 1));
		if let (Some(last), Some(state)) = (accepted.last(), sequencer.last_accepted()) {
			prop_assert_eq!(*last, state.sequence);
		}
		if let Some(accumulated) = sequencer.accumulated() {
			let pages = accumulated.last_merged_page() - accumulated.first_page() + 1;
			prop_assert_eq!(accumulated.total_merged_hits(), pages * 2);
		}
	}
}
