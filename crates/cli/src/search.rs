//! `marquee search`: runs one query and pages through it.

use anyhow::Context;
use clap::Args;
use marquee_query::{FacetRefinement, NumericRefinement, QuerySpec};
use marquee_searcher::Searcher;
use marquee_transport::SearchClient;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::render;

#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
	/// Query text; empty matches everything
	#[arg(default_value = "")]
	pub query: String,

	/// Index to search
	#[arg(short, long, default_value = "movies")]
	pub index: String,

	/// Require a facet value
	#[arg(long = "facet", value_name = "NAME=VALUE", value_parser = parse_pair)]
	pub facets: Vec<(String, String)>,

	/// Exclude a facet value
	#[arg(long = "exclude", value_name = "NAME=VALUE", value_parser = parse_pair)]
	pub excludes: Vec<(String, String)>,

	/// Combine refinements of this facet with OR
	#[arg(long = "disjunctive", value_name = "NAME")]
	pub disjunctive: Vec<String>,

	/// Numeric filter such as `year>=1990`
	#[arg(long = "numeric", value_name = "FILTER")]
	pub numeric: Vec<String>,

	/// Number of pages to fetch
	#[arg(long, default_value_t = 1)]
	pub pages: usize,

	/// Print the values of this facet
	#[arg(long = "show-facet", value_name = "NAME")]
	pub show_facets: Vec<String>,

	/// Page size; defaults to the configured one
	#[arg(long)]
	pub hits_per_page: Option<usize>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
	match raw.split_once('=') {
		Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
		_ => Err(format!("expected NAME=VALUE, got `{raw}`")),
	}
}

/// Builds the initial query from flags layered over configuration.
pub fn build_query(args: &SearchArgs, config: &Config) -> anyhow::Result<QuerySpec> {
	let mut query = QuerySpec::new(args.query.clone());
	query.hits_per_page = Some(args.hits_per_page.unwrap_or(config.search.hits_per_page));

	for name in config.facets.disjunctive.iter().chain(&args.disjunctive) {
		query.set_facet_mode(name, true);
	}
	for (name, value) in &args.facets {
		query.add_refinement(FacetRefinement::new(name, value));
	}
	for (name, value) in &args.excludes {
		query.add_refinement(FacetRefinement::excluding(name, value));
	}
	for raw in &args.numeric {
		let numeric = NumericRefinement::parse(raw).with_context(|| format!("invalid --numeric `{raw}`"))?;
		query.update_numeric_refinement(&numeric.attribute, numeric.op, numeric.value);
	}
	Ok(query)
}

pub async fn run(args: SearchArgs, config: &Config) -> anyhow::Result<()> {
	let latency = config.latency();
	let origin = config.transport.origin;
	let client = SearchClient::with_bundled_datasets()?.map_indices(|index| index.with_latency(latency).with_origin(origin));
	let index = client.index(&args.index).with_context(|| {
		let available: Vec<_> = client.index_names().collect();
		format!("unknown index `{}` (available: {})", args.index, available.join(", "))
	})?;
	let label = index
		.settings()
		.searchable_attributes
		.first()
		.cloned()
		.unwrap_or_else(|| "objectID".to_string());

	let query = build_query(&args, config)?;
	let (outcome_tx, mut outcomes) = mpsc::unbounded_channel();
	let searcher = Searcher::builder(index)
		.config(config.searcher_config())
		.query(query)
		.on_slow_request(|pending| tracing::info!(sequence = pending.sequence, page = pending.page, "still waiting for results"))
		.spawn(move |outcome| {
			let _ = outcome_tx.send(outcome);
		});

	searcher.search();
	let mut fetched = 0;
	let mut printed = 0;
	let mut last = None;
	while let Some(outcome) = outcomes.recv().await {
		let results = outcome?;
		fetched += 1;
		if fetched == 1 {
			println!("{}", render::summary(&results));
		}
		print!("{}", render::hits(&results, &label, printed));
		printed = results.len();

		let more = fetched < args.pages && results.has_more_pages();
		last = Some(results);
		if !more {
			break;
		}
		searcher.load_more();
	}

	if let Some(results) = &last {
		for name in &args.show_facets {
			println!("{}", render::facet(results, name));
		}
	}
	searcher.shutdown().await;
	Ok(())
}
