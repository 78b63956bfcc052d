//! Record sets bundled with the crate.

use crate::error::DatasetError;
use crate::index::MemoryIndex;
use crate::settings::IndexSettings;

pub const MOVIES: &str = "movies";
pub const ACTORS: &str = "actors";

const MOVIES_JSON: &str = include_str!("../data/movies.json");
const ACTORS_JSON: &str = include_str!("../data/actors.json");

/// Movies, searchable by title, faceted by genre and year, best rated first.
pub fn movies() -> Result<MemoryIndex, DatasetError> {
	let settings = IndexSettings::default()
		.searchable(["title"])
		.faceting(["genre", "year"])
		.ranking(["rating", "year"]);
	MemoryIndex::from_json(MOVIES, settings, MOVIES_JSON)
}

/// Actors, searchable by name, most popular first.
pub fn actors() -> Result<MemoryIndex, DatasetError> {
	let settings = IndexSettings::default().searchable(["name"]).ranking(["rating"]);
	MemoryIndex::from_json(ACTORS, settings, ACTORS_JSON)
}
