use thiserror::Error;

/// A record set could not be loaded into a [`crate::MemoryIndex`].
#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("dataset {name}: {source}")]
	Parse {
		name: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("dataset {name}: record {position} has no objectID")]
	MissingObjectId { name: String, position: usize },
}
