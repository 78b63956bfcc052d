use std::collections::BTreeMap;
use std::sync::Arc;

use crate::datasets;
use crate::error::DatasetError;
use crate::index::MemoryIndex;

/// Named indices shared by the searchers built on top of them.
///
/// Constructed explicitly and handed to whoever needs an index.
#[derive(Debug, Clone, Default)]
pub struct SearchClient {
	indices: BTreeMap<String, Arc<MemoryIndex>>,
}

impl SearchClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// A client serving the bundled `movies` and `actors` indices.
	pub fn with_bundled_datasets() -> Result<Self, DatasetError> {
		let mut client = Self::new();
		client.add_index(datasets::movies()?);
		client.add_index(datasets::actors()?);
		Ok(client)
	}

	/// Registers `index` under its name, replacing any index of the same name.
	pub fn add_index(&mut self, index: MemoryIndex) -> Arc<MemoryIndex> {
		let index = Arc::new(index);
		self.indices.insert(index.name().to_string(), Arc::clone(&index));
		index
	}

	pub fn index(&self, name: &str) -> Option<Arc<MemoryIndex>> {
		self.indices.get(name).cloned()
	}

	pub fn index_names(&self) -> impl Iterator<Item = &str> {
		self.indices.keys().map(String::as_str)
	}

	/// Applies `configure` to every registered index.
	#[must_use]
	pub fn map_indices(self, configure: impl Fn(MemoryIndex) -> MemoryIndex) -> Self {
		let indices = self
			.indices
			.into_iter()
			.map(|(name, index)| {
				let index = Arc::unwrap_or_clone(index);
				(name, Arc::new(configure(index)))
			})
			.collect();
		Self { indices }
	}
}
