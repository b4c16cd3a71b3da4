/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
	/// Maximum template and render tree nesting below the container. Deeper templates fail to render with [`Error::DepthLimit`](`crate::Error::DepthLimit`).
	pub depth_limit: usize,
	/// `id` of the container element the page is rendered into. [`None`] selects `<body>`.
	///
	/// Only used by the browser entry point.
	pub container_id: Option<String>,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			depth_limit: 256,
			container_id: None,
		}
	}
}

impl Options {
	#[must_use]
	pub fn depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn container_id(mut self, container_id: impl Into<String>) -> Self {
		self.container_id = Some(container_id.into());
		self
	}
}
