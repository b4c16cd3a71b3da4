//! Interfaces to the host environment: the DOM patching collaborator and the document readiness signal.

use crate::{vnode::VNode, Result};

/// Applies renderable trees to a concrete DOM subtree rooted in a container element.
pub trait DomPatcher {
	/// Captures the container's current subtree as a baseline snapshot.
	///
	/// # Errors
	///
	/// If the container can't be read.
	fn to_vnode(&mut self) -> Result<VNode>;

	/// Mutates the container's subtree from `old` to `new` and binds `new`'s event listeners.
	///
	/// `old` must be what was last captured or committed.
	///
	/// # Errors
	///
	/// If the patch can't be computed or applied.
	fn patch(&mut self, old: &VNode, new: &VNode, depth_limit: usize) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
	Loading,
	Interactive,
	Complete,
}

impl ReadyState {
	/// Whether the document is interactive or complete.
	#[must_use]
	pub fn is_ready(self) -> bool {
		matches!(self, ReadyState::Interactive | ReadyState::Complete)
	}
}

/// The host document's readiness signal.
pub trait Document {
	fn ready_state(&self) -> ReadyState;

	/// Registers `callback` to run once when the document's content has loaded.
	///
	/// Hosts that never signal this again simply drop `callback`.
	fn on_content_loaded(&self, callback: Box<dyn FnOnce()>);
}
