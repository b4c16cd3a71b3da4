use crate::{
	host::DomPatcher,
	module::Module,
	value::Value,
	vnode::VNode,
	vtree::{ScopeContext, VTreeBuilder},
	Error, Result,
};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::{info, instrument, warn};

/// Owns the last committed render tree and keeps the container's DOM in sync with each new one.
///
/// Before the first [`render`](`Reconciler::render`) it is unattached and holds no snapshot.
/// The first render captures the container's existing DOM as the baseline to patch against.
pub struct Reconciler {
	patcher: Box<dyn DomPatcher>,
	snapshot: Option<VNode>,
	depth_limit: usize,
}

impl Reconciler {
	#[must_use]
	pub fn new(patcher: Box<dyn DomPatcher>, depth_limit: usize) -> Self {
		Self {
			patcher,
			snapshot: None,
			depth_limit,
		}
	}

	#[must_use]
	pub fn is_attached(&self) -> bool {
		self.snapshot.is_some()
	}

	/// The last committed tree, rooted in the container element.
	#[must_use]
	pub fn snapshot(&self) -> Option<&VNode> {
		self.snapshot.as_ref()
	}

	/// Renders `page_module`'s template with `state` into the container.
	///
	/// The new tree is fully built before anything is patched. If building fails, the DOM is untouched
	/// and the previous snapshot stays in place.
	///
	/// If patching fails, the DOM may have been changed in part, so the snapshot is dropped
	/// and the next render captures a fresh baseline.
	///
	/// # Errors
	///
	/// Anything [`VTreeBuilder::build`] or [`DomPatcher::patch`] may return,
	/// and [`Error::Patch`] if the captured container is not an element.
	#[instrument(skip(self, page_module, state, builder), fields(page = page_module.path()))]
	pub fn render(&mut self, page_module: &Rc<Module>, state: &Value, builder: &VTreeBuilder<'_>) -> Result<()> {
		let old = match self.snapshot.take() {
			Some(snapshot) => snapshot,
			None => {
				let baseline = self.patcher.to_vnode()?;
				info!("Attached. Captured container baseline.");
				baseline
			}
		};

		let new = match Self::build(&old, page_module, state, builder) {
			Ok(new) => new,
			Err(error) => {
				self.snapshot = Some(old);
				return Err(error);
			}
		};

		match self.patcher.patch(&old, &new, self.depth_limit) {
			Ok(()) => {
				self.snapshot = Some(new);
				Ok(())
			}
			Err(error) => {
				warn!("Patch failed. Detaching to recapture the container on the next render.");
				Err(error)
			}
		}
	}

	fn build(old: &VNode, page_module: &Rc<Module>, state: &Value, builder: &VTreeBuilder<'_>) -> Result<VNode> {
		let context = ScopeContext::new(page_module.clone());
		let template = page_module.template();
		let children = builder.build(&template, state, &context)?;

		old.with_children(children).ok_or_else(|| Error::Patch("container is not an element".to_owned()))
	}
}

impl Debug for Reconciler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reconciler").field("snapshot", &self.snapshot).field("depth_limit", &self.depth_limit).finish_non_exhaustive()
	}
}
