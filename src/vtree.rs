//! Expands templates into renderable primitives.

use crate::{
	dispatch::{bind_event_handlers, filter_attributes, EventSink},
	module::{Module, Registry},
	template::TemplateNode,
	value::{interpolate, Value},
	vnode::{VElement, VNode},
	Error, Result,
};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use tracing::{instrument, trace, trace_span};

/// Which module handles events for the subtree currently being built.
///
/// Passed down by value. Components with an action get a fresh copy with themselves as `scope_module`,
/// so ancestors' contexts are never touched.
#[derive(Debug, Clone)]
pub struct ScopeContext {
	pub scope_module: Rc<Module>,
	pub page_module: Rc<Module>,
}

impl ScopeContext {
	/// The root context of a render pass, scoped to the page itself.
	#[must_use]
	pub fn new(page_module: Rc<Module>) -> Self {
		Self {
			scope_module: page_module.clone(),
			page_module,
		}
	}

	#[must_use]
	pub fn with_scope(&self, scope_module: Rc<Module>) -> Self {
		Self {
			scope_module,
			page_module: self.page_module.clone(),
		}
	}
}

/// Holds what a render pass needs besides the template and state: Module lookup and the event sink bound handlers report to.
pub struct VTreeBuilder<'a> {
	registry: &'a Registry,
	sink: Rc<dyn EventSink>,
	depth_limit: usize,
}

impl<'a> VTreeBuilder<'a> {
	#[must_use]
	pub fn new(registry: &'a Registry, sink: Rc<dyn EventSink>, depth_limit: usize) -> Self {
		Self { registry, sink, depth_limit }
	}

	/// Builds `nodes` in order, concatenating their output.
	///
	/// Primitives are emitted depth-first, left to right, in template source order.
	///
	/// # Errors
	///
	/// Unknown modules, values that can't be interpolated, failing expressions and [`Error::DepthLimit`].
	/// Nothing partial is returned.
	#[instrument(skip(self, nodes, state, context), fields(scope = context.scope_module.path()))]
	pub fn build(&self, nodes: &[TemplateNode], state: &Value, context: &ScopeContext) -> Result<Vec<VNode>> {
		let mut out = Vec::new();
		self.build_nodes(nodes, state, context, &mut out, self.depth_limit)?;
		Ok(out)
	}

	fn build_nodes(&self, nodes: &[TemplateNode], state: &Value, context: &ScopeContext, out: &mut Vec<VNode>, depth_limit: usize) -> Result<()> {
		for node in nodes {
			self.build_node(node, state, context, out, depth_limit)?;
		}
		Ok(())
	}

	fn build_node(&self, node: &TemplateNode, state: &Value, context: &ScopeContext, out: &mut Vec<VNode>, depth_limit: usize) -> Result<()> {
		if depth_limit == 0 {
			return Err(Error::DepthLimit(self.depth_limit));
		}

		match node {
			TemplateNode::Component { module, children } => {
				let span = trace_span!("Building component", module = module.as_str());
				let _enter = span.enter();

				let resolved = self.registry.resolve(module)?;
				if resolved.action().is_some() {
					trace!("Component has an action. Scoping events to it.");
					let context = context.with_scope(resolved);
					self.build_nodes(children, state, &context, out, depth_limit - 1)
				} else {
					self.build_nodes(children, state, context, out, depth_limit - 1)
				}
			}

			TemplateNode::Element { tag, attrs, children } => {
				let span = trace_span!("Building element", tag = tag.as_str());
				let _enter = span.enter();

				let mut built_children = Vec::with_capacity(children.len());
				self.build_nodes(children, state, context, &mut built_children, depth_limit - 1)?;

				out.push(VNode::Element(VElement {
					tag: tag.clone(),
					listeners: bind_event_handlers(attrs, context, state, &self.sink),
					attrs: filter_attributes(attrs),
					children: built_children,
				}));
				Ok(())
			}

			TemplateNode::Expression(callback) => {
				let value = callback(state)?;
				if cfg!(feature = "dangerous-logging") {
					trace!(?value, "Interpolating expression.");
				} else {
					trace!(ty = %value.ty(), "Interpolating expression.");
				}
				out.push(VNode::Text(interpolate(&value)?));
				Ok(())
			}

			TemplateNode::Text(content) => {
				out.push(VNode::Text(content.clone()));
				Ok(())
			}
		}
	}
}

impl Debug for VTreeBuilder<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("VTreeBuilder").field("registry", self.registry).field("depth_limit", &self.depth_limit).finish_non_exhaustive()
	}
}
