use crate::{value::Value, Result};
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// Computes an expression node's value from the current application state.
pub type StateFn = Rc<dyn Fn(&Value) -> Result<Value>>;

/// Declarative UI description as produced by a module's template.
///
/// Templates are rebuilt for each render pass and never mutated.
#[derive(Clone)]
pub enum TemplateNode {
	/// A component boundary. `module` is a dotted module path resolved through the [`Registry`](`crate::module::Registry`).
	Component { module: String, children: Vec<TemplateNode> },
	/// An element. `attrs` may contain reserved event binding keys like `on_click`.
	Element { tag: String, attrs: Vec<(String, String)>, children: Vec<TemplateNode> },
	Expression(StateFn),
	Text(String),
}

impl TemplateNode {
	pub fn component(module: impl Into<String>, children: Vec<TemplateNode>) -> Self {
		Self::Component { module: module.into(), children }
	}

	pub fn element<N: Into<String>, V: Into<String>>(tag: impl Into<String>, attrs: impl IntoIterator<Item = (N, V)>, children: Vec<TemplateNode>) -> Self {
		Self::Element {
			tag: tag.into(),
			attrs: attrs.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
			children,
		}
	}

	pub fn expression(callback: impl Fn(&Value) -> Result<Value> + 'static) -> Self {
		Self::Expression(Rc::new(callback))
	}

	pub fn text(content: impl Into<String>) -> Self {
		Self::Text(content.into())
	}
}

impl Debug for TemplateNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			TemplateNode::Component { module, children } => f.debug_struct("Component").field("module", module).field("children", children).finish(),
			TemplateNode::Element { tag, attrs, children } => f.debug_struct("Element").field("tag", tag).field("attrs", attrs).field("children", children).finish(),
			TemplateNode::Expression(_) => f.write_str("Expression(..)"),
			TemplateNode::Text(content) => f.debug_tuple("Text").field(content).finish(),
		}
	}
}
