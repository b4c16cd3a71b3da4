//! Renderable primitives, the form consumed by [`DomPatcher`](`crate::host::DomPatcher`)s.

use crate::Result;
use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// DOM events that templates can bind to through reserved attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Click,
	Submit,
}

impl EventKind {
	pub const ALL: [EventKind; 2] = [EventKind::Click, EventKind::Submit];

	/// The reserved template attribute that binds this event.
	#[must_use]
	pub fn attribute(self) -> &'static str {
		match self {
			EventKind::Click => "on_click",
			EventKind::Submit => "on_submit",
		}
	}

	/// The DOM event type name.
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			EventKind::Click => "click",
			EventKind::Submit => "submit",
		}
	}

	#[must_use]
	pub fn from_attribute(attribute: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|kind| kind.attribute() == attribute)
	}
}

pub type Handler = Rc<dyn Fn() -> Result<()>>;

#[derive(Clone)]
pub struct Listener {
	pub event: EventKind,
	pub handler: Handler,
}

impl Debug for Listener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Listener").field("event", &self.event).finish_non_exhaustive()
	}
}

#[derive(Debug, Clone)]
pub struct VElement {
	pub tag: String,
	pub attrs: Vec<(String, String)>,
	pub listeners: Vec<Listener>,
	pub children: Vec<VNode>,
}

impl VElement {
	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}

	#[must_use]
	pub fn listener(&self, event: EventKind) -> Option<&Listener> {
		self.listeners.iter().find(|listener| listener.event == event)
	}
}

#[derive(Debug, Clone)]
pub enum VNode {
	Element(VElement),
	Text(String),
	/// Only ever loaded from existing markup. Templates don't produce comments,
	/// but they still occupy a child position in the DOM.
	Comment(String),
}

impl VNode {
	pub fn element<N: Into<String>, V: Into<String>>(tag: impl Into<String>, attrs: impl IntoIterator<Item = (N, V)>, children: Vec<VNode>) -> Self {
		Self::Element(VElement {
			tag: tag.into(),
			attrs: attrs.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
			listeners: Vec::new(),
			children,
		})
	}

	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	pub fn comment(comment: impl Into<String>) -> Self {
		Self::Comment(comment.into())
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&VElement> {
		match self {
			VNode::Element(element) => Some(element),
			VNode::Text(_) | VNode::Comment(_) => None,
		}
	}

	/// A copy of this element with its child nodes replaced and no listeners.
	/// Text nodes have no children and return [`None`].
	#[must_use]
	pub fn with_children(&self, children: Vec<VNode>) -> Option<Self> {
		self.as_element().map(|element| {
			VNode::Element(VElement {
				tag: element.tag.clone(),
				attrs: element.attrs.clone(),
				listeners: Vec::new(),
				children,
			})
		})
	}

	/// Concatenated data of all descendant text nodes, like [***Node.textContent***](https://developer.mozilla.org/en-US/docs/Web/API/Node/textContent).
	#[must_use]
	pub fn text_content(&self) -> String {
		fn collect(node: &VNode, out: &mut String) {
			match node {
				VNode::Text(text) => out.push_str(text),
				VNode::Element(element) => element.children.iter().for_each(|child| collect(child, out)),
				VNode::Comment(_) => (),
			}
		}

		let mut out = String::new();
		collect(self, &mut out);
		out
	}

	/// Depth-first search for the first element whose `name` attribute equals `value`.
	/// Returns its child-index path relative to `self`.
	#[must_use]
	pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<Vec<usize>> {
		let element = self.as_element()?;
		if element.attribute(name) == Some(value) {
			return Some(Vec::new());
		}
		element.children.iter().enumerate().find_map(|(i, child)| {
			child.find_by_attribute(name, value).map(|mut path| {
				path.insert(0, i);
				path
			})
		})
	}

	#[must_use]
	pub fn node_at(&self, path: &[usize]) -> Option<&VNode> {
		match path.split_first() {
			None => Some(self),
			Some((&i, rest)) => self.as_element()?.children.get(i)?.node_at(rest),
		}
	}

	pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut VNode> {
		match path.split_first() {
			None => Some(self),
			Some((&i, rest)) => match self {
				VNode::Element(element) => element.children.get_mut(i)?.node_at_mut(rest),
				VNode::Text(_) | VNode::Comment(_) => None,
			},
		}
	}
}

/// Element namespaces that need dedicated creation.
///
/// `<svg>` and `<math>` open their namespace for their whole subtree.
/// SVG's `<foreignObject>` switches its children back to HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
	Html,
	Svg,
	MathMl,
}

impl Namespace {
	pub const HTML_URI: &'static str = "http://www.w3.org/1999/xhtml";
	pub const SVG_URI: &'static str = "http://www.w3.org/2000/svg";
	pub const MATHML_URI: &'static str = "http://www.w3.org/1998/Math/MathML";

	#[must_use]
	pub fn uri(self) -> &'static str {
		match self {
			Namespace::Html => Self::HTML_URI,
			Namespace::Svg => Self::SVG_URI,
			Namespace::MathMl => Self::MATHML_URI,
		}
	}

	/// Unknown or missing namespaces are treated as HTML.
	#[must_use]
	pub fn from_uri(uri: Option<&str>) -> Self {
		match uri {
			Some(Self::SVG_URI) => Namespace::Svg,
			Some(Self::MATHML_URI) => Namespace::MathMl,
			_ => Namespace::Html,
		}
	}

	/// The namespace of an element named `tag` whose parent's children are in `inherited`.
	#[must_use]
	pub fn of_element(tag: &str, inherited: Namespace) -> Self {
		match tag {
			"svg" => Namespace::Svg,
			"math" => Namespace::MathMl,
			_ => inherited,
		}
	}

	/// The namespace an element named `tag` in `self` hands down to its children.
	#[must_use]
	pub fn for_children(self, tag: &str) -> Self {
		match (self, tag) {
			(Namespace::Svg, "foreignObject") => Namespace::Html,
			(namespace, _) => namespace,
		}
	}
}
