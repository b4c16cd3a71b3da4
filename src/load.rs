//! Reading existing DOM back into renderable primitives, used as the baseline for the first patch.

use crate::vnode::{VElement, VNode};
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use web_sys::{Attr, Comment, Element, NamedNodeMap, Node as wNode, Text};

/// Loads elements, text and comment nodes, so that baseline child positions match the DOM's.
///
/// Any other node kind (like a processing instruction) is removed from `parent`.
pub fn load_child_nodes(parent: &wNode) -> Vec<VNode> {
	let child_nodes = parent.child_nodes();
	let children: Vec<wNode> = (0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect();

	children
		.into_iter()
		.filter_map(|child| {
			if let Some(element) = child.dyn_ref::<Element>() {
				Some(VNode::Element(load_element(element)))
			} else if let Some(text) = child.dyn_ref::<Text>() {
				Some(VNode::Text(text.data()))
			} else if let Some(comment) = child.dyn_ref::<Comment>() {
				Some(VNode::Comment(comment.data()))
			} else {
				warn!("Removing unrecognised child node: {:?}", child);
				if let Err(error) = parent.remove_child(&child) {
					error!("Failed to remove unrecognised child node: {:?}", error);
				}
				None
			}
		})
		.collect()
}

/// Uses the local name, which is lower case for HTML elements and keeps SVG's camelCase names intact.
pub fn load_element(element: &Element) -> VElement {
	let node: &wNode = element.as_ref();
	VElement {
		tag: element.local_name(),
		attrs: load_attributes(&element.attributes()),
		listeners: Vec::new(),
		children: load_child_nodes(node),
	}
}

pub fn load_attributes(attributes: &NamedNodeMap) -> Vec<(String, String)> {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

pub fn load_attribute(attribute: &Attr) -> (String, String) {
	(attribute.local_name(), attribute.value())
}
