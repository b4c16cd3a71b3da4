//! Positional diffing of renderable trees into ordered patch operations.

use crate::{
	vnode::{VElement, VNode},
	Error, Result,
};
use hashbrown::HashSet;
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// Child-index path from the patched root. The empty path is the root itself.
pub type Path = Vec<usize>;

/// A single DOM mutation.
///
/// Operations are produced in an order in which each one's path is valid once all previous ones are applied.
#[derive(Debug, Clone)]
pub enum Patch {
	Replace { path: Path, node: VNode },
	SetText { path: Path, text: String },
	SetAttribute { path: Path, name: String, value: String },
	RemoveAttribute { path: Path, name: String },
	AppendChild { parent: Path, node: VNode },
	RemoveChild { parent: Path, index: usize },
}

/// Computes the patch that turns `vdom_a` into `vdom_b`.
///
/// Identical trees yield no operations at all. Event listeners are not compared, see [`DomPatcher`](`crate::host::DomPatcher`).
///
/// `depth_limit` counts nesting below the root, the same way [`VTreeBuilder`](`crate::vtree::VTreeBuilder`) counts it below the container.
///
/// # Errors
///
/// [`Error::DepthLimit`] if the trees are nested deeper than `depth_limit` below the root.
#[instrument(skip(vdom_a, vdom_b))]
pub fn diff(vdom_a: &VNode, vdom_b: &VNode, depth_limit: usize) -> Result<Vec<Patch>> {
	let mut patches = Vec::new();
	let mut path = Vec::new();
	diff_node(vdom_a, vdom_b, &mut path, &mut patches, depth_limit.saturating_add(1), depth_limit)?;
	trace!("Diffed into {} operation(s).", patches.len());
	Ok(patches)
}

fn diff_node(vdom_a: &VNode, vdom_b: &VNode, path: &mut Path, patches: &mut Vec<Patch>, depth_limit: usize, configured_limit: usize) -> Result<()> {
	if depth_limit == 0 {
		error!("Depth limit reached");
		return Err(Error::DepthLimit(configured_limit));
	}

	match (vdom_a, vdom_b) {
		(VNode::Text(t_1), VNode::Text(t_2)) => {
			let span = if cfg!(feature = "dangerous-logging") {
				trace_span!("Diffing text node", t_1 = t_1.as_str(), t_2 = t_2.as_str())
			} else {
				trace_span!("Diffing text node")
			};
			let _enter = span.enter();
			if t_1 != t_2 {
				patches.push(Patch::SetText { path: path.clone(), text: t_2.clone() })
			}
		}

		(VNode::Comment(c_1), VNode::Comment(c_2)) if c_1 == c_2 => trace!("Unchanged comment."),

		(VNode::Element(e_1), VNode::Element(e_2)) if e_1.tag == e_2.tag => {
			let span = trace_span!("Diffing element", tag = e_1.tag.as_str());
			let _enter = span.enter();
			diff_attributes(e_1, e_2, path, patches);
			diff_children(e_1, e_2, path, patches, depth_limit, configured_limit)?;
		}

		// Mismatching nodes: Destroy and rebuild.
		(n_1, n_2) => {
			let span = trace_span!("Replace mismatching");
			let _enter = span.enter();

			if STATIC_MAX_LEVEL >= Level::WARN {
				if let (VNode::Element(e_1), VNode::Element(e_2)) = (n_1, n_2) {
					if e_1.tag.eq_ignore_ascii_case(&e_2.tag) {
						warn!(
							"Recreating element due to different tag name casing: {:?} -> {:?}\n\
							The performance impact will persist in production.",
							e_1.tag, e_2.tag
						)
					}
				}
			}

			patches.push(Patch::Replace { path: path.clone(), node: n_2.clone() })
		}
	}
	Ok(())
}

fn diff_attributes(e_1: &VElement, e_2: &VElement, path: &Path, patches: &mut Vec<Patch>) {
	let mut seen = HashSet::with_capacity(e_2.attrs.len());
	for (name, value) in &e_2.attrs {
		seen.insert(name.as_str());
		if e_1.attribute(name) != Some(value.as_str()) {
			patches.push(Patch::SetAttribute {
				path: path.clone(),
				name: name.clone(),
				value: value.clone(),
			})
		}
	}
	for (name, _) in &e_1.attrs {
		if !seen.contains(name.as_str()) {
			patches.push(Patch::RemoveAttribute { path: path.clone(), name: name.clone() })
		}
	}
}

fn diff_children(e_1: &VElement, e_2: &VElement, path: &mut Path, patches: &mut Vec<Patch>, depth_limit: usize, configured_limit: usize) -> Result<()> {
	let common = e_1.children.len().min(e_2.children.len());
	for (i, (c_1, c_2)) in e_1.children.iter().zip(&e_2.children).enumerate() {
		path.push(i);
		let result = diff_node(c_1, c_2, path, patches, depth_limit - 1, configured_limit);
		path.pop();
		result?;
	}

	for node in &e_2.children[common..] {
		patches.push(Patch::AppendChild { parent: path.clone(), node: node.clone() })
	}

	// Back to front, so that earlier indices stay valid.
	for index in (common..e_1.children.len()).rev() {
		patches.push(Patch::RemoveChild { parent: path.clone(), index })
	}
	Ok(())
}
