//! An in-memory host: A DOM stand-in and a document readiness signal that work outside the browser.

use crate::{
	diff::{diff, Patch},
	host::{Document, DomPatcher, ReadyState},
	vnode::{EventKind, VNode},
	Error, Result,
};
use core::fmt::{self, Debug, Formatter};
use std::{cell::RefCell, rc::Rc};
use tracing::{info, instrument, trace};

/// A shared handle to an in-memory DOM tree rooted in a container element.
///
/// Clones refer to the same tree, so a test can keep one while the runtime owns another.
#[derive(Debug, Clone)]
pub struct MemoryDom(Rc<RefCell<MemoryDomState>>);

#[derive(Debug)]
struct MemoryDomState {
	root: VNode,
	mutations: usize,
}

impl MemoryDom {
	/// An empty container element.
	pub fn new(container_tag: impl Into<String>) -> Self {
		Self::with_root(VNode::element(container_tag, Vec::<(String, String)>::new(), Vec::new()))
	}

	/// A container with pre-existing content, like server-rendered markup.
	#[must_use]
	pub fn with_root(root: VNode) -> Self {
		Self(Rc::new(RefCell::new(MemoryDomState { root, mutations: 0 })))
	}

	/// Number of DOM mutations applied so far. Listener rebinding doesn't count.
	#[must_use]
	pub fn mutation_count(&self) -> usize {
		self.0.borrow().mutations
	}

	#[must_use]
	pub fn text_content(&self) -> String {
		self.0.borrow().root.text_content()
	}

	/// A copy of the current tree.
	#[must_use]
	pub fn root(&self) -> VNode {
		self.0.borrow().root.clone()
	}

	#[must_use]
	pub fn find_by_id(&self, id: &str) -> Option<Vec<usize>> {
		self.0.borrow().root.find_by_attribute("id", id)
	}

	/// Fires `event` at the element at `path`.
	///
	/// Returns `Ok(false)` if there is no listener for it there.
	///
	/// # Errors
	///
	/// Whatever the bound handler returns.
	#[instrument(skip(self))]
	pub fn fire(&self, path: &[usize], event: EventKind) -> Result<bool> {
		let handler = self.0.borrow().root.node_at(path).and_then(VNode::as_element).and_then(|element| element.listener(event)).map(|listener| listener.handler.clone());
		let handler = match handler {
			Some(handler) => handler,
			None => return Ok(false),
		};

		// The tree is not borrowed here, so the handler is free to re-render.
		handler()?;
		Ok(true)
	}

	/// [`fire`](`MemoryDom::fire`) at the element with the given `id` attribute.
	///
	/// # Errors
	///
	/// [`Error::Host`] if there is no such element, otherwise as [`fire`](`MemoryDom::fire`).
	pub fn fire_by_id(&self, id: &str, event: EventKind) -> Result<bool> {
		let path = self.find_by_id(id).ok_or_else(|| Error::Host(format!("no element with id {:?}", id)))?;
		self.fire(&path, event)
	}
}

impl DomPatcher for MemoryDom {
	fn to_vnode(&mut self) -> Result<VNode> {
		Ok(self.root())
	}

	/// Applies the whole patch to a copy of the tree and commits only if every operation succeeded.
	#[instrument(skip(self, old, new))]
	fn patch(&mut self, old: &VNode, new: &VNode, depth_limit: usize) -> Result<()> {
		let patches = diff(old, new, depth_limit)?;

		let mut state = self.0.borrow_mut();
		let mut root = state.root.clone();
		for patch in &patches {
			apply(&mut root, patch)?;
		}
		rebind_listeners(&mut root, new)?;

		state.root = root;
		state.mutations += patches.len();
		info!("Committed {} DOM mutation(s).", patches.len());
		Ok(())
	}
}

fn node_mut<'a>(root: &'a mut VNode, path: &[usize]) -> Result<&'a mut VNode> {
	root.node_at_mut(path).ok_or_else(|| Error::Patch(format!("no node at {:?}", path)))
}

fn children_mut<'a>(root: &'a mut VNode, path: &[usize]) -> Result<&'a mut Vec<VNode>> {
	match node_mut(root, path)? {
		VNode::Element(element) => Ok(&mut element.children),
		VNode::Text(_) | VNode::Comment(_) => Err(Error::Patch(format!("{:?} has no children", path))),
	}
}

fn apply(root: &mut VNode, patch: &Patch) -> Result<()> {
	match patch {
		Patch::Replace { path, node } => *node_mut(root, path)? = node.clone(),
		Patch::SetText { path, text } => match node_mut(root, path)? {
			VNode::Text(data) => *data = text.clone(),
			VNode::Element(_) | VNode::Comment(_) => return Err(Error::Patch(format!("expected text at {:?}", path))),
		},
		Patch::SetAttribute { path, name, value } => match node_mut(root, path)? {
			VNode::Element(element) => match element.attrs.iter().position(|(n, _)| n == name) {
				Some(i) => element.attrs[i].1 = value.clone(),
				None => element.attrs.push((name.clone(), value.clone())),
			},
			VNode::Text(_) | VNode::Comment(_) => return Err(Error::Patch(format!("expected element at {:?}", path))),
		},
		Patch::RemoveAttribute { path, name } => match node_mut(root, path)? {
			VNode::Element(element) => element.attrs.retain(|(n, _)| n != name),
			VNode::Text(_) | VNode::Comment(_) => return Err(Error::Patch(format!("expected element at {:?}", path))),
		},
		Patch::AppendChild { parent, node } => children_mut(root, parent)?.push(node.clone()),
		Patch::RemoveChild { parent, index } => {
			let children = children_mut(root, parent)?;
			if *index >= children.len() {
				return Err(Error::Patch(format!("no child {} at {:?}", index, parent)));
			}
			children.remove(*index);
		}
	}
	Ok(())
}

/// Replaces every element's listeners with those of the structurally identical `vdom`.
fn rebind_listeners(node: &mut VNode, vdom: &VNode) -> Result<()> {
	match (node, vdom) {
		(VNode::Element(element), VNode::Element(v_element)) => {
			element.listeners = v_element.listeners.clone();
			if element.children.len() != v_element.children.len() {
				return Err(Error::Patch(format!("child count mismatch below <{}>", element.tag)));
			}
			for (child, v_child) in element.children.iter_mut().zip(&v_element.children) {
				rebind_listeners(child, v_child)?;
			}
			Ok(())
		}
		(VNode::Text(_), VNode::Text(_)) | (VNode::Comment(_), VNode::Comment(_)) => Ok(()),
		_ => Err(Error::Patch("node kind mismatch while binding listeners".to_owned())),
	}
}

/// A readiness signal that's driven manually.
#[derive(Clone)]
pub struct MemoryDocument(Rc<RefCell<MemoryDocumentState>>);

struct MemoryDocumentState {
	ready_state: ReadyState,
	content_loaded: Vec<Box<dyn FnOnce()>>,
}

impl MemoryDocument {
	#[must_use]
	pub fn new(ready_state: ReadyState) -> Self {
		Self(Rc::new(RefCell::new(MemoryDocumentState {
			ready_state,
			content_loaded: Vec::new(),
		})))
	}

	/// Moves to [`ReadyState::Interactive`] and runs (and forgets) all pending content loaded callbacks.
	pub fn finish_loading(&self) {
		self.0.borrow_mut().ready_state = ReadyState::Interactive;
		let callbacks = core::mem::take(&mut self.0.borrow_mut().content_loaded);
		trace!("Firing {} content loaded callback(s).", callbacks.len());
		for callback in callbacks {
			callback()
		}
	}

	#[must_use]
	pub fn pending_callbacks(&self) -> usize {
		self.0.borrow().content_loaded.len()
	}
}

impl Document for MemoryDocument {
	fn ready_state(&self) -> ReadyState {
		self.0.borrow().ready_state
	}

	fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
		self.0.borrow_mut().content_loaded.push(callback)
	}
}

impl Debug for MemoryDocument {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let (ready_state, pending) = {
			let state = self.0.borrow();
			(state.ready_state, state.content_loaded.len())
		};
		f.debug_struct("MemoryDocument").field("ready_state", &ready_state).field("content_loaded", &pending).finish()
	}
}
