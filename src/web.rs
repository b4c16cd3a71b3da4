//! The browser host: Patching a live [`web_sys::Element`]'s subtree and the page's readiness signal.

use crate::{
	config::Options,
	diff::{diff, Patch},
	host::{Document, DomPatcher, ReadyState},
	load::load_element,
	module::Registry,
	runtime::Runtime,
	value::Value,
	vnode::{EventKind, Handler, Namespace, VNode},
	Error, Result,
};
use js_sys::Function;
use tracing::{error, info, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, throw_str, JsCast, JsValue};

fn js_error(context: &str, error: JsValue) -> Error {
	Error::Patch(format!("{}: {:?}", context, error))
}

struct RegisteredListener {
	target: web_sys::EventTarget,
	event: EventKind,
	closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Attached to a specific [`web_sys::Element`], this `struct` updates its [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes).
///
/// The element itself is the root of each patch: Its tag name must stay the same, its attributes are updated.
///
/// # Event listeners
///
/// All listeners are rebound after each patch, since their handlers capture the state of the render that produced them.
/// Replaced closures are kept alive until the following patch, as the handler that triggered a re-render is still running while it happens.
pub struct WebPatcher {
	element: web_sys::Element,
	listeners: Vec<RegisteredListener>,
	retired: Vec<RegisteredListener>,
}

impl WebPatcher {
	#[must_use]
	#[instrument]
	pub fn new_for_element(element: web_sys::Element) -> Self {
		Self {
			element,
			listeners: Vec::new(),
			retired: Vec::new(),
		}
	}

	fn node_at(&self, path: &[usize]) -> Result<web_sys::Node> {
		let mut node: web_sys::Node = self.element.clone().into();
		for &i in path {
			#[allow(clippy::cast_possible_truncation)]
			let child = node.child_nodes().item(i as u32);
			node = child.ok_or_else(|| Error::Patch(format!("no DOM node at {:?}", path)))?;
		}
		Ok(node)
	}

	fn element_at(&self, path: &[usize]) -> Result<web_sys::Element> {
		self.node_at(path)?.dyn_into().map_err(|node| Error::Patch(format!("expected element at {:?} but found {:?}", path, node)))
	}

	/// Creates `vdom` as it would appear below an element whose children are in the `inherited` namespace.
	fn create(document: &web_sys::Document, vdom: &VNode, inherited: Namespace) -> Result<web_sys::Node> {
		match vdom {
			VNode::Text(text) => Ok(document.create_text_node(text).into()),
			VNode::Comment(comment) => Ok(document.create_comment(comment).into()),
			VNode::Element(element) => {
				let namespace = Namespace::of_element(&element.tag, inherited);
				let span = trace_span!("Creating element", tag = element.tag.as_str(), ?namespace);
				let _enter = span.enter();

				let created = match namespace {
					Namespace::Html => document.create_element(&element.tag),
					Namespace::Svg | Namespace::MathMl => document.create_element_ns(Some(namespace.uri()), &element.tag),
				}
				.map_err(|e| js_error("create_element", e))?;
				for (name, value) in &element.attrs {
					created.set_attribute(name, value).map_err(|e| js_error("set_attribute", e))?;
				}
				let children_namespace = namespace.for_children(&element.tag);
				for child in &element.children {
					created.append_child(&Self::create(document, child, children_namespace)?).map_err(|e| js_error("append_child", e))?;
				}
				Ok(created.into())
			}
		}
	}

	fn apply(&self, document: &web_sys::Document, patch: &Patch) -> Result<()> {
		match patch {
			Patch::Replace { path, node } => {
				if path.is_empty() {
					return Err(Error::Patch("the container element can't be replaced".to_owned()));
				}
				let old = self.node_at(path)?;
				let parent = old.parent_node().ok_or_else(|| Error::Patch(format!("detached node at {:?}", path)))?;
				parent.replace_child(&Self::create(document, node, inherited_namespace(&parent))?, &old).map_err(|e| js_error("replace_child", e))?;
			}
			Patch::SetText { path, text } => {
				let node = self.node_at(path)?;
				let data = node.dyn_ref::<web_sys::Text>().ok_or_else(|| Error::Patch(format!("expected text at {:?}", path)))?;
				data.set_data(text)
			}
			Patch::SetAttribute { path, name, value } => self.element_at(path)?.set_attribute(name, value).map_err(|e| js_error("set_attribute", e))?,
			Patch::RemoveAttribute { path, name } => self.element_at(path)?.remove_attribute(name).map_err(|e| js_error("remove_attribute", e))?,
			Patch::AppendChild { parent, node } => {
				let parent = self.node_at(parent)?;
				parent.append_child(&Self::create(document, node, inherited_namespace(&parent))?).map_err(|e| js_error("append_child", e))?;
			}
			Patch::RemoveChild { parent, index } => {
				let parent = self.node_at(parent)?;
				#[allow(clippy::cast_possible_truncation)]
				let child = parent.child_nodes().item(*index as u32).ok_or_else(|| Error::Patch(format!("no child {} to remove", index)))?;
				parent.remove_child(&child).map_err(|e| js_error("remove_child", e))?;
			}
		}
		Ok(())
	}

	fn unbind_listeners(&mut self) {
		self.retired.clear();
		for listener in self.listeners.drain(..) {
			if let Err(error) = listener.target.remove_event_listener_with_callback(listener.event.name(), listener.closure.as_ref().unchecked_ref::<Function>()) {
				error!("Failed to remove event listener: {:?}", error);
			}
			self.retired.push(listener);
		}
	}

	fn bind_listeners(&mut self, node: &web_sys::Node, vdom: &VNode) -> Result<()> {
		let element = match vdom {
			VNode::Element(element) => element,
			VNode::Text(_) | VNode::Comment(_) => return Ok(()),
		};

		for listener in &element.listeners {
			let closure = listener_closure(listener.event, listener.handler.clone());
			let target: &web_sys::EventTarget = node.as_ref();
			target
				.add_event_listener_with_callback(listener.event.name(), closure.as_ref().unchecked_ref::<Function>())
				.map_err(|e| js_error("add_event_listener", e))?;
			self.listeners.push(RegisteredListener {
				target: target.clone(),
				event: listener.event,
				closure,
			});
		}

		let child_nodes = node.child_nodes();
		for (i, child) in element.children.iter().enumerate() {
			#[allow(clippy::cast_possible_truncation)]
			let dom_child = child_nodes.item(i as u32).ok_or_else(|| Error::Patch(format!("missing DOM child {} below <{}>", i, element.tag)))?;
			self.bind_listeners(&dom_child, child)?;
		}
		Ok(())
	}
}

fn inherited_namespace(parent: &web_sys::Node) -> Namespace {
	match parent.dyn_ref::<web_sys::Element>() {
		Some(element) => Namespace::from_uri(element.namespace_uri().as_deref()).for_children(&element.local_name()),
		None => Namespace::Html,
	}
}

fn listener_closure(event: EventKind, handler: Handler) -> Closure<dyn FnMut(web_sys::Event)> {
	Closure::wrap(Box::new(move |dom_event: web_sys::Event| {
		let span = trace_span!("Event handler", event = event.name());
		let _enter = span.enter();

		if event == EventKind::Submit {
			dom_event.prevent_default();
		}
		if let Err(error) = handler() {
			error!("Event dispatch failed: {}", error);
			throw_str(&error.to_string())
		}
	}) as Box<dyn FnMut(web_sys::Event)>)
}

impl DomPatcher for WebPatcher {
	fn to_vnode(&mut self) -> Result<VNode> {
		Ok(VNode::Element(load_element(&self.element)))
	}

	#[instrument(skip(self, old, new))]
	fn patch(&mut self, old: &VNode, new: &VNode, depth_limit: usize) -> Result<()> {
		let patches = diff(old, new, depth_limit)?;
		let document = self.element.owner_document().ok_or_else(|| Error::Host("no owner document found for root element".to_owned()))?;

		for patch in &patches {
			self.apply(&document, patch)?;
		}

		self.unbind_listeners();
		let root: web_sys::Node = self.element.clone().into();
		self.bind_listeners(&root, new)?;

		info!("Committed {} DOM mutation(s), {} event listener(s) bound.", patches.len(), self.listeners.len());
		Ok(())
	}
}

/// The page's [`web_sys::Document`] as readiness signal.
#[derive(Debug, Clone)]
pub struct WebDocument(pub web_sys::Document);

impl Document for WebDocument {
	fn ready_state(&self) -> ReadyState {
		match self.0.ready_state().as_str() {
			"interactive" => ReadyState::Interactive,
			"complete" => ReadyState::Complete,
			_ => ReadyState::Loading,
		}
	}

	fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
		let options = web_sys::AddEventListenerOptions::new();
		options.set_once(true);
		let callback = Closure::once_into_js(move || callback());
		if let Err(error) = self.0.add_event_listener_with_callback_and_add_event_listener_options("DOMContentLoaded", callback.unchecked_ref(), &options) {
			error!("Failed to register DOMContentLoaded listener: {:?}", error);
		}
	}
}

/// Browser entry point: Installs a [`Runtime`] rendering into the configured container and hands it `page_path` with `state`.
///
/// The runtime is torn down when the page is hidden for unloading.
///
/// # Errors
///
/// [`Error::Host`] if there is no window, document or container, otherwise as [`Runtime::handle_new_page`].
pub fn run(registry: Registry, page_path: &str, state: Value, options: Options) -> Result<()> {
	let window = web_sys::window().ok_or_else(|| Error::Host("no window".to_owned()))?;
	let document = window.document().ok_or_else(|| Error::Host("no document".to_owned()))?;
	let container: web_sys::Element = match &options.container_id {
		Some(id) => document.get_element_by_id(id).ok_or_else(|| Error::Host(format!("no element with id {:?}", id)))?,
		None => document.body().ok_or_else(|| Error::Host("no body".to_owned()))?.into(),
	};

	let runtime = Runtime::new(registry, Box::new(WebPatcher::new_for_element(container)), Box::new(WebDocument(document)), options);
	if Runtime::install(runtime.clone()).is_some() {
		warn!("Replaced a running runtime.");
	}

	let options = web_sys::AddEventListenerOptions::new();
	options.set_once(true);
	let teardown = Closure::once_into_js(|| {
		trace!("Page hidden.");
		Runtime::teardown();
	});
	window
		.add_event_listener_with_callback_and_add_event_listener_options("pagehide", teardown.unchecked_ref(), &options)
		.map_err(|e| Error::Host(format!("add_event_listener: {:?}", e)))?;

	runtime.handle_new_page(page_path, state)
}
