//! Orchestration: Current state, page module and reconciler, plus the per-thread singleton.

use crate::{
	config::Options,
	dispatch::{invoke_action, EventSink},
	host::{Document, DomPatcher},
	module::{Module, Registry},
	reconcile::Reconciler,
	value::Value,
	vnode::EventKind,
	vtree::{ScopeContext, VTreeBuilder},
	Error, Result,
};
use core::fmt::{self, Debug, Formatter};
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::{debug, error, info, instrument, trace};

thread_local! {
	static RUNTIME: RefCell<Option<Runtime>> = RefCell::new(None);
}

/// Owns the application state and the [`Reconciler`]. Cloning is cheap and shares the instance.
///
/// State is only ever replaced as a whole, after an action returned successfully.
#[derive(Clone)]
pub struct Runtime(Rc<RuntimeInner>);

struct RuntimeInner {
	registry: Registry,
	options: Options,
	document: Box<dyn Document>,
	page_module: RefCell<Option<Rc<Module>>>,
	state: RefCell<Value>,
	reconciler: RefCell<Reconciler>,
}

impl Runtime {
	#[must_use]
	pub fn new(registry: Registry, patcher: Box<dyn DomPatcher>, document: Box<dyn Document>, options: Options) -> Self {
		let reconciler = Reconciler::new(patcher, options.depth_limit);
		Self(Rc::new(RuntimeInner {
			registry,
			options,
			document,
			page_module: RefCell::new(None),
			state: RefCell::new(Value::empty_map()),
			reconciler: RefCell::new(reconciler),
		}))
	}

	/// Makes `runtime` this thread's current instance, returning the previous one.
	pub fn install(runtime: Runtime) -> Option<Runtime> {
		RUNTIME.with(|slot| slot.borrow_mut().replace(runtime))
	}

	#[must_use]
	pub fn current() -> Option<Runtime> {
		RUNTIME.with(|slot| slot.borrow().clone())
	}

	/// The current instance, created with `init` on first use.
	pub fn get_or_init(init: impl FnOnce() -> Runtime) -> Runtime {
		if let Some(runtime) = Self::current() {
			return runtime;
		}

		let runtime = init();
		info!("Created runtime.");
		Self::install(runtime.clone());
		runtime
	}

	/// Removes this thread's current instance, for example on page unload.
	///
	/// Once the last clone is dropped, handlers it bound fail with [`Error::Detached`].
	pub fn teardown() -> Option<Runtime> {
		let previous = RUNTIME.with(|slot| slot.borrow_mut().take());
		if previous.is_some() {
			info!("Tore down runtime.");
		}
		previous
	}

	#[must_use]
	pub fn registry(&self) -> &Registry {
		&self.0.registry
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.0.options
	}

	/// The currently committed application state.
	#[must_use]
	pub fn state(&self) -> Value {
		self.0.state.borrow().clone()
	}

	#[must_use]
	pub fn page_module(&self) -> Option<Rc<Module>> {
		self.0.page_module.borrow().clone()
	}

	/// Stores `page_path`'s module and `state`, then renders once the document is ready.
	///
	/// If the document is still loading, the render is deferred to its content loaded signal
	/// and errors from it are logged instead of returned.
	///
	/// # Errors
	///
	/// [`Error::UnknownModule`], or anything an immediate [`render`](`Runtime::render`) returns.
	#[instrument(skip(self, state))]
	pub fn handle_new_page(&self, page_path: &str, state: Value) -> Result<()> {
		let page_module = self.0.registry.resolve(page_path)?;
		*self.0.page_module.borrow_mut() = Some(page_module);
		self.commit_state(state);

		if self.0.document.ready_state().is_ready() {
			return self.render();
		}

		trace!("Document loading. Deferring the initial render.");
		let handle = Rc::downgrade(&self.0);
		self.0.document.on_content_loaded(Box::new(move || match handle.upgrade() {
			Some(inner) => {
				if let Err(error) = Runtime(inner).render() {
					error!("Initial render failed: {}", error)
				}
			}
			None => debug!("Runtime was torn down before the document became ready."),
		}));
		Ok(())
	}

	/// Re-renders the current page with the current state.
	///
	/// # Errors
	///
	/// [`Error::NoPage`] before [`handle_new_page`](`Runtime::handle_new_page`),
	/// [`Error::RenderInProgress`] if called from within a render, or anything the [`Reconciler`] returns.
	#[instrument(skip(self))]
	pub fn render(&self) -> Result<()> {
		let page_module = self.page_module().ok_or(Error::NoPage)?;
		let state = self.state();
		let mut reconciler = self.0.reconciler.try_borrow_mut().map_err(|_| Error::RenderInProgress)?;
		let builder = VTreeBuilder::new(&self.0.registry, self.sink(), self.0.options.depth_limit);
		reconciler.render(&page_module, &state, &builder)
	}

	/// Runs the click action `action` of `context`'s scope module against `state`, commits the result and re-renders.
	///
	/// # Errors
	///
	/// See [`invoke_action`] and [`render`](`Runtime::render`). On dispatch errors, the committed state is unchanged.
	pub fn handle_click_event(&self, context: &ScopeContext, action: &str, state: &Value) -> Result<()> {
		self.dispatch(EventKind::Click, context, action, state)
	}

	/// Like [`handle_click_event`](`Runtime::handle_click_event`), for form submissions.
	///
	/// # Errors
	///
	/// See [`handle_click_event`](`Runtime::handle_click_event`).
	pub fn handle_submit_event(&self, context: &ScopeContext, action: &str, state: &Value) -> Result<()> {
		self.dispatch(EventKind::Submit, context, action, state)
	}

	#[instrument(skip(self, context, state), fields(scope = context.scope_module.path()))]
	fn dispatch(&self, event: EventKind, context: &ScopeContext, action: &str, state: &Value) -> Result<()> {
		let next = invoke_action(&context.scope_module, action, state).map_err(|error| {
			error!("Dispatch failed: {}", error);
			error
		})?;
		self.commit_state(next);
		self.render()
	}

	fn commit_state(&self, state: Value) {
		if cfg!(feature = "dangerous-logging") {
			debug!(?state, "Committing state.");
		} else {
			debug!(ty = %state.ty(), "Committing state.");
		}
		*self.0.state.borrow_mut() = state;
	}

	fn sink(&self) -> Rc<dyn EventSink> {
		Rc::new(RuntimeHandle(Rc::downgrade(&self.0)))
	}
}

impl Debug for Runtime {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Runtime")
			.field("registry", &self.0.registry)
			.field("options", &self.0.options)
			.field("page_module", &self.0.page_module)
			.field("reconciler", &self.0.reconciler)
			.finish_non_exhaustive()
	}
}

/// What bound handlers hold on to. Doesn't keep the runtime alive.
struct RuntimeHandle(Weak<RuntimeInner>);

impl EventSink for RuntimeHandle {
	fn handle_event(&self, event: EventKind, context: &ScopeContext, action: &str, state: &Value) -> Result<()> {
		let runtime = Runtime(self.0.upgrade().ok_or(Error::Detached)?);
		match event {
			EventKind::Click => runtime.handle_click_event(context, action, state),
			EventKind::Submit => runtime.handle_submit_event(context, action, state),
		}
	}
}
