//! Binding reserved event attributes to handlers and resolving them to action clauses when they fire.

use crate::{
	module::Module,
	value::Value,
	vnode::{EventKind, Listener},
	vtree::ScopeContext,
	Result,
};
use std::rc::Rc;
use tracing::{instrument, trace};

/// Receives events from bound handlers. Implemented by the [`Runtime`](`crate::runtime::Runtime`)'s handle.
pub trait EventSink {
	/// Called when a bound DOM event fires, with exactly what was captured at render time.
	///
	/// # Errors
	///
	/// Dispatch failures must be returned, never swallowed.
	fn handle_event(&self, event: EventKind, context: &ScopeContext, action: &str, state: &Value) -> Result<()>;
}

/// Creates one [`Listener`] per reserved event attribute in `attrs`,
/// each capturing `context`, the attribute's handler id and `state`.
pub fn bind_event_handlers(attrs: &[(String, String)], context: &ScopeContext, state: &Value, sink: &Rc<dyn EventSink>) -> Vec<Listener> {
	attrs
		.iter()
		.filter_map(|(name, action)| {
			let event = EventKind::from_attribute(name)?;
			trace!(event = event.name(), action = action.as_str(), scope = context.scope_module.path(), "Binding event handler.");

			let sink = sink.clone();
			let context = context.clone();
			let action = action.clone();
			let state = state.clone();
			Some(Listener {
				event,
				handler: Rc::new(move || sink.handle_event(event, &context, &action, &state)),
			})
		})
		.collect()
}

/// `attrs` without reserved event binding keys, as handed to the DOM.
///
/// Each name appears once, at its first position. If a name repeats, the last value wins.
#[must_use]
pub fn filter_attributes(attrs: &[(String, String)]) -> Vec<(String, String)> {
	let mut filtered: Vec<(String, String)> = Vec::with_capacity(attrs.len());
	for (name, value) in attrs.iter().filter(|(name, _)| EventKind::from_attribute(name).is_none()) {
		match filtered.iter_mut().find(|(n, _)| n == name) {
			Some(existing) => {
				trace!(name = name.as_str(), "Repeated attribute. The last value wins.");
				existing.1 = value.clone();
			}
			None => filtered.push((name.clone(), value.clone())),
		}
	}
	filtered
}

/// Invokes `module`'s action for `action` with the state captured at render time, returning the next state.
///
/// The action is called with `[action, params, state]`, where `action` is an atom and `params` an empty map.
///
/// # Errors
///
/// [`Error::MissingActionHandler`](`crate::Error::MissingActionHandler`),
/// [`Error::NoMatchingClause`](`crate::Error::NoMatchingClause`) or the clause's own error.
#[instrument(skip(module, state), fields(module = module.path()))]
pub fn invoke_action(module: &Module, action: &str, state: &Value) -> Result<Value> {
	let args = [Value::atom(action), Value::empty_map(), state.clone()];
	module.call_action(&args)
}
