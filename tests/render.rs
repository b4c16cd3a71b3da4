use pretty_assertions::assert_eq;
use relay_dom::{
	host::{DomPatcher, ReadyState},
	memory::{MemoryDocument, MemoryDom},
	value::{add, dot_access, map_put, Type},
	vnode::{EventKind, VNode},
	Action, Clause, Error, Module, Options, Registry, Result, Runtime, TemplateNode, Value,
};
use std::{cell::Cell, rc::Rc};

const NO_ATTRS: [(&str, &str); 0] = [];

fn count() -> Value {
	Value::atom("count")
}

fn counter_page() -> Module {
	Module::new("App.CounterPage", || {
		vec![TemplateNode::element(
			"main",
			NO_ATTRS,
			vec![
				TemplateNode::element("p", vec![("id", "count")], vec![TemplateNode::text("Count: "), TemplateNode::expression(|state| dot_access(state, &count()))]),
				TemplateNode::element("button", vec![("id", "increment"), ("on_click", "increment")], vec![TemplateNode::text("+")]),
				TemplateNode::element("button", vec![("id", "bogus"), ("on_click", "explode")], vec![TemplateNode::text("?")]),
				TemplateNode::element("button", vec![("id", "corrupt"), ("on_click", "corrupt")], vec![TemplateNode::text("!")]),
				TemplateNode::component("App.Greeter", vec![TemplateNode::element("form", vec![("id", "greet"), ("on_submit", "greet")], vec![])]),
			],
		)]
	})
	.with_action(Action::new(vec![
		Clause::new(vec![Value::atom("increment"), Value::Placeholder, Value::Placeholder], |args| {
			let next = add(&dot_access(&args[2], &count())?, &Value::Integer(1))?;
			map_put(&args[2], &count(), next)
		}),
		Clause::new(vec![Value::atom("corrupt"), Value::Placeholder, Value::Placeholder], |args| map_put(&args[2], &count(), Value::atom("corrupted"))),
	]))
}

fn greeter() -> Module {
	Module::new("App.Greeter", Vec::new).with_action(Action::new(vec![Clause::new(vec![Value::atom("greet"), Value::Placeholder, Value::Placeholder], |args| {
		map_put(&args[2], &Value::atom("greeted"), Value::string("yes"))
	})]))
}

fn hello_page() -> Module {
	Module::new("App.HelloPage", || vec![TemplateNode::text("Hello"), TemplateNode::expression(|state| dot_access(state, &Value::atom("name")))])
}

fn registry() -> Registry {
	Registry::with_modules(vec![counter_page(), greeter(), hello_page()]).unwrap()
}

fn runtime(dom: &MemoryDom, document: &MemoryDocument) -> Runtime {
	Runtime::new(registry(), Box::new(dom.clone()), Box::new(document.clone()), Options::default())
}

fn initial_state() -> Value {
	Value::map_from(vec![(count(), Value::Integer(0))]).unwrap()
}

fn ready() -> MemoryDocument {
	MemoryDocument::new(ReadyState::Complete)
}

#[test]
fn renders_text_and_expressions() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());

	runtime
		.handle_new_page("App.HelloPage", Value::map_from(vec![(Value::atom("name"), Value::string("Ada"))]).unwrap())
		.unwrap();

	assert_eq!(dom.text_content(), "HelloAda");
}

#[test]
fn rerendering_unchanged_state_mutates_nothing() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());

	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	let after_first = dom.mutation_count();
	assert!(after_first > 0);

	runtime.render().unwrap();
	assert_eq!(dom.mutation_count(), after_first);
}

#[test]
fn server_rendered_markup_is_adopted_as_is() {
	let markup = VNode::element(
		"body",
		NO_ATTRS,
		vec![VNode::element(
			"main",
			NO_ATTRS,
			vec![
				VNode::element("p", vec![("id", "count")], vec![VNode::text("Count: "), VNode::text("0")]),
				VNode::element("button", vec![("id", "increment")], vec![VNode::text("+")]),
				VNode::element("button", vec![("id", "bogus")], vec![VNode::text("?")]),
				VNode::element("button", vec![("id", "corrupt")], vec![VNode::text("!")]),
				VNode::element("form", vec![("id", "greet")], vec![]),
			],
		)],
	);
	let dom = MemoryDom::with_root(markup);
	let runtime = runtime(&dom, &ready());

	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();

	assert_eq!(dom.mutation_count(), 0);
	// Listeners are bound regardless.
	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert_eq!(dom.text_content(), "Count: 1+?!");
}

#[test]
fn click_dispatches_and_rerenders_minimally() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());
	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	let before = dom.mutation_count();

	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());

	assert_eq!(runtime.state().dot(&count()).unwrap(), Value::Integer(2));
	assert_eq!(dom.text_content(), "Count: 2+?!");
	assert_eq!(dom.mutation_count(), before + 2);
}

#[test]
fn unmatched_click_is_reported_and_keeps_state() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());
	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	dom.fire_by_id("increment", EventKind::Click).unwrap();
	let mutations = dom.mutation_count();

	let result = dom.fire_by_id("bogus", EventKind::Click);

	assert_eq!(
		result,
		Err(Error::NoMatchingClause {
			module: "App.CounterPage".to_owned(),
			action: "explode".to_owned(),
		})
	);
	assert_eq!(runtime.state().dot(&count()).unwrap(), Value::Integer(1));
	assert_eq!(dom.mutation_count(), mutations);
}

#[test]
fn component_actions_are_scoped_to_the_component() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());
	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();

	assert!(dom.fire_by_id("greet", EventKind::Submit).unwrap());
	assert!(!dom.fire_by_id("greet", EventKind::Click).unwrap());

	let state = runtime.state();
	assert_eq!(state.dot(&Value::atom("greeted")).unwrap(), Value::string("yes"));
	assert_eq!(state.dot(&count()).unwrap(), Value::Integer(0));
}

#[test]
fn failed_render_leaves_the_dom_untouched() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());
	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	let before = dom.root();
	let mutations = dom.mutation_count();

	let result = dom.fire_by_id("corrupt", EventKind::Click);

	assert_eq!(
		result,
		Err(Error::UnsupportedValueType {
			operation: "interpolate",
			ty: Type::Atom,
		})
	);
	assert_eq!(dom.text_content(), before.text_content());
	assert_eq!(dom.mutation_count(), mutations);

	// The last good render is still the baseline, and its listeners still carry the state they captured.
	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert_eq!(dom.text_content(), "Count: 1+?!");
	assert_eq!(dom.mutation_count(), mutations + 1);
}

#[test]
fn initial_render_waits_for_the_document() {
	let dom = MemoryDom::new("body");
	let document = MemoryDocument::new(ReadyState::Loading);
	let runtime = runtime(&dom, &document);

	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	assert_eq!(dom.mutation_count(), 0);
	assert_eq!(document.pending_callbacks(), 1);

	document.finish_loading();
	assert_eq!(dom.text_content(), "Count: 0+?!");
	assert_eq!(document.pending_callbacks(), 0);

	let mutations = dom.mutation_count();
	document.finish_loading();
	assert_eq!(dom.mutation_count(), mutations);
}

#[test]
fn unknown_page_is_rejected() {
	let dom = MemoryDom::new("body");
	let runtime = runtime(&dom, &ready());

	assert_eq!(runtime.handle_new_page("App.Nowhere", initial_state()), Err(Error::UnknownModule("App.Nowhere".to_owned())));
	assert_eq!(runtime.render(), Err(Error::NoPage));
}

#[test]
fn singleton_lifecycle() {
	let dom = MemoryDom::new("body");
	let document = ready();
	assert!(Runtime::current().is_none());

	Runtime::get_or_init(|| runtime(&dom, &document)).handle_new_page("App.CounterPage", initial_state()).unwrap();
	Runtime::get_or_init(|| panic!("Created twice.")).render().unwrap();
	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert_eq!(Runtime::current().unwrap().state().dot(&count()).unwrap(), Value::Integer(1));

	drop(Runtime::teardown());
	assert!(Runtime::current().is_none());
	assert_eq!(dom.fire_by_id("increment", EventKind::Click), Err(Error::Detached));
}

#[test]
fn server_markup_comments_and_whitespace_are_patched_over() {
	let markup = VNode::element(
		"body",
		NO_ATTRS,
		vec![
			VNode::comment(" rendered on the server "),
			VNode::text("\n  "),
			VNode::element("main", NO_ATTRS, vec![VNode::element("p", vec![("id", "count")], vec![VNode::text("stale")])]),
			VNode::text("\n"),
		],
	);
	let dom = MemoryDom::with_root(markup);
	let runtime = runtime(&dom, &ready());

	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();

	assert_eq!(dom.root().as_element().unwrap().children.len(), 1);
	assert_eq!(dom.text_content(), "Count: 0+?!");
	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert_eq!(dom.text_content(), "Count: 1+?!");
}

fn nested(levels: usize) -> TemplateNode {
	let mut node = TemplateNode::text("deep");
	for _ in 0..levels {
		node = TemplateNode::element("div", NO_ATTRS, vec![node]);
	}
	node
}

#[test]
fn depth_limit_boundary_rerenders_cleanly() {
	let registry = Registry::with_modules(vec![
		Module::new("App.FitsPage", || vec![nested(3)]),
		Module::new("App.TooDeepPage", || vec![nested(4)]),
	])
	.unwrap();
	let dom = MemoryDom::new("body");
	let runtime = Runtime::new(registry, Box::new(dom.clone()), Box::new(ready()), Options::default().depth_limit(4));

	runtime.handle_new_page("App.FitsPage", Value::empty_map()).unwrap();
	let mutations = dom.mutation_count();
	runtime.render().unwrap();
	assert_eq!(dom.mutation_count(), mutations);

	assert_eq!(runtime.handle_new_page("App.TooDeepPage", Value::empty_map()), Err(Error::DepthLimit(4)));
	assert_eq!(dom.text_content(), "deep");
}

#[test]
fn repeated_attributes_rerender_without_mutations() {
	let registry = Registry::with_modules(vec![Module::new("App.StyledPage", || {
		vec![TemplateNode::element("p", vec![("class", "a"), ("class", "b")], vec![TemplateNode::text("styled")])]
	})])
	.unwrap();
	let dom = MemoryDom::new("body");
	let runtime = Runtime::new(registry, Box::new(dom.clone()), Box::new(ready()), Options::default());

	runtime.handle_new_page("App.StyledPage", Value::empty_map()).unwrap();
	let mutations = dom.mutation_count();
	runtime.render().unwrap();

	assert_eq!(dom.mutation_count(), mutations);
	assert_eq!(dom.root().node_at(&[0]).unwrap().as_element().unwrap().attribute("class"), Some("b"));
}

#[test]
fn rendering_from_within_a_render_is_rejected() {
	let registry = Registry::with_modules(vec![Module::new("App.ReentrantPage", || {
		vec![TemplateNode::expression(|_| {
			Runtime::current().ok_or(Error::Detached)?.render()?;
			Ok(Value::string("nested render"))
		})]
	})])
	.unwrap();
	let dom = MemoryDom::new("body");
	let runtime = Runtime::new(registry, Box::new(dom.clone()), Box::new(ready()), Options::default());
	Runtime::install(runtime.clone());

	assert_eq!(runtime.handle_new_page("App.ReentrantPage", Value::empty_map()), Err(Error::RenderInProgress));
	assert_eq!(dom.mutation_count(), 0);

	drop(Runtime::teardown());
}

/// Applies patches to a [`MemoryDom`], but can be told to report failure afterwards, like a host that fails mid-patch.
struct FailingPatcher {
	dom: MemoryDom,
	fail_next: Rc<Cell<bool>>,
	captures: Rc<Cell<usize>>,
}

impl DomPatcher for FailingPatcher {
	fn to_vnode(&mut self) -> Result<VNode> {
		self.captures.set(self.captures.get() + 1);
		self.dom.to_vnode()
	}

	fn patch(&mut self, old: &VNode, new: &VNode, depth_limit: usize) -> Result<()> {
		self.dom.patch(old, new, depth_limit)?;
		if self.fail_next.replace(false) {
			return Err(Error::Patch("host went away".to_owned()));
		}
		Ok(())
	}
}

#[test]
fn failed_patch_recaptures_the_container() {
	let dom = MemoryDom::new("body");
	let fail_next = Rc::new(Cell::new(false));
	let captures = Rc::new(Cell::new(0));
	let patcher = FailingPatcher {
		dom: dom.clone(),
		fail_next: fail_next.clone(),
		captures: captures.clone(),
	};
	let runtime = Runtime::new(registry(), Box::new(patcher), Box::new(ready()), Options::default());
	runtime.handle_new_page("App.CounterPage", initial_state()).unwrap();
	assert_eq!(captures.get(), 1);

	fail_next.set(true);
	assert_eq!(dom.fire_by_id("increment", EventKind::Click), Err(Error::Patch("host went away".to_owned())));
	assert_eq!(dom.text_content(), "Count: 1+?!");

	let mutations = dom.mutation_count();
	runtime.render().unwrap();
	assert_eq!(captures.get(), 2);
	assert_eq!(dom.mutation_count(), mutations);

	assert!(dom.fire_by_id("increment", EventKind::Click).unwrap());
	assert_eq!(dom.text_content(), "Count: 2+?!");
	assert_eq!(captures.get(), 2);
}
