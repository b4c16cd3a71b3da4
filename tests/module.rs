use relay_dom::{dispatch::invoke_action, value::map_put, Action, Clause, Error, Module, Registry, Value};

fn labelled(label: &'static str) -> Clause {
	Clause::new(vec![Value::atom("go"), Value::Placeholder, Value::Placeholder], move |args| map_put(&args[2], &Value::atom("by"), Value::string(label)))
}

#[test]
fn resolves_registered_modules() {
	let registry = Registry::with_modules(vec![Module::new("App.Page", Vec::new), Module::new("App.Components.Button", Vec::new)]).unwrap();

	assert_eq!(registry.len(), 2);
	assert_eq!(registry.resolve("App.Components.Button").unwrap().path(), "App.Components.Button");
}

#[test]
fn unknown_paths_fail() {
	let registry = Registry::with_modules(vec![Module::new("App.Page", Vec::new)]).unwrap();

	assert_eq!(registry.resolve("App.Other").unwrap_err(), Error::UnknownModule("App.Other".to_owned()));
	// No path normalisation or evaluation of any kind.
	assert_eq!(registry.resolve("AppPage").unwrap_err(), Error::UnknownModule("AppPage".to_owned()));
}

#[test]
fn rejects_duplicates_and_malformed_paths() {
	let mut registry = Registry::new();
	registry.register(Module::new("App.Page", Vec::new)).unwrap();

	assert_eq!(registry.register(Module::new("App.Page", Vec::new)), Err(Error::DuplicateModule("App.Page".to_owned())));
	for path in ["", "App..Page", ".App", "App.Page.", "App.(eval)"] {
		assert_eq!(registry.register(Module::new(path, Vec::new)), Err(Error::InvalidModulePath(path.to_owned())));
	}
	assert_eq!(registry.len(), 1);
}

#[test]
fn first_matching_clause_wins() {
	let module = Module::new("App.Page", Vec::new).with_action(Action::new(vec![
		Clause::new(vec![Value::atom("stop"), Value::Placeholder, Value::Placeholder], |args| Ok(args[2].clone())),
		labelled("first"),
		labelled("second"),
	]));

	let next = invoke_action(&module, "go", &Value::empty_map()).unwrap();
	assert_eq!(next.dot(&Value::atom("by")).unwrap(), Value::string("first"));
}

#[test]
fn no_matching_clause_is_an_error() {
	let module = Module::new("App.Page", Vec::new).with_action(Action::default().clause(labelled("only")));

	assert_eq!(
		invoke_action(&module, "stay", &Value::empty_map()),
		Err(Error::NoMatchingClause {
			module: "App.Page".to_owned(),
			action: "stay".to_owned(),
		})
	);
}

#[test]
fn arity_is_part_of_matching() {
	let module = Module::new("App.Page", Vec::new).with_action(Action::new(vec![labelled("three")]));

	assert!(matches!(module.call_action(&[Value::atom("go"), Value::empty_map()]), Err(Error::NoMatchingClause { .. })));
}

#[test]
fn modules_without_action_cant_be_dispatched_to() {
	let module = Module::new("App.Static", Vec::new);

	assert_eq!(invoke_action(&module, "go", &Value::empty_map()), Err(Error::MissingActionHandler("App.Static".to_owned())));
}
