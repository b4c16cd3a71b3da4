//! Component definitions and the closed registry they are resolved from.

use crate::{pattern::match_args, template::TemplateNode, value::Value, Error, Result};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::{instrument, trace};

pub type TemplateFn = Rc<dyn Fn() -> Vec<TemplateNode>>;
pub type ClauseBody = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// One function clause of an [`Action`]: parameter patterns and the body to run if they match.
#[derive(Clone)]
pub struct Clause {
	params: Vec<Value>,
	body: ClauseBody,
}

impl Clause {
	pub fn new(params: Vec<Value>, body: impl Fn(&[Value]) -> Result<Value> + 'static) -> Self {
		Self { params, body: Rc::new(body) }
	}

	#[must_use]
	pub fn params(&self) -> &[Value] {
		&self.params
	}
}

impl Debug for Clause {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Clause").field("params", &self.params).finish_non_exhaustive()
	}
}

/// An ordered list of clauses. The first clause whose parameters match wins.
#[derive(Debug, Clone, Default)]
pub struct Action {
	clauses: Vec<Clause>,
}

impl Action {
	#[must_use]
	pub fn new(clauses: Vec<Clause>) -> Self {
		Self { clauses }
	}

	#[must_use]
	pub fn clause(mut self, clause: Clause) -> Self {
		self.clauses.push(clause);
		self
	}

	/// Returns the first clause matching `args`, in declaration order.
	#[must_use]
	pub fn select(&self, args: &[Value]) -> Option<&Clause> {
		self.clauses.iter().enumerate().find_map(|(i, clause)| {
			let matched = match_args(&clause.params, args);
			trace!(clause = i, matched);
			if matched {
				Some(clause)
			} else {
				None
			}
		})
	}
}

/// A loaded component definition.
#[derive(Clone)]
pub struct Module {
	path: String,
	template: TemplateFn,
	action: Option<Action>,
}

impl Module {
	pub fn new(path: impl Into<String>, template: impl Fn() -> Vec<TemplateNode> + 'static) -> Self {
		Self {
			path: path.into(),
			template: Rc::new(template),
			action: None,
		}
	}

	#[must_use]
	pub fn with_action(mut self, action: Action) -> Self {
		self.action = Some(action);
		self
	}

	#[must_use]
	pub fn path(&self) -> &str {
		&self.path
	}

	#[must_use]
	pub fn action(&self) -> Option<&Action> {
		self.action.as_ref()
	}

	#[must_use]
	pub fn template(&self) -> Vec<TemplateNode> {
		(self.template)()
	}

	/// Runs the first clause of this module's action that matches `args`.
	///
	/// # Errors
	///
	/// [`Error::MissingActionHandler`] if the module has no action,
	/// [`Error::NoMatchingClause`] if no clause matches, or whatever the clause body returns.
	#[instrument(skip(self, args), fields(module = %self.path))]
	pub fn call_action(&self, args: &[Value]) -> Result<Value> {
		let action = self.action.as_ref().ok_or_else(|| Error::MissingActionHandler(self.path.clone()))?;
		match action.select(args) {
			Some(clause) => (clause.body)(args),
			None => Err(Error::NoMatchingClause {
				module: self.path.clone(),
				action: match args.first() {
					Some(Value::Atom(name)) => name.clone(),
					Some(other) => format!("{:?}", other),
					None => String::new(),
				},
			}),
		}
	}
}

impl Debug for Module {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module").field("path", &self.path).field("action", &self.action).finish_non_exhaustive()
	}
}

/// Maps canonical dotted module paths (like `App.Counter`) to their definitions.
///
/// This is the only way templates can reach a module. Populate it once at startup.
#[derive(Debug, Default)]
pub struct Registry {
	modules: HashMap<String, Rc<Module>>,
}

impl Registry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// # Errors
	///
	/// [`Error::InvalidModulePath`] unless the path is a `.`-separated list of non-empty alphanumeric (or `_`) segments,
	/// [`Error::DuplicateModule`] if the path is taken.
	#[instrument(skip(self, module), fields(path = module.path()))]
	pub fn register(&mut self, module: Module) -> Result<()> {
		if !is_canonical(module.path()) {
			return Err(Error::InvalidModulePath(module.path().to_owned()));
		}
		if self.modules.contains_key(module.path()) {
			return Err(Error::DuplicateModule(module.path().to_owned()));
		}
		self.modules.insert(module.path().to_owned(), Rc::new(module));
		Ok(())
	}

	/// # Errors
	///
	/// See [`register`](`Registry::register`).
	pub fn with_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
		let mut registry = Self::new();
		for module in modules {
			registry.register(module)?;
		}
		Ok(registry)
	}

	/// # Errors
	///
	/// [`Error::UnknownModule`] iff `path` was never registered.
	pub fn resolve(&self, path: &str) -> Result<Rc<Module>> {
		self.modules.get(path).cloned().ok_or_else(|| Error::UnknownModule(path.to_owned()))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.modules.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}

fn is_canonical(path: &str) -> bool {
	path.split('.').all(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}
