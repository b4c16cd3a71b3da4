use crate::value::Type;
use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong while rendering or dispatching.
///
/// None of these are recoverable by retrying the same operation:
/// They point either at an incomplete value implementation or at a mismatch between templates and loaded modules.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
	/// An operation has no defined behaviour for this value type.
	#[error("unsupported value type `{ty}` for {operation}")]
	UnsupportedValueType { operation: &'static str, ty: Type },

	/// A template referenced a module path that was never registered.
	#[error("unknown module `{0}`")]
	UnknownModule(String),

	#[error("module `{0}` is already registered")]
	DuplicateModule(String),

	#[error("invalid module path `{0:?}`")]
	InvalidModulePath(String),

	/// None of the action's clauses matched the dispatched arguments.
	#[error("no clause of the `{module}` action matches `{action}`")]
	NoMatchingClause { module: String, action: String },

	#[error("module `{0}` has no action handler")]
	MissingActionHandler(String),

	#[error("key `{0}` not found in map")]
	MissingKey(String),

	#[error("integer overflow in {0}")]
	IntegerOverflow(&'static str),

	#[error("template depth limit ({0}) reached")]
	DepthLimit(usize),

	#[error("no page has been loaded")]
	NoPage,

	/// A render was requested while another one was still running on the same runtime.
	#[error("render already in progress")]
	RenderInProgress,

	#[error("DOM patch failed: {0}")]
	Patch(String),

	#[error("host environment error: {0}")]
	Host(String),

	/// An event handler outlived the runtime that bound it.
	#[error("runtime has been torn down")]
	Detached,
}
