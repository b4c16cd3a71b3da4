//! Clause selection for action dispatch.
//!
//! Matching is deliberately shallow: Apart from placeholders, only the type tag is compared,
//! and atoms additionally compare their name. Integers, strings and maps of the same type always match.

use crate::value::Value;
use tracing::trace;

/// Whether a single `argument` satisfies `pattern`.
#[must_use]
pub fn is_matched(pattern: &Value, argument: &Value) -> bool {
	match (pattern, argument) {
		(Value::Placeholder, _) => true,
		(Value::Atom(p), Value::Atom(a)) => p == a,
		(pattern, argument) => pattern.ty() == argument.ty(),
	}
}

/// Whether `args` satisfies `params` position by position. Arities must be equal.
#[must_use]
pub fn match_args(params: &[Value], args: &[Value]) -> bool {
	if params.len() != args.len() {
		trace!(params = params.len(), args = args.len(), "Arity mismatch.");
		return false;
	}

	params.iter().zip(args).all(|(p, a)| is_matched(p, a))
}
