//! Runtime values as sent by the server, independent of JavaScript's native types.

use crate::{Error, Result};
use core::fmt::{self, Display, Formatter};
use hashbrown::HashMap;
use std::rc::Rc;

/// The type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
	Integer,
	Float,
	String,
	Atom,
	Map,
	Placeholder,
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Type::Integer => "integer",
			Type::Float => "float",
			Type::String => "string",
			Type::Atom => "atom",
			Type::Map => "map",
			Type::Placeholder => "placeholder",
		})
	}
}

/// A tagged runtime value.
///
/// Values are never mutated in place once shared:
/// [`Map`] payloads are reference-counted and copied on write,
/// and all primitives ([`add`], [`map_put`], [`dot_access`]) return new values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Integer(i64),
	Float(f64),
	String(String),
	Atom(String),
	Map(Map),
	/// Only meaningful as a pattern, where it matches anything.
	Placeholder,
}

impl Value {
	#[must_use]
	pub fn atom(name: impl Into<String>) -> Self {
		Self::Atom(name.into())
	}

	#[must_use]
	pub fn string(text: impl Into<String>) -> Self {
		Self::String(text.into())
	}

	#[must_use]
	pub fn empty_map() -> Self {
		Self::Map(Map::default())
	}

	/// Builds a map value from `(key, value)` pairs.
	///
	/// # Errors
	///
	/// Iff a key can't be encoded, see [`encode_key`].
	pub fn map_from(pairs: impl IntoIterator<Item = (Value, Value)>) -> Result<Self> {
		let mut map = Map::default();
		for (key, value) in pairs {
			map.insert(&key, value)?;
		}
		Ok(Self::Map(map))
	}

	#[must_use]
	pub fn ty(&self) -> Type {
		match self {
			Value::Integer(_) => Type::Integer,
			Value::Float(_) => Type::Float,
			Value::String(_) => Type::String,
			Value::Atom(_) => Type::Atom,
			Value::Map(_) => Type::Map,
			Value::Placeholder => Type::Placeholder,
		}
	}

	#[must_use]
	pub fn as_map(&self) -> Option<&Map> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_map_mut(&mut self) -> Option<&mut Map> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Structural copy that shares no storage with `self`.
	#[must_use]
	pub fn deep_clone(&self) -> Self {
		match self {
			Value::Map(map) => Value::Map(map.deep_clone()),
			other => other.clone(),
		}
	}

	/// Shorthand for [`dot_access`] with `self` as the map.
	///
	/// # Errors
	///
	/// See [`dot_access`].
	pub fn dot(&self, key: &Value) -> Result<Value> {
		dot_access(self, key)
	}

	fn unsupported(&self, operation: &'static str) -> Error {
		Error::UnsupportedValueType { operation, ty: self.ty() }
	}
}

/// Payload of a [`Value::Map`], keyed by [encoded keys](`encode_key`).
///
/// Cloning is cheap and shares storage. Every mutating method copies the storage first if it is shared,
/// so no other clone ever observes the change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(Rc<HashMap<String, Value>>);

impl Map {
	/// # Errors
	///
	/// Iff `key` can't be encoded.
	pub fn get(&self, key: &Value) -> Result<Option<&Value>> {
		Ok(self.0.get(&encode_key(key)?))
	}

	/// # Errors
	///
	/// Iff `key` can't be encoded.
	pub fn get_mut(&mut self, key: &Value) -> Result<Option<&mut Value>> {
		let key = encode_key(key)?;
		Ok(Rc::make_mut(&mut self.0).get_mut(&key))
	}

	/// Inserts or replaces the entry for `key`, returning the previous value.
	///
	/// # Errors
	///
	/// Iff `key` can't be encoded.
	pub fn insert(&mut self, key: &Value, value: Value) -> Result<Option<Value>> {
		let key = encode_key(key)?;
		Ok(Rc::make_mut(&mut self.0).insert(key, value))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over `(encoded key, value)` entries in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn deep_clone(&self) -> Self {
		Self(Rc::new(self.0.iter().map(|(k, v)| (k.clone(), v.deep_clone())).collect()))
	}
}

/// Renders a value as DOM text.
///
/// # Errors
///
/// [`Error::UnsupportedValueType`] for anything but integers and strings.
pub fn interpolate(value: &Value) -> Result<String> {
	match value {
		Value::Integer(integer) => Ok(integer.to_string()),
		Value::String(string) => Ok(string.clone()),
		other => Err(other.unsupported("interpolate")),
	}
}

/// Encodes a map key so that atoms and strings with the same text never collide.
///
/// # Errors
///
/// [`Error::UnsupportedValueType`] for anything but atoms and strings.
pub fn encode_key(key: &Value) -> Result<String> {
	match key {
		Value::Atom(atom) => Ok(format!("~atom[{}]", atom)),
		Value::String(string) => Ok(format!("~string[{}]", string)),
		other => Err(other.unsupported("encode_key")),
	}
}

/// Numeric addition. Two integers stay an integer, any other numeric combination becomes a float.
///
/// # Errors
///
/// [`Error::UnsupportedValueType`] for non-numeric operands, [`Error::IntegerOverflow`] if integer addition overflows.
#[allow(clippy::cast_precision_loss)]
pub fn add(left: &Value, right: &Value) -> Result<Value> {
	match (left, right) {
		(Value::Integer(l), Value::Integer(r)) => l.checked_add(*r).map(Value::Integer).ok_or(Error::IntegerOverflow("add")),
		(Value::Integer(l), Value::Float(r)) => Ok(Value::Float(*l as f64 + r)),
		(Value::Float(l), Value::Integer(r)) => Ok(Value::Float(l + *r as f64)),
		(Value::Float(l), Value::Float(r)) => Ok(Value::Float(l + r)),
		(Value::Integer(_), other) | (Value::Float(_), other) | (other, _) => Err(other.unsupported("add")),
	}
}

/// Returns a copy of `map` with `key` set to `value`. `map` itself is left untouched.
///
/// # Errors
///
/// [`Error::UnsupportedValueType`] if `map` is not a map or `key` can't be encoded.
pub fn map_put(map: &Value, key: &Value, value: Value) -> Result<Value> {
	let mut data = map.as_map().ok_or_else(|| map.unsupported("map_put"))?.clone();
	data.insert(key, value)?;
	Ok(Value::Map(data))
}

/// Looks up `key` in `map`, returning an independent copy of the entry.
///
/// # Errors
///
/// [`Error::UnsupportedValueType`] if `map` is not a map or `key` can't be encoded,
/// [`Error::MissingKey`] if there is no such entry.
pub fn dot_access(map: &Value, key: &Value) -> Result<Value> {
	let data = map.as_map().ok_or_else(|| map.unsupported("dot_access"))?;
	match data.get(key)? {
		Some(value) => Ok(value.deep_clone()),
		None => Err(Error::MissingKey(encode_key(key)?)),
	}
}
