//! Mapping of generic JSON records onto caller-defined types.
//!
//! Salesforce field names are case-insensitive (`Name`, `name`, and `NAME` all address the
//! same field), so struct fields are matched against record keys without regard to ASCII
//! case, at every nesting level. Everything else is plain serde: derive [`Deserialize`] on the
//! target, use `#[serde(rename = "...")]` where Rust and API names differ, and register
//! datetime coercion through [`Timestamp`](crate::query::Timestamp).

// crates.io
use serde::{
	Deserializer,
	de::{
		DeserializeOwned, IntoDeserializer, Visitor,
		value::{MapDeserializer, SeqDeserializer},
	},
	forward_to_deserialize_any,
};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::DecodeError};

/// A single record as returned by the API.
pub type Record = Map<String, Value>;

/// Decodes a list of records into `T`, typically `Vec<YourStruct>`.
pub fn decode<T>(records: Vec<Record>) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	from_value(Value::Array(records.into_iter().map(Value::Object).collect()))
}

/// Decodes one record into `T`.
pub fn decode_record<T>(record: Record) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	from_value(Value::Object(record))
}

fn from_value<T>(value: Value) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(CaseInsensitive(value))
		.map_err(|source| DecodeError::Records { source })
}

/// [`Value`] deserializer that resolves struct field names case-insensitively.
struct CaseInsensitive(Value);
impl<'de> Deserializer<'de> for CaseInsensitive {
	type Error = serde_json::Error;

	forward_to_deserialize_any! {
		bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string bytes byte_buf
		unit unit_struct seq tuple tuple_struct map identifier ignored_any
	}

	fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
	where
		V: Visitor<'de>,
	{
		match self.0 {
			Value::Array(items) => visit_array(items, visitor),
			Value::Object(map) => visit_object(map, &[], visitor),
			other => other.deserialize_any(visitor),
		}
	}

	fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
	where
		V: Visitor<'de>,
	{
		match self.0 {
			Value::Null => visitor.visit_none(),
			other => visitor.visit_some(CaseInsensitive(other)),
		}
	}

	fn deserialize_newtype_struct<V>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, Self::Error>
	where
		V: Visitor<'de>,
	{
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_struct<V>(
		self,
		_name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Self::Error>
	where
		V: Visitor<'de>,
	{
		match self.0 {
			Value::Object(map) => visit_object(map, fields, visitor),
			other => CaseInsensitive(other).deserialize_any(visitor),
		}
	}

	fn deserialize_enum<V>(
		self,
		name: &'static str,
		variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, Self::Error>
	where
		V: Visitor<'de>,
	{
		self.0.deserialize_enum(name, variants, visitor)
	}
}
impl<'de> IntoDeserializer<'de, serde_json::Error> for CaseInsensitive {
	type Deserializer = Self;

	fn into_deserializer(self) -> Self::Deserializer {
		self
	}
}

fn visit_array<'de, V>(items: Vec<Value>, visitor: V) -> Result<V::Value, serde_json::Error>
where
	V: Visitor<'de>,
{
	let mut seq: SeqDeserializer<_, serde_json::Error> =
		SeqDeserializer::new(items.into_iter().map(CaseInsensitive));
	let value = visitor.visit_seq(&mut seq)?;

	seq.end()?;

	Ok(value)
}

fn visit_object<'de, V>(
	map: Map<String, Value>,
	fields: &'static [&'static str],
	visitor: V,
) -> Result<V::Value, serde_json::Error>
where
	V: Visitor<'de>,
{
	let entries =
		map.into_iter().map(|(key, value)| (canonical_key(fields, key), CaseInsensitive(value)));
	let mut map: MapDeserializer<'de, _, serde_json::Error> = MapDeserializer::new(entries);
	let value = visitor.visit_map(&mut map)?;

	map.end()?;

	Ok(value)
}

/// Renames `key` to the declared field it matches ignoring ASCII case; exact matches win.
fn canonical_key(fields: &'static [&'static str], key: String) -> String {
	if fields.contains(&key.as_str()) {
		return key;
	}

	match fields.iter().find(|field| field.eq_ignore_ascii_case(&key)) {
		Some(field) => (*field).to_owned(),
		None => key,
	}
}
