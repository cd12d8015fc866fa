//! Timestamp coercion for record fields.
//!
//! Salesforce delivers datetimes either as `2024-01-02T03:04:05.000+0000` strings or as
//! milliseconds since the Unix epoch (integer or float, depending on the endpoint). Register
//! the coercion per field in one of two ways:
//!
//! - declare the field as [`Timestamp`] (or `Option<Timestamp>`), or
//! - keep an [`OffsetDateTime`] field and annotate it with
//!   `#[serde(with = "sforce_broker::query::timestamp")]` (or `timestamp::option` for
//!   `Option<OffsetDateTime>`, together with `#[serde(default)]`).

// std
use std::ops::Deref;
// crates.io
use serde::{
	Deserializer,
	de::{Error as DeError, Unexpected, Visitor},
};
use time::{format_description::BorrowedFormatItem, macros::format_description};
// self
use crate::_prelude::*;

/// Wire format of datetime strings: `YYYY-MM-DDThh:mm:ss.sss±hhmm`.
pub const WIRE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
	"[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
);

/// Datetime field that accepts every wire representation Salesforce uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub OffsetDateTime);
impl Timestamp {
	/// Returns the wrapped instant.
	pub fn into_inner(self) -> OffsetDateTime {
		self.0
	}
}
impl Deref for Timestamp {
	type Target = OffsetDateTime;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl From<Timestamp> for OffsetDateTime {
	fn from(value: Timestamp) -> Self {
		value.0
	}
}
impl From<OffsetDateTime> for Timestamp {
	fn from(value: OffsetDateTime) -> Self {
		Self(value)
	}
}
impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserialize(deserializer).map(Self)
	}
}

/// Deserializes an [`OffsetDateTime`] from a wire string or epoch milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	deserializer.deserialize_any(TimestampVisitor)
}

/// Converts epoch milliseconds into an instant.
pub fn from_millis(millis: i64) -> Result<OffsetDateTime, time::error::ComponentRange> {
	OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}

pub mod option {
	//! `#[serde(with)]` adapter for `Option<OffsetDateTime>` fields; `null` maps to `None`.

	// self
	use super::*;

	/// Deserializes an optional timestamp.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_option(OptionVisitor)
	}

	struct OptionVisitor;
	impl<'de> Visitor<'de> for OptionVisitor {
		type Value = Option<OffsetDateTime>;

		fn expecting(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("an optional timestamp")
		}

		fn visit_none<E>(self) -> Result<Self::Value, E>
		where
			E: DeError,
		{
			Ok(None)
		}

		fn visit_unit<E>(self) -> Result<Self::Value, E>
		where
			E: DeError,
		{
			Ok(None)
		}

		fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
		where
			D: Deserializer<'de>,
		{
			super::deserialize(deserializer).map(Some)
		}
	}
}

struct TimestampVisitor;
impl<'de> Visitor<'de> for TimestampVisitor {
	type Value = OffsetDateTime;

	fn expecting(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("a `YYYY-MM-DDThh:mm:ss.sss+hhmm` string or epoch milliseconds")
	}

	fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
	where
		E: DeError,
	{
		OffsetDateTime::parse(v, WIRE_FORMAT)
			.map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
	}

	fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
	where
		E: DeError,
	{
		from_millis(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
	}

	fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
	where
		E: DeError,
	{
		let millis = i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;

		self.visit_i64(millis)
	}

	fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
	where
		E: DeError,
	{
		// Whole milliseconds only; the fractional part is dropped.
		let truncated = v.trunc();

		if !truncated.is_finite() || truncated.abs() > i64::MAX as f64 {
			return Err(E::invalid_value(Unexpected::Float(v), &self));
		}

		self.visit_i64(truncated as i64)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Stamped {
		#[serde(with = "crate::query::timestamp")]
		at: OffsetDateTime,
		#[serde(default, with = "crate::query::timestamp::option")]
		closed: Option<OffsetDateTime>,
	}

	#[test]
	fn string_and_millis_decode_to_the_same_instant() {
		let expected = macros::datetime!(2024-01-02 03:04:05 UTC);
		let from_str: Timestamp = serde_json::from_str("\"2024-01-02T03:04:05.000+0000\"")
			.expect("Wire strings should parse.");
		let from_int: Timestamp =
			serde_json::from_str("1704164645000").expect("Integer millis should parse.");
		let from_float: Timestamp =
			serde_json::from_str("1704164645000.9").expect("Float millis should parse.");

		assert_eq!(*from_str, expected);
		assert_eq!(from_int, from_str);
		assert_eq!(from_float, from_str);
	}

	#[test]
	fn offsets_are_honored() {
		let ts: Timestamp = serde_json::from_str("\"2024-01-02T05:04:05.250+0200\"")
			.expect("Offset strings should parse.");

		assert_eq!(*ts, macros::datetime!(2024-01-02 03:04:05.25 UTC));
		assert_eq!(from_millis(-1).expect("Pre-epoch millis are valid.").unix_timestamp(), -1);
	}

	#[test]
	fn serde_with_adapters_cover_optional_fields() {
		let stamped: Stamped = serde_json::from_str("{\"at\":1704164645000,\"closed\":null}")
			.expect("Adapter fields should parse.");

		assert_eq!(stamped.at, macros::datetime!(2024-01-02 03:04:05 UTC));
		assert_eq!(stamped.closed, None);

		let stamped: Stamped = serde_json::from_str(
			"{\"at\":\"2024-01-02T03:04:05.000+0000\",\"closed\":\"2024-01-03T00:00:00.000+0000\"}",
		)
		.expect("Optional adapter fields should parse.");

		assert_eq!(stamped.closed, Some(macros::datetime!(2024-01-03 00:00 UTC)));
	}

	#[test]
	fn rejects_other_shapes() {
		assert!(serde_json::from_str::<Timestamp>("\"2024-01-02\"").is_err());
		assert!(serde_json::from_str::<Timestamp>("\"2024-01-02T03:04:05Z\"").is_err());
		assert!(serde_json::from_str::<Timestamp>("true").is_err());
	}
}
