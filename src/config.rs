//! Validated configuration values shared by flows and the query pager.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::ConfigError};

/// REST API version used when the broker is not configured otherwise.
pub const DEFAULT_API_VERSION: &str = "v63.0";

const TOKEN_PATH: &str = "/services/oauth2/token";
const DATA_PATH: &str = "/services/data/";

/// Salesforce REST API version such as `v63.0`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(String);
impl ApiVersion {
	/// Creates a new version after validating its `v<major>.<minor>` shape.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ConfigError> {
		let view = value.as_ref();

		validate_version(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Path prefix every data endpoint lives under, e.g. `/services/data/v63.0`.
	pub fn data_prefix(&self) -> String {
		format!("{DATA_PATH}{}", self.0)
	}
}
impl Default for ApiVersion {
	fn default() -> Self {
		Self(DEFAULT_API_VERSION.into())
	}
}
impl Deref for ApiVersion {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ApiVersion {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ApiVersion> for String {
	fn from(value: ApiVersion) -> Self {
		value.0
	}
}
impl TryFrom<String> for ApiVersion {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_version(&value)?;

		Ok(Self(value))
	}
}
impl Debug for ApiVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ApiVersion({})", self.0)
	}
}
impl Display for ApiVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ApiVersion {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Login or instance domain, stored without a trailing slash.
///
/// Accepts `http` and `https` URLs; anything else (including bare host names) is rejected so
/// request URLs can be built by plain concatenation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);
impl Domain {
	/// Parses and normalizes a domain URL.
	pub fn parse(value: impl AsRef<str>) -> Result<Self, ConfigError> {
		let raw = value.as_ref().trim();
		let url = Url::parse(raw)
			.map_err(|source| ConfigError::InvalidUrl { url: raw.into(), source: Some(source) })?;

		if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
			return Err(ConfigError::InvalidUrl { url: raw.into(), source: None });
		}

		Ok(Self(raw.trim_end_matches('/').to_owned()))
	}

	/// Borrow the normalized domain.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// OAuth token endpoint hosted by this domain.
	pub fn token_url(&self) -> String {
		format!("{}{TOKEN_PATH}", self.0)
	}

	/// Absolute URL for a path relative to the versioned data API.
	pub fn data_url(&self, version: &ApiVersion, path: &str) -> String {
		format!("{}{}{path}", self.0, version.data_prefix())
	}
}
impl Deref for Domain {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Domain {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Domain> for String {
	fn from(value: Domain) -> Self {
		value.0
	}
}
impl TryFrom<String> for Domain {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
impl Debug for Domain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Domain({})", self.0)
	}
}
impl Display for Domain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for Domain {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

fn validate_version(view: &str) -> Result<(), ConfigError> {
	let valid = view
		.strip_prefix('v')
		.and_then(|rest| rest.split_once('.'))
		.is_some_and(|(major, minor)| {
			!major.is_empty()
				&& !minor.is_empty()
				&& major.bytes().all(|b| b.is_ascii_digit())
				&& minor.bytes().all(|b| b.is_ascii_digit())
		});

	if valid { Ok(()) } else { Err(ConfigError::InvalidApiVersion(view.into())) }
}
