//! Sequential pagination over the REST `query` endpoint.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Session,
	error::{DecodeError, TransportError, ValidationError},
	flows::Broker,
	http::{self, HttpTransport, TransportErrorMapper},
	obs::{self, FlowKind},
	query::{Record, decode},
};

/// Records returned by a query, decoded into the caller's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult<T> {
	/// Sum of the `totalSize` reported by every fetched page.
	pub total_size: u64,
	/// Decoded records, in server order across all pages.
	pub records: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
	total_size: u64,
	done: bool,
	#[serde(default)]
	next_records_url: Option<String>,
	#[serde(default)]
	records: Vec<Record>,
}

/// Running state of one query call.
#[derive(Debug)]
struct PageAccumulator {
	total_size: u64,
	done: bool,
	next_path: String,
	records: Vec<Record>,
}
impl PageAccumulator {
	fn new(soql: &str) -> Self {
		Self { total_size: 0, done: false, next_path: initial_path(soql), records: Vec::new() }
	}

	fn absorb(&mut self, page: QueryPage, data_prefix: &str) -> Result<(), DecodeError> {
		self.total_size = self.total_size.saturating_add(page.total_size);
		self.done = page.done;
		self.records.extend(page.records);

		if self.done {
			return Ok(());
		}

		match page.next_records_url.filter(|url| !url.is_empty()) {
			Some(url) => {
				self.next_path = continuation_path(&url, data_prefix).to_owned();

				Ok(())
			},
			None => Err(DecodeError::MissingNextRecordsUrl),
		}
	}
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + HttpTransport,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs `soql` and decodes every record across all result pages into `T`.
	///
	/// Pages are fetched strictly one after another by following `nextRecordsUrl`. Any
	/// failure discards the records gathered so far.
	///
	/// # Errors
	///
	/// - [`ValidationError`] before any request when the session has no access token or no
	///   instance URL.
	/// - [`TransportError::Unauthorized`] when the API rejects the session (HTTP 401), and
	///   other [`TransportError`] variants for transport failures or non-success statuses.
	/// - [`DecodeError`] when a page or the accumulated records cannot be decoded.
	pub async fn query<T>(&self, session: &Session, soql: &str) -> Result<QueryResult<T>>
	where
		T: DeserializeOwned,
	{
		obs::observe(FlowKind::Query, "query", async move {
			session.validate()?;

			if session.instance_url.is_empty() {
				return Err(ValidationError::MissingInstanceUrl.into());
			}

			let data_prefix = self.api_version.data_prefix();
			let base = session.instance_url.trim_end_matches('/');
			let mut pages = PageAccumulator::new(soql);

			while !pages.done {
				let url = format!("{base}{data_prefix}{}", pages.next_path);
				let page = self.fetch_page(session, &url).await?;

				obs::record_query_page(page.records.len(), page.done);
				pages.absorb(page, &data_prefix)?;
			}

			let records = decode(pages.records)?;

			Ok(QueryResult { total_size: pages.total_size, records })
		})
		.await
	}

	/// Like [`query`](Self::query), but refreshes `session` once and retries when the API
	/// reports it as expired.
	///
	/// Sessions without a replayable grant get the original [`TransportError::Unauthorized`]
	/// back. On a successful refresh `session` is replaced, even if
	/// the retried query then fails.
	pub async fn query_with_refresh<T>(
		&self,
		session: &mut Session,
		soql: &str,
	) -> Result<QueryResult<T>>
	where
		T: DeserializeOwned,
	{
		match self.query(session, soql).await {
			Err(e) if e.is_session_expired() && session.grant_type().is_refreshable() => {
				self.refresh_in_place(session).await?;
				self.query(session, soql).await
			},
			result => result,
		}
	}

	async fn fetch_page(&self, session: &Session, url: &str) -> Result<QueryPage> {
		let request = http::authorized_get(url, session.access_token.expose())?;
		let response = http::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			FlowKind::Query,
			request,
		)
		.await?;

		if !response.status().is_success() {
			return Err(TransportError::from_status(
				response.status().as_u16(),
				http::body_text(&response),
			)
			.into());
		}

		let mut de = serde_json::Deserializer::from_slice(response.body());

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| DecodeError::Page { source }.into())
	}
}

/// Path of the first page, relative to the data prefix.
fn initial_path(soql: &str) -> String {
	let escaped: String = url::form_urlencoded::byte_serialize(soql.as_bytes()).collect();

	format!("/query/?q={escaped}")
}

/// Strips the `/services/data/<version>` prefix from a continuation URL.
fn continuation_path<'a>(next_records_url: &'a str, data_prefix: &str) -> &'a str {
	next_records_url.strip_prefix(data_prefix).unwrap_or(next_records_url)
}
