#![cfg(feature = "reqwest")]

mod common;

// std
use std::{collections::VecDeque, future::Future, pin::Pin, sync::Mutex};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::{
	pkcs1v15::{Signature, VerifyingKey},
	signature::Verifier,
};
use sha2::Sha256;
use time::OffsetDateTime;
// self
use common::*;
use sforce_broker::{
	auth::{
		GrantType, JwtBearerCredentials, Session,
		jwt::{self, AssertionClaims},
	},
	error::{RefreshError, TransportError},
	flows::Broker,
	http::{
		HttpTransport, NetworkErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode,
		},
	},
	query::QueryResult,
};

#[derive(Debug)]
struct ConnectionReset;
impl std::fmt::Display for ConnectionReset {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str("Connection reset by peer.")
	}
}
impl std::error::Error for ConnectionReset {}

enum Reply {
	Json(u16, String),
	Reset,
}

#[derive(Default)]
struct Script {
	replies: VecDeque<Reply>,
	requests: Vec<(String, String)>,
}

/// Transport that answers from a fixed script and records every request it sees.
#[derive(Clone, Default)]
struct ScriptedTransport {
	script: Arc<Mutex<Script>>,
}
impl ScriptedTransport {
	fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
		let transport = Self::default();

		transport.script.lock().expect("Script lock should not be poisoned.").replies =
			replies.into_iter().collect();

		transport
	}

	fn requests(&self) -> Vec<(String, String)> {
		self.script.lock().expect("Script lock should not be poisoned.").requests.clone()
	}
}
impl HttpTransport for ScriptedTransport {
	type Handle = ScriptedHandle;
	type TransportError = ConnectionReset;

	fn handle(&self) -> Self::Handle {
		ScriptedHandle { script: self.script.clone() }
	}
}

struct ScriptedHandle {
	script: Arc<Mutex<Script>>,
}
impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
	type Error = HttpClientError<ConnectionReset>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let reply = {
			let mut script = self.script.lock().expect("Script lock should not be poisoned.");

			script.requests.push((
				request.uri().to_string(),
				String::from_utf8_lossy(request.body()).into_owned(),
			));
			script.replies.pop_front()
		};

		Box::pin(async move {
			match reply {
				Some(Reply::Json(status, body)) => {
					let mut response = HttpResponse::new(body.into_bytes());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Some(Reply::Reset) => Err(HttpClientError::Reqwest(Box::new(ConnectionReset))),
				None => Err(HttpClientError::Other("Script exhausted.".into())),
			}
		})
	}
}

type ScriptedBroker = Broker<ScriptedTransport, NetworkErrorMapper>;

fn scripted_broker(transport: &ScriptedTransport) -> ScriptedBroker {
	Broker::with_http_client(transport.clone(), NetworkErrorMapper)
}

fn page_body(ids: &[&str], next: Option<&str>) -> String {
	let records = ids.iter().map(|id| serde_json::json!({ "Id": id })).collect::<Vec<_>>();

	serde_json::json!({
		"totalSize": ids.len(),
		"done": next.is_none(),
		"nextRecordsUrl": next,
		"records": records,
	})
	.to_string()
}

async fn login(broker: &ScriptedBroker) -> Session {
	broker
		.client_credentials(test_client_credentials(test_domain("https://login.salesforce.com")))
		.await
		.expect("Scripted client credentials grant should succeed.")
}

fn jwt_credentials() -> JwtBearerCredentials {
	JwtBearerCredentials::new(
		test_domain("https://login.salesforce.com"),
		"user@example.com",
		"consumer-key",
		TEST_RSA_PEM,
		Duration::minutes(3),
	)
}

fn form_fields(body: &str) -> Vec<(String, String)> {
	url::form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

fn form_value<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
	form.iter()
		.find_map(|(k, v)| (k == key).then_some(v.as_str()))
		.unwrap_or_else(|| panic!("The form should carry `{key}`."))
}

/// Verifies the assertion against the test key and returns its claims.
fn verified_claims(assertion: &str) -> AssertionClaims {
	let parts = assertion.split('.').collect::<Vec<_>>();

	assert_eq!(parts.len(), 3);

	let key = jwt::parse_private_key(TEST_RSA_PEM).expect("Test key should parse.");
	let signature = Signature::try_from(
		URL_SAFE_NO_PAD.decode(parts[2]).expect("Signature should be base64url.").as_slice(),
	)
	.expect("Signature bytes should be well-formed.");

	VerifyingKey::<Sha256>::new(key.to_public_key())
		.verify(format!("{}.{}", parts[0], parts[1]).as_bytes(), &signature)
		.expect("Assertion should verify with the public key.");

	serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).expect("Claims should be base64url."))
		.expect("Claims should be JSON.")
}

#[derive(Debug, Deserialize)]
struct Row {
	id: String,
}

#[tokio::test]
async fn pages_are_requested_in_order_against_the_instance() {
	let transport = ScriptedTransport::with_replies([
		Reply::Json(200, token_body("tok", "https://acme.my.salesforce.com/")),
		Reply::Json(200, page_body(&["001A", "001B"], Some("/services/data/v63.0/query/01g-2"))),
		Reply::Json(200, page_body(&["001C", "001D"], Some("/services/data/v63.0/query/01g-4"))),
		Reply::Json(200, page_body(&["001E"], None)),
	]);
	let broker = scripted_broker(&transport);
	let session = login(&broker).await;
	let result: QueryResult<Vec<Row>> =
		broker.query(&session, "SELECT Id FROM Account").await.expect("Query should succeed.");
	let urls = transport.requests().into_iter().map(|(url, _)| url).collect::<Vec<_>>();

	assert_eq!(result.total_size, 5);
	assert_eq!(result.records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), [
		"001A", "001B", "001C", "001D", "001E"
	]);
	assert_eq!(urls, [
		"https://login.salesforce.com/services/oauth2/token",
		"https://acme.my.salesforce.com/services/data/v63.0/query/?q=SELECT+Id+FROM+Account",
		"https://acme.my.salesforce.com/services/data/v63.0/query/01g-2",
		"https://acme.my.salesforce.com/services/data/v63.0/query/01g-4",
	]);
}

#[tokio::test]
async fn transport_failures_mid_query_abort_the_query() {
	let transport = ScriptedTransport::with_replies([
		Reply::Json(200, token_body("tok", "https://acme.my.salesforce.com")),
		Reply::Json(200, page_body(&["001A", "001B"], Some("/services/data/v63.0/query/01g-2"))),
		Reply::Reset,
		Reply::Json(200, page_body(&["001C"], None)),
	]);
	let broker = scripted_broker(&transport);
	let session = login(&broker).await;
	let err = broker
		.query::<Vec<Row>>(&session, "SELECT Id FROM Account")
		.await
		.expect_err("A reset connection must fail the query.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
	assert_eq!(transport.requests().len(), 3, "No page may be requested after a failure.");
}

#[tokio::test]
async fn jwt_bearer_posts_an_rs256_assertion() {
	let transport = ScriptedTransport::with_replies([Reply::Json(
		200,
		token_body("jwt-token", "https://acme.my.salesforce.com"),
	)]);
	let broker = scripted_broker(&transport);
	let session =
		broker.jwt_bearer(jwt_credentials()).await.expect("JWT bearer grant should succeed.");
	let (url, body) = transport.requests().remove(0);
	let form = form_fields(&body);
	let assertion = form_value(&form, "assertion");

	assert_eq!(session.access_token.expose(), "jwt-token");
	assert_eq!(url, "https://login.salesforce.com/services/oauth2/token");
	assert_eq!(form[0], (
		"grant_type".to_owned(),
		"urn:ietf:params:oauth:grant-type:jwt-bearer".to_owned()
	));
	assert_eq!(assertion.split('.').count(), 3);
}

#[tokio::test]
async fn refresh_failures_leave_the_session_in_place() {
	let transport = ScriptedTransport::with_replies([
		Reply::Json(200, token_body("tok", "https://acme.my.salesforce.com")),
		Reply::Json(200, token_body("", "https://acme.my.salesforce.com")),
	]);
	let broker = scripted_broker(&transport);
	let mut session = login(&broker).await;
	let err = broker
		.refresh_in_place(&mut session)
		.await
		.expect_err("An empty refreshed token must be rejected.");

	assert!(matches!(err, Error::Refresh(RefreshError::EmptyAccessToken)));
	assert_eq!(session.access_token.expose(), "tok");
	assert_eq!(broker.refresh_metrics.attempts(), 1);
}

#[tokio::test]
async fn jwt_bearer_refresh_signs_a_fresh_assertion() {
	let transport = ScriptedTransport::with_replies([
		Reply::Json(200, token_body("jwt-initial", "https://acme.my.salesforce.com")),
		Reply::Json(200, token_body("jwt-refreshed", "https://acme.my.salesforce.com")),
	]);
	let broker = scripted_broker(&transport);
	let session =
		broker.jwt_bearer(jwt_credentials()).await.expect("JWT bearer grant should succeed.");
	let refresh_started = OffsetDateTime::now_utc();
	let refreshed =
		broker.refresh_session(&session).await.expect("JWT bearer refresh should succeed.");
	let requests = transport.requests();

	assert_eq!(requests.len(), 2);

	let first = form_fields(&requests[0].1);
	let second = form_fields(&requests[1].1);
	let first_claims = verified_claims(form_value(&first, "assertion"));
	let second_claims = verified_claims(form_value(&second, "assertion"));

	assert_eq!(requests[1].0, "https://login.salesforce.com/services/oauth2/token");
	assert_eq!(form_value(&second, "grant_type"), "urn:ietf:params:oauth:grant-type:jwt-bearer");
	assert_eq!(second_claims.iss, "consumer-key");
	assert_eq!(second_claims.sub, "user@example.com");
	assert_eq!(second_claims.aud, "https://login.salesforce.com");
	assert!(second_claims.exp >= (refresh_started + Duration::minutes(3)).unix_timestamp());
	assert!(second_claims.exp >= first_claims.exp);
	assert_eq!(refreshed.grant_type(), GrantType::JwtBearer);
	assert_eq!(refreshed.access_token.expose(), "jwt-refreshed");
	assert_eq!(session.access_token.expose(), "jwt-initial");
	assert_eq!(broker.refresh_metrics.successes(), 1);
}
