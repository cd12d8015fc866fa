//! Demonstrates logging in with the username/password grant over the default reqwest
//! transport, then paging through a SOQL query straight into a typed struct.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;
// self
use sforce_broker::{
	auth::UsernamePasswordCredentials, config::Domain, flows::ReqwestBroker, query::Timestamp,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Account {
	id: String,
	name: String,
	created_date: Timestamp,
	annual_revenue: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/services/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"access_token": "00Ddemo!session",
					"instance_url": server.base_url(),
					"id": "https://login.salesforce.com/id/00D000000000001/005000000000001",
					"issued_at": "1704164645000",
					"signature": "c2lnbmF0dXJl",
				})
				.to_string(),
			);
		})
		.await;
	let first_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/data/v63.0/query/");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"totalSize": 2,
					"done": false,
					"nextRecordsUrl": "/services/data/v63.0/query/01gD0000002HU6KIAW-2",
					"records": [
						{ "Id": "001A", "Name": "Acme", "CreatedDate": "2024-01-02T03:04:05.000+0000", "AnnualRevenue": 1.5e6 },
						{ "Id": "001B", "Name": "Globex", "CreatedDate": 1704164645000_i64, "AnnualRevenue": null }
					]
				})
				.to_string(),
			);
		})
		.await;
	let last_page = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/data/v63.0/query/01gD0000002HU6KIAW-2");
			then.status(200).header("content-type", "application/json").body(
				json!({
					"totalSize": 1,
					"done": true,
					"records": [{ "id": "001C", "name": "Initech", "createddate": "2024-02-01T12:00:00.000-0500" }]
				})
				.to_string(),
			);
		})
		.await;
	let broker = ReqwestBroker::new();
	let session = broker
		.username_password(UsernamePasswordCredentials::new(
			Domain::parse(server.base_url())?,
			"demo@example.com",
			"password",
			"security-token",
			"demo-consumer-key",
			"demo-consumer-secret",
		))
		.await?;

	println!("Logged in: {session:?}.");

	let accounts = broker
		.query::<Vec<Account>>(&session, "SELECT Id, Name, CreatedDate, AnnualRevenue FROM Account")
		.await?;

	println!("Fetched {} accounts.", accounts.total_size);

	for account in &accounts.records {
		println!(
			"{} {} created {:?} revenue {:?}.",
			account.id, account.name, *account.created_date, account.annual_revenue
		);
	}

	token_mock.assert_async().await;
	first_page.assert_async().await;
	last_page.assert_async().await;

	Ok(())
}
