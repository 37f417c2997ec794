//! Client for a PostgREST-style hosted backend (the `/rest/v1/<table>` API a
//! Supabase project exposes). Rows are filtered with `id=eq.<id>` and writes ask
//! for `return=representation` so the affected rows come back in the response.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Gateway, Table};
use crate::error::GatewayError;
use crate::models::{Event, EventFields, Venue, VenueFields};

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Server(format!("unexpected response from backend: {err}"))
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// Shape of the JSON error bodies PostgREST returns.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct RestGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn list<R: DeserializeOwned>(&self, table: Table) -> Result<Vec<R>, GatewayError> {
        debug!("GET {}", table.name());
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*"), ("order", "id.asc")])
            .send()?;
        Ok(check_status(response)?.json()?)
    }

    fn insert<B, R>(&self, table: Table, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        debug!("POST {}", table.name());
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()?;
        let rows: Vec<R> = check_status(response)?.json()?;
        rows.into_iter().next().ok_or_else(|| {
            GatewayError::Server(format!("backend returned no {} row", table.name()))
        })
    }

    fn update<B, R>(&self, table: Table, id: i64, body: &B, noun: &str) -> Result<R, GatewayError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        debug!("PATCH {} id={id}", table.name());
        let response = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(body)
            .send()?;
        let rows: Vec<R> = check_status(response)?.json()?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Server(format!("{noun} not found")))
    }

    fn delete(&self, table: Table, id: i64, noun: &str) -> Result<(), GatewayError> {
        debug!("DELETE {} id={id}", table.name());
        let response = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()?;
        let rows: Vec<serde_json::Value> = check_status(response)?.json()?;
        if rows.is_empty() {
            Err(GatewayError::Server(format!("{noun} not found")))
        } else {
            Ok(())
        }
    }
}

impl Gateway for RestGateway {
    fn list_venues(&self) -> Result<Vec<Venue>, GatewayError> {
        self.list(Table::Venues)
    }

    fn insert_venue(&self, fields: &VenueFields) -> Result<Venue, GatewayError> {
        self.insert(Table::Venues, fields)
    }

    fn update_venue(&self, venue: &Venue) -> Result<Venue, GatewayError> {
        self.update(Table::Venues, venue.id, &venue.fields(), "Venue")
    }

    fn delete_venue(&self, id: i64) -> Result<(), GatewayError> {
        self.delete(Table::Venues, id, "Venue")
    }

    fn list_events(&self) -> Result<Vec<Event>, GatewayError> {
        self.list(Table::Events)
    }

    fn insert_event(&self, fields: &EventFields) -> Result<Event, GatewayError> {
        self.insert(Table::Events, fields)
    }

    fn update_event(&self, event: &Event) -> Result<Event, GatewayError> {
        self.update(Table::Events, event.id, &event.fields(), "Event")
    }

    fn delete_event(&self, id: i64) -> Result<(), GatewayError> {
        self.delete(Table::Events, id, "Event")
    }
}

fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status, &body))
}

/// Map a failed response onto the error taxonomy, preferring the backend's own
/// message when the body carries one.
fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));

    match status {
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Server(message),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::*;
    use crate::models::VenueType;

    const KEY: &str = "anon-key";

    fn gateway_for(server: &Server) -> RestGateway {
        RestGateway::new(&server.url(), KEY, Duration::from_secs(5)).unwrap()
    }

    fn hall() -> Venue {
        Venue {
            id: 1,
            name: "Hall A".to_string(),
            capacity: 200,
            kind: VenueType::Indoor,
        }
    }

    #[test]
    fn list_sends_credentials_and_orders_by_id() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/rest/v1/venues")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "id.asc".into()),
            ]))
            .match_header("apikey", KEY)
            .match_header("authorization", format!("Bearer {KEY}").as_str())
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"name":"Hall A","capacity":200,"type":"indoor"}]"#)
            .create();

        let venues = gateway_for(&server).list_venues().unwrap();

        mock.assert();
        assert_eq!(venues, vec![hall()]);
    }

    #[test]
    fn insert_asks_for_the_created_row() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/rest/v1/events")
            .match_header("prefer", "return=representation")
            .match_header("apikey", KEY)
            .match_body(Matcher::Json(json!({
                "name": "Concert",
                "date": "2024-06-01",
                "venue": 1,
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":5,"name":"Concert","date":"2024-06-01","venue":1}]"#)
            .create();

        let fields = EventFields {
            name: "Concert".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            venue: 1,
        };
        let event = gateway_for(&server).insert_event(&fields).unwrap();

        mock.assert();
        assert_eq!(event, Event::from_fields(5, fields));
    }

    #[test]
    fn update_filters_by_id_and_sends_every_field() {
        let mut server = Server::new();
        let mock = server
            .mock("PATCH", "/rest/v1/venues")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(json!({
                "name": "Hall A",
                "capacity": 200,
                "type": "indoor",
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":1,"name":"Hall A","capacity":200,"type":"indoor"}]"#)
            .create();

        let venue = gateway_for(&server).update_venue(&hall()).unwrap();

        mock.assert();
        assert_eq!(venue, hall());
    }

    #[test]
    fn update_of_a_missing_row_is_not_found() {
        let mut server = Server::new();
        let mock = server
            .mock("PATCH", "/rest/v1/venues")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.1".into()))
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        let err = gateway_for(&server).update_venue(&hall()).unwrap_err();

        mock.assert();
        assert_eq!(err, GatewayError::Server("Venue not found".to_string()));
    }

    #[test]
    fn delete_reports_missing_rows() {
        let mut server = Server::new();
        let found = server
            .mock("DELETE", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.5".into()))
            .match_header("prefer", "return=representation")
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":5,"name":"Concert","date":"2024-06-01","venue":1}]"#)
            .create();
        let missing = server
            .mock("DELETE", "/rest/v1/events")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.6".into()))
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create();

        let gateway = gateway_for(&server);
        assert_eq!(gateway.delete_event(5), Ok(()));
        assert_eq!(
            gateway.delete_event(6),
            Err(GatewayError::Server("Event not found".to_string()))
        );
        found.assert();
        missing.assert();
    }

    #[test]
    fn rejected_writes_are_validation_errors() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/rest/v1/venues")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"new row violates check constraint"}"#)
            .create();

        let err = gateway_for(&server)
            .insert_venue(&hall().fields())
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Validation("new row violates check constraint".to_string())
        );
    }

    #[test]
    fn table_urls_ignore_trailing_slashes() {
        let gateway =
            RestGateway::new("https://example.supabase.co/", "key", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            gateway.table_url(Table::Venues),
            "https://example.supabase.co/rest/v1/venues"
        );
        assert_eq!(
            gateway.table_url(Table::Events),
            "https://example.supabase.co/rest/v1/events"
        );
    }

    #[test]
    fn conflicts_surface_the_backend_message() {
        let err = status_error(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#,
        );
        assert_eq!(
            err,
            GatewayError::Validation("duplicate key value violates unique constraint".to_string())
        );
    }

    #[test]
    fn unreadable_bodies_fall_back_to_the_status() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(
            err,
            GatewayError::Server("request failed with status 500 Internal Server Error".to_string())
        );
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        let gateway =
            RestGateway::new("http://127.0.0.1:9", "key", Duration::from_secs(2)).unwrap();
        let err = gateway.list_venues().unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)), "{err:?}");
    }
}
