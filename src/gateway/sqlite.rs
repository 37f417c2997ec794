use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, ErrorCode};

use super::connection::{ensure_schema, open_database};
use super::{events, venues, Gateway};
use crate::error::GatewayError;
use crate::models::{Event, EventFields, Venue, VenueFields};

/// Constraint failures mean the row itself was unacceptable; anything else is
/// the database misbehaving.
impl From<rusqlite::Error> for GatewayError {
    fn from(err: rusqlite::Error) -> Self {
        if matches!(
            err.sqlite_error_code(),
            Some(ErrorCode::ConstraintViolation)
        ) {
            GatewayError::Validation(err.to_string())
        } else {
            GatewayError::Server(err.to_string())
        }
    }
}

/// Gateway backed by an embedded SQLite file, standing in for the hosted
/// backend when no remote is configured.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_database(path)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Gateway for SqliteGateway {
    fn list_venues(&self) -> Result<Vec<Venue>, GatewayError> {
        venues::fetch_venues(&self.conn)
    }

    fn insert_venue(&self, fields: &VenueFields) -> Result<Venue, GatewayError> {
        venues::create_venue(&self.conn, fields)
    }

    fn update_venue(&self, venue: &Venue) -> Result<Venue, GatewayError> {
        venues::update_venue(&self.conn, venue)
    }

    fn delete_venue(&self, id: i64) -> Result<(), GatewayError> {
        venues::delete_venue(&self.conn, id)
    }

    fn list_events(&self) -> Result<Vec<Event>, GatewayError> {
        events::fetch_events(&self.conn)
    }

    fn insert_event(&self, fields: &EventFields) -> Result<Event, GatewayError> {
        events::create_event(&self.conn, fields)
    }

    fn update_event(&self, event: &Event) -> Result<Event, GatewayError> {
        events::update_event(&self.conn, event)
    }

    fn delete_event(&self, id: i64) -> Result<(), GatewayError> {
        events::delete_event(&self.conn, id)
    }
}
