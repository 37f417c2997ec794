//! Table-level access to the backend. The [`Gateway`] trait is the only thing
//! the rest of the application talks to; SQLite and the hosted REST backend are
//! interchangeable behind it.

mod connection;
mod events;
#[cfg(test)]
pub(crate) mod fake;
mod rest;
mod sqlite;
mod venues;

pub use connection::{ensure_schema, open_database};
pub use rest::RestGateway;
pub use sqlite::SqliteGateway;

use crate::error::GatewayError;
use crate::models::{Event, EventFields, Venue, VenueFields};

/// The remote tables the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Venues,
    Events,
}

impl Table {
    /// Table name as the backend spells it.
    pub fn name(self) -> &'static str {
        match self {
            Table::Venues => "venues",
            Table::Events => "events",
        }
    }
}

/// List/insert/update/delete per table. Every call either resolves or fails
/// with a [`GatewayError`] carrying a human-readable message.
pub trait Gateway {
    fn list_venues(&self) -> Result<Vec<Venue>, GatewayError>;
    fn insert_venue(&self, fields: &VenueFields) -> Result<Venue, GatewayError>;
    fn update_venue(&self, venue: &Venue) -> Result<Venue, GatewayError>;
    fn delete_venue(&self, id: i64) -> Result<(), GatewayError>;

    fn list_events(&self) -> Result<Vec<Event>, GatewayError>;
    fn insert_event(&self, fields: &EventFields) -> Result<Event, GatewayError>;
    fn update_event(&self, event: &Event) -> Result<Event, GatewayError>;
    fn delete_event(&self, id: i64) -> Result<(), GatewayError>;
}

/// A row type stored in one of the gateway's tables. This lets the cache and
/// the screens stay generic over venues and events while the gateway keeps a
/// plain, object-safe API.
pub trait Record: Clone {
    /// The record minus its server-assigned id.
    type Fields: Clone;

    const TABLE: Table;
    /// Capitalized singular used in notifications ("Venue added.").
    const NOUN: &'static str;

    fn id(&self) -> i64;
    fn from_parts(id: i64, fields: Self::Fields) -> Self;

    fn list(gateway: &dyn Gateway) -> Result<Vec<Self>, GatewayError>;
    fn insert(gateway: &dyn Gateway, fields: &Self::Fields) -> Result<Self, GatewayError>;
    fn update(gateway: &dyn Gateway, record: &Self) -> Result<Self, GatewayError>;
    fn delete(gateway: &dyn Gateway, id: i64) -> Result<(), GatewayError>;
}

impl Record for Venue {
    type Fields = VenueFields;

    const TABLE: Table = Table::Venues;
    const NOUN: &'static str = "Venue";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_parts(id: i64, fields: VenueFields) -> Self {
        Venue::from_fields(id, fields)
    }

    fn list(gateway: &dyn Gateway) -> Result<Vec<Self>, GatewayError> {
        gateway.list_venues()
    }

    fn insert(gateway: &dyn Gateway, fields: &VenueFields) -> Result<Self, GatewayError> {
        gateway.insert_venue(fields)
    }

    fn update(gateway: &dyn Gateway, record: &Self) -> Result<Self, GatewayError> {
        gateway.update_venue(record)
    }

    fn delete(gateway: &dyn Gateway, id: i64) -> Result<(), GatewayError> {
        gateway.delete_venue(id)
    }
}

impl Record for Event {
    type Fields = EventFields;

    const TABLE: Table = Table::Events;
    const NOUN: &'static str = "Event";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_parts(id: i64, fields: EventFields) -> Self {
        Event::from_fields(id, fields)
    }

    fn list(gateway: &dyn Gateway) -> Result<Vec<Self>, GatewayError> {
        gateway.list_events()
    }

    fn insert(gateway: &dyn Gateway, fields: &EventFields) -> Result<Self, GatewayError> {
        gateway.insert_event(fields)
    }

    fn update(gateway: &dyn Gateway, record: &Self) -> Result<Self, GatewayError> {
        gateway.update_event(record)
    }

    fn delete(gateway: &dyn Gateway, id: i64) -> Result<(), GatewayError> {
        gateway.delete_event(id)
    }
}
