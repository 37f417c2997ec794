//! SQL for the `events` table. Dates go through rusqlite's chrono support and
//! are stored as `YYYY-MM-DD` text.

use log::debug;
use rusqlite::{params, Connection};

use crate::error::GatewayError;
use crate::models::{Event, EventFields};

/// Every event, oldest first.
pub(super) fn fetch_events(conn: &Connection) -> Result<Vec<Event>, GatewayError> {
    let mut stmt = conn.prepare("SELECT id, name, date, venue FROM events ORDER BY id")?;

    let events = stmt
        .query_map([], |row| {
            Ok(Event {
                id: row.get(0)?,
                name: row.get(1)?,
                date: row.get(2)?,
                venue: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("loaded {} events", events.len());
    Ok(events)
}

/// Insert a row and hand back the event with its new id.
pub(super) fn create_event(conn: &Connection, fields: &EventFields) -> Result<Event, GatewayError> {
    conn.execute(
        "INSERT INTO events (name, date, venue) VALUES (?1, ?2, ?3)",
        params![fields.name, fields.date, fields.venue],
    )?;

    let id = conn.last_insert_rowid();
    debug!("inserted event {id}");
    Ok(Event::from_fields(id, fields.clone()))
}

/// Overwrite every column of `event.id`. Zero rows touched means the event is
/// gone.
pub(super) fn update_event(conn: &Connection, event: &Event) -> Result<Event, GatewayError> {
    let updated = conn.execute(
        "UPDATE events SET name = ?1, date = ?2, venue = ?3 WHERE id = ?4",
        params![event.name, event.date, event.venue, event.id],
    )?;

    if updated == 0 {
        Err(GatewayError::Server("Event not found".to_string()))
    } else {
        Ok(event.clone())
    }
}

pub(super) fn delete_event(conn: &Connection, id: i64) -> Result<(), GatewayError> {
    let deleted = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(GatewayError::Server("Event not found".to_string()))
    } else {
        Ok(())
    }
}
