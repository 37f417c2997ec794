//! SQL for the `venues` table. Every helper maps its rusqlite failure into a
//! [`GatewayError`] through the `From` impl in the sqlite module.

use log::debug;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection};

use crate::error::GatewayError;
use crate::models::{Venue, VenueFields, VenueType};

/// Stored as the lowercase name, matching the hosted column.
impl ToSql for VenueType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Anything other than `indoor`/`outdoor` in the column is a conversion error.
impl FromSql for VenueType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Every venue, oldest first.
pub(super) fn fetch_venues(conn: &Connection) -> Result<Vec<Venue>, GatewayError> {
    let mut stmt = conn.prepare("SELECT id, name, capacity, type FROM venues ORDER BY id")?;

    let venues = stmt
        .query_map([], |row| {
            Ok(Venue {
                id: row.get(0)?,
                name: row.get(1)?,
                capacity: row.get(2)?,
                kind: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("loaded {} venues", venues.len());
    Ok(venues)
}

/// Insert a venue and echo it back with the freshly assigned id.
pub(super) fn create_venue(conn: &Connection, fields: &VenueFields) -> Result<Venue, GatewayError> {
    conn.execute(
        "INSERT INTO venues (name, capacity, type) VALUES (?1, ?2, ?3)",
        params![fields.name, fields.capacity, fields.kind],
    )?;

    let id = conn.last_insert_rowid();
    debug!("inserted venue {id}");
    Ok(Venue::from_fields(id, fields.clone()))
}

/// Overwrite every column of `venue.id`, failing when no such row exists.
pub(super) fn update_venue(conn: &Connection, venue: &Venue) -> Result<Venue, GatewayError> {
    let updated = conn.execute(
        "UPDATE venues SET name = ?1, capacity = ?2, type = ?3 WHERE id = ?4",
        params![venue.name, venue.capacity, venue.kind, venue.id],
    )?;

    if updated == 0 {
        Err(GatewayError::Server("Venue not found".to_string()))
    } else {
        Ok(venue.clone())
    }
}

/// Remove a venue. Events pointing at it are left alone.
pub(super) fn delete_venue(conn: &Connection, id: i64) -> Result<(), GatewayError> {
    let deleted = conn.execute("DELETE FROM venues WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(GatewayError::Server("Venue not found".to_string()))
    } else {
        Ok(())
    }
}
