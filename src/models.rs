//! Domain models mirroring the two remote tables. These stay plain data holders
//! so the gateway, cache and UI layers can pass them around freely. Field names
//! follow the wire format the hosted backend uses (`type`, `venue`), which is
//! why a couple of serde renames show up below.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a venue is under a roof or not. The backend stores the lowercase
/// spelling, so that is what serde and SQLite see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    Indoor,
    Outdoor,
}

impl VenueType {
    /// Options in the order the form cycles through them.
    pub const ALL: [VenueType; 2] = [VenueType::Indoor, VenueType::Outdoor];

    pub fn as_str(self) -> &'static str {
        match self {
            VenueType::Indoor => "indoor",
            VenueType::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or typed venue type is neither `indoor` nor `outdoor`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown venue type `{0}`")]
pub struct UnknownVenueType(pub String);

impl FromStr for VenueType {
    type Err = UnknownVenueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "indoor" => Ok(VenueType::Indoor),
            "outdoor" => Ok(VenueType::Outdoor),
            other => Err(UnknownVenueType(other.to_string())),
        }
    }
}

/// A place events can be held at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Server-assigned primary key.
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    #[serde(rename = "type")]
    pub kind: VenueType,
}

/// A venue as submitted for creation, before the backend assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueFields {
    pub name: String,
    pub capacity: i64,
    #[serde(rename = "type")]
    pub kind: VenueType,
}

impl Venue {
    pub fn from_fields(id: i64, fields: VenueFields) -> Self {
        Self {
            id,
            name: fields.name,
            capacity: fields.capacity,
            kind: fields.kind,
        }
    }

    /// Everything except the id, ready to be sent as an update body.
    pub fn fields(&self) -> VenueFields {
        VenueFields {
            name: self.name.clone(),
            capacity: self.capacity,
            kind: self.kind,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Something happening at a venue on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Id of the venue hosting the event. Nothing guarantees the venue still
    /// exists; see [`crate::ui::venue_name`].
    pub venue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFields {
    pub name: String,
    pub date: NaiveDate,
    pub venue: i64,
}

impl Event {
    pub fn from_fields(id: i64, fields: EventFields) -> Self {
        Self {
            id,
            name: fields.name,
            date: fields.date,
            venue: fields.venue,
        }
    }

    pub fn fields(&self) -> EventFields {
        EventFields {
            name: self.name.clone(),
            date: self.date,
            venue: self.venue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_uses_backend_field_names() {
        let venue = Venue {
            id: 1,
            name: "Hall A".to_string(),
            capacity: 200,
            kind: VenueType::Indoor,
        };
        let json = serde_json::to_value(&venue).unwrap();
        assert_eq!(json["type"], "indoor");
        assert!(json.get("kind").is_none());

        let parsed: Venue = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, venue);
    }

    #[test]
    fn event_date_is_plain_calendar_date() {
        let json = r#"{"id":5,"name":"Concert","date":"2024-06-01","venue":1}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(event.venue, 1);
    }

    #[test]
    fn venue_type_parsing_rejects_unknown_values() {
        assert_eq!("outdoor".parse::<VenueType>(), Ok(VenueType::Outdoor));
        assert_eq!(
            "rooftop".parse::<VenueType>(),
            Err(UnknownVenueType("rooftop".to_string()))
        );
    }
}
