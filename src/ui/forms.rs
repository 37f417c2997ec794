//! Form state for the two CRUD screens. A form holds exactly what was typed;
//! validation happens once, when [`EntityForm::intent`] turns it into a
//! [`FormIntent`].

use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::cache::{Cached, QueryClient};
use crate::error::GatewayError;
use crate::gateway::Record;
use crate::models::{Event, EventFields, Venue, VenueFields, VenueType};

use super::screens::venue_name;

/// What a submission should do, decided from the form's id at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent<F> {
    Create(F),
    Update { id: i64, fields: F },
}

/// Behaviour shared by the venue and event forms so the submit/edit/delete
/// flow can be written once.
pub trait EntityForm: Default {
    type Record: Cached;

    /// Copy an existing record into the form, switching it to update mode.
    fn load(record: &Self::Record) -> Self;

    /// Validate the typed values and decide between create and update.
    fn intent(&self) -> Result<FormIntent<<Self::Record as Record>::Fields>, GatewayError>;

    /// Tables the owning screen needs fetched when it mounts.
    fn mount(client: &mut QueryClient) {
        client.mount::<Self::Record>();
    }
}

/// Keyboard editing of a form, independent of which table it feeds.
pub trait FormControls {
    /// True while an existing record is loaded.
    fn is_editing(&self) -> bool;
    /// Move focus down the tab order, wrapping at the end.
    fn next_field(&mut self);
    fn previous_field(&mut self);
    /// Type into the focused field. Returns false when the character is not
    /// accepted there.
    fn push_char(&mut self, ch: char) -> bool;
    /// Delete the last character, or clear a selector.
    fn backspace(&mut self);
    /// Step a selector field. `venues` is what the venue picker offers.
    fn cycle(&mut self, offset: isize, venues: Option<&[Venue]>);
    /// One line per field, in tab order.
    fn lines(&self, venues: Option<&[Venue]>) -> Vec<Line<'static>>;
    /// Row and column of the text cursor while a text field has focus.
    fn cursor(&self) -> Option<(u16, u16)>;
}

/// Reject blank input. The value itself comes back untouched, so a loaded
/// record submits exactly as it was stored.
fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, GatewayError> {
    if value.trim().is_empty() {
        Err(GatewayError::Validation(message.to_string()))
    } else {
        Ok(value)
    }
}

/// Render `Label: value`, greyed out when empty and highlighted when focused.
fn field_line(label: &str, value: Option<String>, placeholder: &str, active: bool) -> Line<'static> {
    let empty = value.is_none();
    let display = value.unwrap_or_else(|| placeholder.to_string());

    let style = if active {
        Style::default().fg(Color::Yellow)
    } else if empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

/// Column just past the typed text of a `Label: value` line.
fn cursor_column(label: &str, value: &str) -> u16 {
    (label.chars().count() + 2 + value.chars().count()) as u16
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Fields of the venue form, in tab order.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum VenueField {
    #[default]
    Name,
    Capacity,
    Type,
}

impl VenueField {
    pub const ALL: [VenueField; 3] = [VenueField::Name, VenueField::Capacity, VenueField::Type];

    pub fn label(self) -> &'static str {
        match self {
            VenueField::Name => "Name",
            VenueField::Capacity => "Capacity",
            VenueField::Type => "Type",
        }
    }
}

/// Form state for the venue screen. `id` is `Some` while an existing venue is
/// being edited; the text buffers hold exactly what the user typed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VenueForm {
    pub id: Option<i64>,
    pub name: String,
    /// Digits as typed; parsed on submit.
    pub capacity: String,
    /// `None` until an option is picked.
    pub kind: Option<VenueType>,
    /// Field that receives typing.
    pub active: VenueField,
}

impl VenueForm {
    #[cfg(test)]
    pub(crate) fn focus(&mut self, field: VenueField) {
        self.active = field;
    }

    /// Replace one field with a raw input value, leaving the rest untouched.
    /// An unknown type clears the selection, like picking the placeholder.
    #[cfg(test)]
    pub(crate) fn set_field(&mut self, field: VenueField, value: &str) {
        match field {
            VenueField::Name => self.name = value.to_string(),
            VenueField::Capacity => self.capacity = value.to_string(),
            VenueField::Type => self.kind = value.parse().ok(),
        }
    }

    /// Render one field as `Label: value`, with a placeholder when empty.
    pub fn build_line(&self, field: VenueField) -> Line<'static> {
        let active = self.active == field;
        match field {
            VenueField::Name => field_line(field.label(), non_empty(&self.name), "<required>", active),
            VenueField::Capacity => {
                field_line(field.label(), non_empty(&self.capacity), "<required>", active)
            }
            VenueField::Type => field_line(
                field.label(),
                self.kind.map(|kind| kind.to_string()),
                "<select type: ←/→>",
                active,
            ),
        }
    }
}

impl FormControls for VenueForm {
    fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    fn next_field(&mut self) {
        self.active = match self.active {
            VenueField::Name => VenueField::Capacity,
            VenueField::Capacity => VenueField::Type,
            VenueField::Type => VenueField::Name,
        };
    }

    fn previous_field(&mut self) {
        self.active = match self.active {
            VenueField::Name => VenueField::Type,
            VenueField::Capacity => VenueField::Name,
            VenueField::Type => VenueField::Capacity,
        };
    }

    /// Type a character into the focused field. Capacity only takes digits;
    /// on the type selector `i` and `o` pick an option.
    fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            VenueField::Name => {
                self.name.push(ch);
                true
            }
            VenueField::Capacity => {
                if ch.is_ascii_digit() {
                    self.capacity.push(ch);
                    true
                } else {
                    false
                }
            }
            VenueField::Type => match ch.to_ascii_lowercase() {
                'i' => {
                    self.kind = Some(VenueType::Indoor);
                    true
                }
                'o' => {
                    self.kind = Some(VenueType::Outdoor);
                    true
                }
                _ => false,
            },
        }
    }

    fn backspace(&mut self) {
        match self.active {
            VenueField::Name => {
                self.name.pop();
            }
            VenueField::Capacity => {
                self.capacity.pop();
            }
            VenueField::Type => self.kind = None,
        }
    }

    /// Step through the type options when the selector is focused.
    fn cycle(&mut self, offset: isize, _venues: Option<&[Venue]>) {
        if self.active != VenueField::Type {
            return;
        }
        self.kind = cycle_option(&VenueType::ALL, self.kind, offset);
    }

    fn lines(&self, _venues: Option<&[Venue]>) -> Vec<Line<'static>> {
        VenueField::ALL.iter().map(|field| self.build_line(*field)).collect()
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        let value = match self.active {
            VenueField::Name => &self.name,
            VenueField::Capacity => &self.capacity,
            VenueField::Type => return None,
        };
        let row = VenueField::ALL.iter().position(|f| *f == self.active)? as u16;
        Some((row, cursor_column(self.active.label(), value)))
    }
}

impl EntityForm for VenueForm {
    type Record = Venue;

    fn load(venue: &Venue) -> Self {
        Self {
            id: Some(venue.id),
            name: venue.name.clone(),
            capacity: venue.capacity.to_string(),
            kind: Some(venue.kind),
            active: VenueField::Name,
        }
    }

    fn intent(&self) -> Result<FormIntent<VenueFields>, GatewayError> {
        let name = required(&self.name, "Venue name is required.")?.to_string();
        let capacity = required(&self.capacity, "Capacity is required.")?
            .trim()
            .parse::<i64>()
            .map_err(|_| GatewayError::Validation("Capacity must be a whole number.".to_string()))?;
        let kind = self
            .kind
            .ok_or_else(|| GatewayError::Validation("Venue type is required.".to_string()))?;

        let fields = VenueFields {
            name,
            capacity,
            kind,
        };
        Ok(match self.id {
            Some(id) => FormIntent::Update { id, fields },
            None => FormIntent::Create(fields),
        })
    }
}

/// Fields of the event form, in tab order.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum EventField {
    #[default]
    Name,
    Date,
    Venue,
}

impl EventField {
    pub const ALL: [EventField; 3] = [EventField::Name, EventField::Date, EventField::Venue];

    pub fn label(self) -> &'static str {
        match self {
            EventField::Name => "Name",
            EventField::Date => "Date",
            EventField::Venue => "Venue",
        }
    }
}

/// Form state for the event screen. `venue` holds the selected venue id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub id: Option<i64>,
    pub name: String,
    /// `YYYY-MM-DD` as typed; parsed on submit.
    pub date: String,
    pub venue: Option<i64>,
    pub active: EventField,
}

impl EventForm {
    #[cfg(test)]
    pub(crate) fn focus(&mut self, field: EventField) {
        self.active = field;
    }

    /// Replace one field with a raw input value. A non-numeric venue clears the
    /// selection.
    #[cfg(test)]
    pub(crate) fn set_field(&mut self, field: EventField, value: &str) {
        match field {
            EventField::Name => self.name = value.to_string(),
            EventField::Date => self.date = value.to_string(),
            EventField::Venue => self.venue = value.trim().parse().ok(),
        }
    }

    /// Like the venue form's lines, except the venue shows by name when the
    /// venue list has it.
    pub fn build_line(&self, field: EventField, venues: Option<&[Venue]>) -> Line<'static> {
        let active = self.active == field;
        match field {
            EventField::Name => field_line(field.label(), non_empty(&self.name), "<required>", active),
            EventField::Date => field_line(field.label(), non_empty(&self.date), "<YYYY-MM-DD>", active),
            EventField::Venue => field_line(
                field.label(),
                self.venue
                    .and_then(|id| venue_name(id, venues))
                    .map(str::to_string),
                "<select venue: ←/→>",
                active,
            ),
        }
    }
}

impl FormControls for EventForm {
    fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    fn next_field(&mut self) {
        self.active = match self.active {
            EventField::Name => EventField::Date,
            EventField::Date => EventField::Venue,
            EventField::Venue => EventField::Name,
        };
    }

    fn previous_field(&mut self) {
        self.active = match self.active {
            EventField::Name => EventField::Venue,
            EventField::Date => EventField::Name,
            EventField::Venue => EventField::Date,
        };
    }

    /// Dates are typed as `YYYY-MM-DD`, so only digits and dashes get in. The
    /// venue selector ignores typing.
    fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            EventField::Name => {
                self.name.push(ch);
                true
            }
            EventField::Date => {
                if ch.is_ascii_digit() || ch == '-' {
                    self.date.push(ch);
                    true
                } else {
                    false
                }
            }
            EventField::Venue => false,
        }
    }

    fn backspace(&mut self) {
        match self.active {
            EventField::Name => {
                self.name.pop();
            }
            EventField::Date => {
                self.date.pop();
            }
            EventField::Venue => self.venue = None,
        }
    }

    /// Step through the loaded venues. Without a venue list there is nothing to
    /// pick from and the selection is left as it is.
    fn cycle(&mut self, offset: isize, venues: Option<&[Venue]>) {
        if self.active != EventField::Venue {
            return;
        }
        let ids: Vec<i64> = venues.unwrap_or_default().iter().map(|v| v.id).collect();
        if ids.is_empty() {
            return;
        }
        self.venue = cycle_option(&ids, self.venue, offset);
    }

    fn lines(&self, venues: Option<&[Venue]>) -> Vec<Line<'static>> {
        EventField::ALL
            .iter()
            .map(|field| self.build_line(*field, venues))
            .collect()
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        let value = match self.active {
            EventField::Name => &self.name,
            EventField::Date => &self.date,
            EventField::Venue => return None,
        };
        let row = EventField::ALL.iter().position(|f| *f == self.active)? as u16;
        Some((row, cursor_column(self.active.label(), value)))
    }
}

impl EntityForm for EventForm {
    type Record = Event;

    fn load(event: &Event) -> Self {
        Self {
            id: Some(event.id),
            name: event.name.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            venue: Some(event.venue),
            active: EventField::Name,
        }
    }

    fn intent(&self) -> Result<FormIntent<EventFields>, GatewayError> {
        let name = required(&self.name, "Event name is required.")?.to_string();
        let date = required(&self.date, "Date is required.")?;
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
            GatewayError::Validation("Date must be a valid YYYY-MM-DD date.".to_string())
        })?;
        let venue = self
            .venue
            .ok_or_else(|| GatewayError::Validation("Venue is required.".to_string()))?;

        let fields = EventFields { name, date, venue };
        Ok(match self.id {
            Some(id) => FormIntent::Update { id, fields },
            None => FormIntent::Create(fields),
        })
    }

    fn mount(client: &mut QueryClient) {
        client.mount::<Event>();
        client.mount::<Venue>();
    }
}

/// Move `offset` steps from `current` through `options`, wrapping around. An
/// unset (or no longer offered) value starts from the first or last option.
fn cycle_option<T: Copy + PartialEq>(options: &[T], current: Option<T>, offset: isize) -> Option<T> {
    if options.is_empty() {
        return current;
    }
    let len = options.len() as isize;
    let index = match current.and_then(|value| options.iter().position(|o| *o == value)) {
        Some(index) => (index as isize + offset).rem_euclid(len),
        None if offset < 0 => len - 1,
        None => 0,
    };
    Some(options[index as usize])
}
