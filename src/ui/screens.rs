use log::warn;

use crate::cache::{Cached, QueryClient};
use crate::gateway::Record;
use crate::models::{Event, Venue};

use super::forms::{EntityForm, EventForm, FormIntent, VenueForm};
use super::toast::Toast;

/// Title of every failure notification; the error text goes in the description.
pub(crate) const ERROR_TITLE: &str = "Error occurred.";

/// Name of the venue with id `venue_id`, if it appears exactly once in the
/// loaded list. A missing list or a venue deleted out from under its events
/// simply yields nothing.
pub fn venue_name(venue_id: i64, venues: Option<&[Venue]>) -> Option<&str> {
    let mut matches = venues?.iter().filter(|venue| venue.id == venue_id);
    match (matches.next(), matches.next()) {
        (Some(venue), None) => Some(venue.name.as_str()),
        _ => None,
    }
}

/// Records that can be listed in a screen's table.
pub trait TableRow: Cached {
    const HEADERS: [&'static str; 3];

    fn cells(&self, client: &QueryClient) -> [String; 3];
}

impl TableRow for Venue {
    const HEADERS: [&'static str; 3] = ["Name", "Capacity", "Type"];

    fn cells(&self, _client: &QueryClient) -> [String; 3] {
        [
            self.name.clone(),
            self.capacity.to_string(),
            self.kind.to_string(),
        ]
    }
}

impl TableRow for Event {
    const HEADERS: [&'static str; 3] = ["Name", "Date", "Venue"];

    fn cells(&self, client: &QueryClient) -> [String; 3] {
        let venues = client.read::<Venue>().data;
        [
            self.name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            venue_name(self.venue, venues).unwrap_or_default().to_string(),
        ]
    }
}

/// What the content area of a CRUD screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Loading,
    Error(String),
    Rows(Vec<[String; 3]>),
}

/// Gate on the screen's own table: placeholder while the first fetch is out,
/// the error once it failed, rows otherwise.
pub fn table_view<R: TableRow>(client: &QueryClient) -> ScreenView {
    let read = client.read::<R>();
    if read.is_loading {
        return ScreenView::Loading;
    }
    if let Some(err) = read.error {
        return ScreenView::Error(err.message().to_string());
    }
    ScreenView::Rows(
        read.data
            .unwrap_or_default()
            .iter()
            .map(|record| record.cells(client))
            .collect(),
    )
}

/// State owned by a mounted Venues or Events screen: the form and the table
/// selection. Dropped on navigation, so a remount starts from a blank form.
#[derive(Debug)]
pub struct CrudScreen<F> {
    pub form: F,
    pub selected: usize,
}

pub type VenueScreen = CrudScreen<VenueForm>;
pub type EventScreen = CrudScreen<EventForm>;

impl<F: EntityForm> CrudScreen<F> {
    /// Build a fresh screen and request the tables it reads.
    pub fn mount(client: &mut QueryClient) -> Self {
        F::mount(client);
        Self {
            form: F::default(),
            selected: 0,
        }
    }

    /// Send the form to the backend. Success clears the form; failure leaves it
    /// exactly as it was so the input can be fixed and resubmitted.
    pub fn submit(&mut self, client: &mut QueryClient) -> Toast {
        let noun = <F::Record as Record>::NOUN;
        let outcome = self.form.intent().and_then(|intent| match intent {
            FormIntent::Create(fields) => client.add::<F::Record>(&fields).map(|_| "added"),
            FormIntent::Update { id, fields } => client
                .update::<F::Record>(&<F::Record as Record>::from_parts(id, fields))
                .map(|_| "updated"),
        });

        match outcome {
            Ok(verb) => {
                self.form = F::default();
                Toast::success(format!("{noun} {verb}."))
            }
            Err(err) => {
                warn!("saving {noun} failed ({}): {err}", err.kind());
                Toast::error(ERROR_TITLE, err.message())
            }
        }
    }

    /// Load `record` into the form verbatim, replacing whatever was there.
    pub fn edit(&mut self, record: &F::Record) {
        self.form = F::load(record);
    }

    /// Delete by id. The form is never touched.
    pub fn delete(&self, client: &mut QueryClient, id: i64) -> Toast {
        let noun = <F::Record as Record>::NOUN;
        match client.delete::<F::Record>(id) {
            Ok(()) => Toast::success(format!("{noun} deleted.")),
            Err(err) => {
                warn!("deleting {noun} {id} failed ({}): {err}", err.kind());
                Toast::error(ERROR_TITLE, err.message())
            }
        }
    }

    pub fn selected_record<'a>(&self, client: &'a QueryClient) -> Option<&'a F::Record> {
        client
            .read::<F::Record>()
            .data
            .and_then(|rows| rows.get(self.selected))
    }

    pub fn edit_selected(&mut self, client: &QueryClient) -> bool {
        match self.selected_record(client).cloned() {
            Some(record) => {
                self.edit(&record);
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self, client: &mut QueryClient) -> Option<Toast> {
        let id = self.selected_record(client)?.id();
        Some(self.delete(client, id))
    }

    pub fn row_count(&self, client: &QueryClient) -> usize {
        client.read::<F::Record>().data.map_or(0, <[F::Record]>::len)
    }

    pub fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let len = len as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the selection on a real row after the list shrinks.
    pub fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}
