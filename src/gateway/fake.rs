//! Recording gateway used by the cache and screen tests.

use std::cell::RefCell;
use std::rc::Rc;

use super::Gateway;
use crate::error::GatewayError;
use crate::models::{Event, EventFields, Venue, VenueFields};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ListVenues,
    InsertVenue(VenueFields),
    UpdateVenue(Venue),
    DeleteVenue(i64),
    ListEvents,
    InsertEvent(EventFields),
    UpdateEvent(Event),
    DeleteEvent(i64),
}

#[derive(Default)]
struct State {
    venues: Vec<Venue>,
    events: Vec<Event>,
    next_id: i64,
    calls: Vec<Call>,
    fail_mutations: Option<GatewayError>,
    fail_lists: Option<GatewayError>,
}

/// Cloning hands out another view of the same state, so a test can keep one
/// copy while the client owns the other.
#[derive(Clone, Default)]
pub(crate) struct FakeGateway {
    state: Rc<RefCell<State>>,
}

impl FakeGateway {
    pub(crate) fn with_rows(venues: Vec<Venue>, events: Vec<Event>) -> Self {
        let next_id = venues
            .iter()
            .map(|v| v.id)
            .chain(events.iter().map(|e| e.id))
            .max()
            .unwrap_or(0)
            + 1;
        let gateway = Self::default();
        {
            let mut state = gateway.state.borrow_mut();
            state.venues = venues;
            state.events = events;
            state.next_id = next_id;
        }
        gateway
    }

    pub(crate) fn fail_mutations(&self, err: Option<GatewayError>) {
        self.state.borrow_mut().fail_mutations = err;
    }

    pub(crate) fn fail_lists(&self, err: Option<GatewayError>) {
        self.state.borrow_mut().fail_lists = err;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub(crate) fn venues(&self) -> Vec<Venue> {
        self.state.borrow().venues.clone()
    }

    /// Remove a venue behind the client's back.
    pub(crate) fn drop_venue(&self, id: i64) {
        self.state.borrow_mut().venues.retain(|v| v.id != id);
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        let failure = match call {
            Call::ListVenues | Call::ListEvents => state.fail_lists.clone(),
            _ => state.fail_mutations.clone(),
        };
        state.calls.push(call);
        failure.map_or(Ok(()), Err)
    }

    fn next_id(&self) -> i64 {
        let mut state = self.state.borrow_mut();
        state.next_id = state.next_id.max(1);
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

impl Gateway for FakeGateway {
    fn list_venues(&self) -> Result<Vec<Venue>, GatewayError> {
        self.record(Call::ListVenues)?;
        Ok(self.venues())
    }

    fn insert_venue(&self, fields: &VenueFields) -> Result<Venue, GatewayError> {
        self.record(Call::InsertVenue(fields.clone()))?;
        let venue = Venue::from_fields(self.next_id(), fields.clone());
        self.state.borrow_mut().venues.push(venue.clone());
        Ok(venue)
    }

    fn update_venue(&self, venue: &Venue) -> Result<Venue, GatewayError> {
        self.record(Call::UpdateVenue(venue.clone()))?;
        let mut state = self.state.borrow_mut();
        let slot = state
            .venues
            .iter_mut()
            .find(|v| v.id == venue.id)
            .ok_or_else(|| GatewayError::Server("Venue not found".to_string()))?;
        *slot = venue.clone();
        Ok(venue.clone())
    }

    fn delete_venue(&self, id: i64) -> Result<(), GatewayError> {
        self.record(Call::DeleteVenue(id))?;
        self.drop_venue(id);
        Ok(())
    }

    fn list_events(&self) -> Result<Vec<Event>, GatewayError> {
        self.record(Call::ListEvents)?;
        Ok(self.state.borrow().events.clone())
    }

    fn insert_event(&self, fields: &EventFields) -> Result<Event, GatewayError> {
        self.record(Call::InsertEvent(fields.clone()))?;
        let event = Event::from_fields(self.next_id(), fields.clone());
        self.state.borrow_mut().events.push(event.clone());
        Ok(event)
    }

    fn update_event(&self, event: &Event) -> Result<Event, GatewayError> {
        self.record(Call::UpdateEvent(event.clone()))?;
        let mut state = self.state.borrow_mut();
        let slot = state
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| GatewayError::Server("Event not found".to_string()))?;
        *slot = event.clone();
        Ok(event.clone())
    }

    fn delete_event(&self, id: i64) -> Result<(), GatewayError> {
        self.record(Call::DeleteEvent(id))?;
        self.state.borrow_mut().events.retain(|e| e.id != id);
        Ok(())
    }
}
