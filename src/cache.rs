//! Client-side copy of the remote tables. Each table gets a small state machine
//! (`Idle → Loading → Ready | Failed`, back to `Loading` on invalidate) plus the
//! last list that was fetched successfully. Fetches are not run where they are
//! requested: screens mark a table as loading and the event loop calls
//! [`QueryClient::run_pending`] between frames, so the "Loading..." placeholder
//! actually gets drawn and repeated requests collapse into one.

use log::{debug, info, warn};

use crate::error::GatewayError;
use crate::gateway::{Gateway, Record};
use crate::models::{Event, Venue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    Failed(GatewayError),
}

/// What a screen sees when it reads a table.
#[derive(Debug, PartialEq, Eq)]
pub struct QueryResult<'a, R> {
    /// Latest successfully fetched rows, if any fetch has succeeded yet.
    pub data: Option<&'a [R]>,
    /// True only while nothing has been fetched yet.
    pub is_loading: bool,
    pub error: Option<&'a GatewayError>,
}

#[derive(Debug)]
pub struct TableCache<R> {
    status: FetchStatus,
    snapshot: Option<Vec<R>>,
}

impl<R> Default for TableCache<R> {
    fn default() -> Self {
        Self {
            status: FetchStatus::Idle,
            snapshot: None,
        }
    }
}

impl<R> TableCache<R> {
    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Mark the snapshot stale so the next tick re-fetches it. The old rows stay
    /// readable until the fetch lands.
    pub fn invalidate(&mut self) {
        self.status = FetchStatus::Loading;
    }

    /// Record the outcome of a fetch. A failure keeps the previous snapshot.
    pub fn resolve(&mut self, result: Result<Vec<R>, GatewayError>) {
        match result {
            Ok(rows) => {
                self.snapshot = Some(rows);
                self.status = FetchStatus::Ready;
            }
            Err(err) => self.status = FetchStatus::Failed(err),
        }
    }

    pub fn read(&self) -> QueryResult<'_, R> {
        let error = match &self.status {
            FetchStatus::Failed(err) => Some(err),
            _ => None,
        };
        QueryResult {
            data: self.snapshot.as_deref(),
            is_loading: self.snapshot.is_none()
                && matches!(self.status, FetchStatus::Idle | FetchStatus::Loading),
            error,
        }
    }
}

/// Records that live in the client cache.
pub trait Cached: Record + 'static {
    fn cache(client: &QueryClient) -> &TableCache<Self>;
    fn cache_mut(client: &mut QueryClient) -> &mut TableCache<Self>;
}

impl Cached for Venue {
    fn cache(client: &QueryClient) -> &TableCache<Self> {
        &client.venues
    }

    fn cache_mut(client: &mut QueryClient) -> &mut TableCache<Self> {
        &mut client.venues
    }
}

impl Cached for Event {
    fn cache(client: &QueryClient) -> &TableCache<Self> {
        &client.events
    }

    fn cache_mut(client: &mut QueryClient) -> &mut TableCache<Self> {
        &mut client.events
    }
}

/// Owns the gateway and one cache per table. Mutations go through here so a
/// successful write always invalidates the table it touched.
pub struct QueryClient {
    gateway: Box<dyn Gateway>,
    venues: TableCache<Venue>,
    events: TableCache<Event>,
}

impl QueryClient {
    pub fn new(gateway: Box<dyn Gateway>) -> Self {
        Self {
            gateway,
            venues: TableCache::default(),
            events: TableCache::default(),
        }
    }

    /// A screen showing `R` was mounted: ask for fresh rows.
    pub fn mount<R: Cached>(&mut self) {
        R::cache_mut(self).invalidate();
    }

    pub fn read<R: Cached>(&self) -> QueryResult<'_, R> {
        R::cache(self).read()
    }

    pub fn status<R: Cached>(&self) -> &FetchStatus {
        R::cache(self).status()
    }

    /// Perform every outstanding fetch. Returns whether anything was fetched.
    pub fn run_pending(&mut self) -> bool {
        let venues = self.refresh::<Venue>();
        let events = self.refresh::<Event>();
        venues || events
    }

    fn refresh<R: Cached>(&mut self) -> bool {
        if !R::cache(self).is_pending() {
            return false;
        }
        let table = R::TABLE.name();
        let result = R::list(&*self.gateway);
        match &result {
            Ok(rows) => debug!("fetched {} rows from {table}", rows.len()),
            Err(err) => warn!("fetching {table} failed ({}): {err}", err.kind()),
        }
        R::cache_mut(self).resolve(result);
        true
    }

    pub fn add<R: Cached>(&mut self, fields: &R::Fields) -> Result<R, GatewayError> {
        let record = R::insert(&*self.gateway, fields)?;
        info!("created {} {}", R::TABLE.name(), record.id());
        R::cache_mut(self).invalidate();
        Ok(record)
    }

    pub fn update<R: Cached>(&mut self, record: &R) -> Result<R, GatewayError> {
        let updated = R::update(&*self.gateway, record)?;
        info!("updated {} {}", R::TABLE.name(), updated.id());
        R::cache_mut(self).invalidate();
        Ok(updated)
    }

    pub fn delete<R: Cached>(&mut self, id: i64) -> Result<(), GatewayError> {
        R::delete(&*self.gateway, id)?;
        info!("deleted {} {id}", R::TABLE.name());
        R::cache_mut(self).invalidate();
        Ok(())
    }
}
