//! Venue and event management over a table-oriented backend.
//!
//! The [`gateway`] module talks to storage, [`cache`] keeps one snapshot per
//! table for the screens, and [`ui`] draws everything in the terminal.
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod router;
pub mod ui;

pub use cache::QueryClient;
pub use config::AppConfig;
pub use error::GatewayError;
pub use gateway::{Gateway, RestGateway, SqliteGateway};
pub use logging::init_logger;
pub use models::{Event, Venue, VenueType};
pub use router::Route;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
