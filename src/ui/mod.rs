//! Ratatui front-end: the route shell, the venue and event screens, and the
//! toast overlay.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;
mod toast;

pub use app::App;
pub use forms::{
    EntityForm, EventField, EventForm, FormControls, FormIntent, VenueField, VenueForm,
};
pub use screens::{table_view, venue_name, CrudScreen, EventScreen, ScreenView, TableRow, VenueScreen};
pub use terminal::run_app;
pub use toast::{Toast, ToastKind};
