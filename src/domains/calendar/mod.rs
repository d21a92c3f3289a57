pub mod types;
pub mod window;
pub mod repository;
pub mod service;

pub use types::{entry_label, CalendarEntry, CalendarEntryRow, CalendarWindow, NewCalendarEntry, SelectionMode};
pub use window::{default_selection, select_window, visible_entries};
pub use repository::{CalendarRepository, SqliteCalendarRepository};
pub use service::{today, CalendarService, CalendarServiceImpl};
