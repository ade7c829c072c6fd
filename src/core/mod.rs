//! Core list-controller logic, independent of the terminal.

pub mod controller;
pub mod format;
pub mod logging;
pub mod query;
pub mod selection;
pub mod sort;
pub mod view;

pub use controller::{ContentAction, ListController, RefreshOutcome, RefreshTicket};
pub use query::{FavoriteFilter, QueryState, SortField, SortOrder};
pub use selection::{SelectAllState, Selection};
pub use view::{RenderTarget, RowView, TableBody, TableView};
