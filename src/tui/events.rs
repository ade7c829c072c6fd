use std::path::PathBuf;

use crate::api::{ApiError, AuthStatus, BatchDeleteResult, FavoriteState, HistoryPage, Stats};

use super::widgets::image_preview::ImagePreview;
use crate::core::SortField;

/// Events flowing through the Elm-architecture event loop.
///
/// API results arrive here from tasks spawned by [`super::services::Services`].
#[derive(Debug)]
pub enum AppEvent {
    /// Periodic tick for notification TTLs and search debounce.
    Tick,
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    AuthChecked(Result<AuthStatus, ApiError>),
    /// Login followed by an auth check, so the username is known.
    LoginFinished(Result<AuthStatus, ApiError>),
    LoggedOut,
    HistoryLoaded {
        seq: u64,
        result: Result<HistoryPage, ApiError>,
    },
    StatsLoaded(Result<Stats, ApiError>),
    FavoriteToggled {
        id: i64,
        result: Result<FavoriteState, ApiError>,
    },
    RecordDeleted {
        id: i64,
        result: Result<(), ApiError>,
    },
    BatchDeleted(Result<BatchDeleteResult, ApiError>),
    ImageLoaded {
        id: i64,
        result: Result<ImagePreview, ApiError>,
    },
    Downloaded {
        id: i64,
        result: Result<PathBuf, ApiError>,
    },
    /// Notification to display to the user.
    Notification(Notification),
    /// Request to quit the application.
    Quit,
}

/// Actions resolved from key input by the [`super::keymap::KeyMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Cursor
    CursorDown,
    CursorUp,
    CursorFirst,
    CursorLast,

    // Selection
    ToggleRow,
    ToggleSelectAll,

    // Record actions
    Activate,
    Preview,
    ToggleFavorite,
    Delete,
    BatchDelete,

    SortBy(SortField),

    // Filters
    FocusSearch,
    /// Leave the search bar keeping its text.
    LeaveSearch,
    /// Leave the search bar and clear the search.
    ClearSearch,
    CycleTypeFilter,
    CycleFavoriteFilter,

    // Paging
    NextPage,
    PrevPage,
    LargerPageSize,
    SmallerPageSize,

    // Application
    Refresh,
    Logout,
    ShowHelp,
    Quit,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// A notification with the default lifetime. `id` is assigned by the app.
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            id: 0,
            message: message.into(),
            level,
            ttl_ticks: 60,
        }
    }
}
