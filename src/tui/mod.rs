//! Terminal UI (ratatui + crossterm), Elm-style: state in [`app::AppState`],
//! input and API results as [`events::AppEvent`]s, effects in
//! [`services::Services`].

pub mod app;
pub mod clipboard;
pub mod events;
pub mod keymap;
pub mod layout;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;
