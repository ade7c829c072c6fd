/// cliptui - Clipboard History Browser (TUI Edition)
///
/// Terminal client for a clipboard-history server: paginated listing,
/// filtering, client-side sorting, selection, favoriting, deletion and
/// content previews.

pub mod api;
pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
