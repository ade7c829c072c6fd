//! Crate-level tests.
//!
//! - `api_client_tests`: the HTTP client against a wiremock server
//! - `flow_tests`: app and history view driven through the event channel
//!   with a mocked [`HistoryApi`](crate::api::HistoryApi)
//! - `property`: proptest invariants for formatting, sorting and paging

mod property;
