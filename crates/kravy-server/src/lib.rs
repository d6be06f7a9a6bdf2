//! Kravy HTTP server.
//!
//! Wires the enquiry store, storage backend, and HTTP routes into an Axum
//! application. Serves the enquiry API at `/api/enquiry` and the landing
//! page at `/`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
