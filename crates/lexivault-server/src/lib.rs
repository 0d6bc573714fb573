//! HTTP surface for Lexivault
//!
//! Thin glue over `lexivault-core`: route wiring, CORS, request/response
//! shapes, and sentence tokenization. The storage decisions all live in the
//! core's word repository.

pub mod routes;
pub mod tokenize;

pub use routes::{build_router, AppState};
