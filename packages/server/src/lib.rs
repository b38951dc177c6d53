//! Development backend for Barcart.
//!
//! Speaks the same REST and WebSocket protocol as the production platform so
//! that the client session core can be exercised end to end.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
