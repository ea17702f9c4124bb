//! birthday-book: terminal client for a birthday-tracking REST service
//!
//! The two reusable pieces are the generic [`table`] model and the client
//! [`store`]; the CLI and the [`tui`] are thin front ends over them.

pub mod api;
pub mod columns;
pub mod config;
pub mod logging;
pub mod models;
pub mod session;
pub mod store;
pub mod table;
pub mod tui;
pub mod validation;
