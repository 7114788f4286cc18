//! Community transit trip planner server.
//!
//! Answers "how do I get from here to there by jeepney, bus, train or
//! tricycle?" over a user-contributed directory of terminals and routes,
//! walking to and between rides.

pub mod cache;
pub mod config;
pub mod directory;
pub mod domain;
pub mod geo;
pub mod planner;
pub mod session;
pub mod web;
