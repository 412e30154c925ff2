//! Roadsage - route planning agent
//!
//! Picks the shortest sensible route between two named locations from a
//! catalog of pre-defined routes, steers away from known trouble (planned
//! events, weather, historical congestion) and then keeps re-checking the
//! choice against live intersection telemetry.
//!
//! The pieces, bottom-up:
//!
//! - [`catalog`] - candidate routes and shortest-available search
//! - [`conditions`] - condition providers and the static optimizer policies
//! - [`planner`] - the static and real-time stages and the orchestrator
//! - [`session`] - long-running plans re-evaluated on a timer
//! - [`api`], [`cli`] - the HTTP and command-line surfaces

pub mod api;
pub mod catalog;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod geo;
pub mod logging;
pub mod metrics;
pub mod planner;
pub mod session;
