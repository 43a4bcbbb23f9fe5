//! Test fixtures for trip-planner.
//!
//! Provides:
//! - New York national park sites (real names, approximate coordinates)
//! - An in-memory map provider and oracle that record every call
//! - A local HTTP server for the network adapters

#![allow(dead_code)]

pub mod mock;
pub mod nyc_parks;
pub mod server;

pub use mock::*;
pub use nyc_parks::*;
pub use server::MockServer;
