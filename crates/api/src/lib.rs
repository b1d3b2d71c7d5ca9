//! KnobsShop API library.
//!
//! Exposes the API as a library so handlers, repositories, and services can
//! be unit-tested and reused from the integration-test crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
