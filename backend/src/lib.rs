//! Mile Planner backend library
//!
//! HTTP service around the shared planner core: catalog, twelve-week
//! schedules, completion and history, sharing and markdown export over
//! PostgreSQL. Exposed as a library so integration tests can build the router.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
