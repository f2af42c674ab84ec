//! GeoQuery Core - Domain models, geometry primitives, ports, and configuration
//!
//! This crate contains the data model and the pure geometric building blocks
//! of the query engine. The evaluator and the interactive session live in
//! `geoquery-engine`; this crate has no UI or I/O concerns beyond loading
//! configuration.

pub mod config;
pub mod error;
pub mod geom;
pub mod models;
pub mod ports;

pub use error::{GeoqueryError, Result};
