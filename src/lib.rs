//! Outfitter Backend Library
//!
//! Exposes the look-generation core, catalog stores, and API surface for
//! use by the server binary and tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod looks;
pub mod models;

pub use catalog::{EdgeStore, InMemoryCatalog, ProductStore, SqliteCatalog};
pub use config::{AppConfig, CoherenceWeights, LookConfig};
pub use error::LookError;
pub use looks::LookService;
pub use models::{
    Candidate, Dimension, Edge, GeneratedLook, Look, LookItem, LooksResponse, Product, Slot,
};
