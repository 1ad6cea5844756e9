//! Outfit transfer generation engine
//!
//! Dresses the person in one photograph in the outfit shown in another, using a
//! Gemini image model. The engine walks an ordered chain of model candidates,
//! aggregates the streamed response, and turns provider failures into a small
//! set of user-facing categories. It is exposed over HTTP and from the command line.

pub mod ai;
pub mod api;
pub mod cli;
pub mod engine;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
