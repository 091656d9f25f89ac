//! Core library for parley.
//!
//! Holds everything that is not terminal presentation: configuration,
//! logging, the durable session identity, the backend gateway, and the
//! chat reducer that keeps the local conversation in sync with the backend.

pub mod chat;
pub mod config;
pub mod gateway;
pub mod identity;
pub mod logging;
