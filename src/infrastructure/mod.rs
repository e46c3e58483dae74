//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Gemini: text and image generation over the Generative Language API
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod gemini;
pub mod http;
pub mod state;
