//! Data types for the notices library.

pub mod config;
pub mod notice;
