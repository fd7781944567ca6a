//! examprep-core — Data model, question generation, scoring, and timed sessions.
//!
//! This crate defines the fundamental data model, the provider trait, and the
//! scoring and session logic that the rest of examprep builds on.

pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod service;
pub mod session;
pub mod syllabus;
pub mod traits;
