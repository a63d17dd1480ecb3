//! Unit tests for the audio service
//!
//! Every test drives the routing, feedback and state code against the
//! in-memory fake port. No audio server is needed.

mod feedback;
mod service;
