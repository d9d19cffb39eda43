//! knowi-core: answer scoring, session tracking and problem generation.
//!
//! This crate holds the logic behind knowi's quiz and mini-game screens.
//! Rendering, audio, sensors and storage belong to the host; everything
//! here is plain data in, plain data out.

pub mod catalog;
pub mod config;
pub mod error;
pub mod math;
pub mod model;
pub mod motion;
pub mod progress;
pub mod scoring;
pub mod service;
pub mod session;
pub mod text;
