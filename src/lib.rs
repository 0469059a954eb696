//! codesmell - Python code smell detection
//!
//! Five rule detectors and a gradient-boosted classifier over structural
//! features, merged into one ranked list of findings and served over HTTP.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod features;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod reporters;
pub mod server;
