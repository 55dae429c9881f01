//! SPOREX: football match odds and team form, scored into a daily digest.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod odds;
pub mod data;
pub mod strategy;
pub mod compose;
pub mod publish;
pub mod engine;
pub mod storage;
pub mod dashboard;
