//! CI telemetry loader library.
//!
//! Ingests raw CI job results into a normalized relational store and merges
//! externally tracked defects onto the ingested tests and jobs.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod migration;
pub mod models;
pub mod services;
