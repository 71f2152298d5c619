//! Workshop engine: calendar lane packing and payroll period reconciliation.
//!
//! This crate lays out overlapping work assignments ("missions") across a
//! six-week month grid without visual collision, and buckets payroll events
//! into bi-monthly pay periods to derive a final payable amount per worker.

#![warn(missing_docs)]

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
