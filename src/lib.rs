//! Salary computation and advance-deduction reconciliation.
//!
//! This crate turns a month of verified attendance into a salary: it buckets
//! days, awards earned leave, prices every component from the per-day rate,
//! reconciles approved advance installments, and composes the net payable.
//! Salaries move through `pending -> processing -> paid | failed`; while
//! pending they are recomposed whenever an input changes, and once frozen
//! their snapshot never changes.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
