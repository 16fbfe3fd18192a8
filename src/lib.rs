//! Tollgate - Fixed-Window Request Rate Limiter
//!
//! This crate decides, per request, whether an identity is admitted based on
//! how many of its requests have already been seen in the current fixed time
//! window. Time is read through an injectable clock so window behaviour can be
//! driven deterministically.

pub mod config;
pub mod error;
pub mod harness;
pub mod ratelimit;
