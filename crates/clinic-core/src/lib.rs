//! Core types and the scheduling engine for the clinic appointment service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! record store is reached only through the [`store::RecordStore`] trait, so
//! every backend and transport layer depends on this crate and not the other
//! way around.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod agenda;
pub mod appointment;
pub mod availability;
pub mod conflict;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod policy;
pub mod records;
pub mod scheduler;
pub mod slots;
pub mod staff;
pub mod store;
pub mod time;

pub use error::{Error, Resource, Result, ValidationError};
pub use scheduler::Scheduler;
