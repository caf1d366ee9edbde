//! API endpoint integration tests
//!
//! Exercises the full router over in-memory stores and a mock model, so
//! the suite runs without Postgres or network access.

#![allow(dead_code)]

mod app;
mod auth;
mod chat;
mod common;
mod conversations;
