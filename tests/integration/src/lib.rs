//! Integration test utilities for the chat core
//!
//! This crate provides fixtures and helpers for running end-to-end
//! scenarios against a configured [`schat_common::ChatRuntime`].

pub mod helpers;
pub mod fixtures;

pub use helpers::*;
pub use fixtures::*;
