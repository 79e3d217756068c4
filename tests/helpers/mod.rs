//! Test helpers module
//!
//! This module provides utilities and helpers for testing the tracking engine.
//! It includes a recording messenger, a mock Bot API server and the engine test context.

#![allow(dead_code)]

pub mod database_helper;
pub mod recording_messenger;
pub mod telegram_mock;
pub mod test_context;

pub use database_helper::*;
pub use recording_messenger::*;
pub use telegram_mock::*;
pub use test_context::*;
