//! Utility modules
//!
//! This module contains common utilities used throughout the application,
//! including error handling, logging setup, keyed locks and helper functions.

pub mod errors;
pub mod helpers;
pub mod locks;
pub mod logging;

pub use errors::{ErrorKind, EventManagerError, Result};
pub use locks::KeyedLocks;
