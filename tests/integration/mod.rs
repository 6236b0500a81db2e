//! Integration tests module
//!
//! Service-level tests over the in-process store, organized by service, plus
//! cross-service scenarios.
