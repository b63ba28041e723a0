//! Behavioral specifications for versalock.
//!
//! These tests are black-box: they drive the public lock, retry and store
//! APIs together the way a service would and verify the observable outcome.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// locks/
#[path = "specs/locks/exclusion.rs"]
mod locks_exclusion;
#[path = "specs/locks/remote.rs"]
mod locks_remote;

// retry/
#[path = "specs/retry/convergence.rs"]
mod retry_convergence;
#[path = "specs/retry/composition.rs"]
mod retry_composition;

// config/
#[path = "specs/config/loading.rs"]
mod config_loading;
