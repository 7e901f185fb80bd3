//! Integration test crate for the PocketAI local store.
//!
//! This crate has no library code. It only contains integration tests that
//! exercise end-to-end flows across the store, crypto and type crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p pocket-integration-tests
//! ```
