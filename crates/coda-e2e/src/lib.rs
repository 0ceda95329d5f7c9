//! Black-box integration tests for the coda message queue live in `tests/`.
//! This crate intentionally exports nothing.
