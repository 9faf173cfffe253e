//! End-to-end tests for the samlkit crates live under `tests/`.
