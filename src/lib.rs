//! Workspace root. See the member crates under `crates/`.
