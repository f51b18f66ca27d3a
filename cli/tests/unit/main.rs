//! Unit tests for nx-deploy
//!
//! These tests use mocked ports and run fast without spawning ssh or scp.

mod architecture;
mod mocks;
