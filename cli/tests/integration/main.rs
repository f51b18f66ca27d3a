//! Integration tests for nx-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior. The
//! deploy scenarios run against fake `ssh`/`scp`/`python3` scripts on Unix.

mod cli_tests;
