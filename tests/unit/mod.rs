//! Integration test harness.

mod manager_tests;
mod matching_tests;
mod snapshot_tests;
