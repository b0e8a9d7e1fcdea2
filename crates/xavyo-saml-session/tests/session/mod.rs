//! Session manager integration tests

pub mod common;
pub mod encoding_tests;
pub mod resume_tests;
