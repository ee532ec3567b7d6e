//! Common test utilities

#![allow(dead_code)]

pub mod eta_mock;

pub use eta_mock::*;
