// Common test utilities

#![allow(dead_code)]

pub mod fixtures;
pub mod tracing;
