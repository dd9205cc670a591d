#![allow(dead_code)]

pub mod source;

pub use source::{FakeSource, create_test_store, release};
