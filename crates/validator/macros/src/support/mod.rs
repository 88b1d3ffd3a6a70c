//! Internal support utilities for the derive.

pub mod utils;
