//! Common utilities and helper functions

pub mod time;
