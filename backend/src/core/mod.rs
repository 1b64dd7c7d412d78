//! Core primitives shared by every module

pub mod money;
pub mod time;
