//! Command implementations

pub mod clear;
pub mod export;
pub mod serve;
pub mod validate;
