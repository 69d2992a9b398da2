// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod cmd;
pub mod config;
pub mod error;
pub mod foreign;
pub mod generator;
pub mod schema;
pub mod session;
pub mod warnings;
