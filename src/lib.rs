#[macro_use]
extern crate log;

pub mod common;
pub mod config;
pub mod setup;
pub mod utils;
pub mod workflow;
