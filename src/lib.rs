// src/lib.rs - Library root for the Kubo Pods client

pub mod api;
pub mod cli;
pub mod infra;
pub mod store;
pub mod util;
