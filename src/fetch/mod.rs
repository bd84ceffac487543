// src/fetch/mod.rs
pub mod client;

pub use client::{fetch_page, DEFAULT_TIMEOUT_SECS, DEFAULT_URL};
