// src/cfg/mod.rs

pub mod config;
pub mod metadata_filter;
