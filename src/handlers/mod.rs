// src/handlers/mod.rs
pub mod status;
pub mod videos;
