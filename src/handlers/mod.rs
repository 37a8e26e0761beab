// src/handlers/mod.rs

pub mod answer;
pub mod quiz;
pub mod user;
