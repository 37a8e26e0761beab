// src/models/mod.rs

pub mod answer;
pub mod ids;
pub mod quiz;
pub mod review;
pub mod user;
