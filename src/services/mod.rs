// src/services/mod.rs

//! Quiz lifecycle and scoring.
//!
//! Handlers stay thin and call into these modules; everything here works
//! against a [`DocumentStore`](crate::store::DocumentStore) so the same code
//! runs on Postgres and in memory.

pub mod answers;
pub mod identity;
pub mod quizzes;
pub mod quota;
pub mod scoring;
