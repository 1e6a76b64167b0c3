//! acrodrill-core — adaptive selection and scoring for exam study sessions.
//!
//! This crate holds the data model, the pure selection, distractor and
//! partial-credit scoring engines, and the thin async layer (progress stores,
//! study coach, [`engine::StudyEngine`]) that drives them.

pub mod coach;
pub mod config;
pub mod distractors;
pub mod drill;
pub mod engine;
pub mod error;
pub mod mastery;
pub mod model;
pub mod parser;
pub mod progress;
pub mod report;
pub mod repository;
pub mod sampling;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod statistics;
pub mod store;
pub mod traits;
