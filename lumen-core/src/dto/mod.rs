//! Data Transfer Objects sent to the generation API

pub mod generation;
