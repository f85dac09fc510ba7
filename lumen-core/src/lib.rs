//! Lumen Core
//!
//! Core types shared by the Lumen image-generation tooling.
//!
//! This crate contains:
//! - Domain types: generation jobs, their status, account data
//! - DTOs: request/response bodies exchanged with the generation API

pub mod domain;
pub mod dto;
