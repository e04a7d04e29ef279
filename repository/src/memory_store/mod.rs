//! In-memory repository
//!
//! `MemoryRepository` keeps models in a shared vector and evaluates queries over
//! their JSON form.

pub mod core;
pub mod repository;


pub use core::MemoryRepository;
