//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog.
//! This crate contains the records, the visibility and ownership rules, the
//! pagination helper and the form validation. It has zero infrastructure
//! dependencies.

pub mod access;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::DomainError;
