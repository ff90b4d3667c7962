//! Common library for the admin gateway
//!
//! This crate provides shared functionality used across the services in
//! this workspace: PostgreSQL connectivity and the database error
//! taxonomy.

pub mod database;
pub mod error;
