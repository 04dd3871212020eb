//! # CRM Common Library
//!
//! Shared code for the CRM maintenance tools including:
//! - Database schema creation and row models
//! - Configuration loading and root folder resolution
//! - Timestamp and identifier helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
