//! Lodestone - rule-based authorization engine
//!
//! Resolves the permission rules a user effectively holds through group
//! membership and conditional rule expressions, and answers authorization
//! queries against that set. It exposes all modules for testing purposes.

pub mod authz;
pub mod entities;
pub mod errors;
pub mod session;
pub mod settings;
pub mod storage;
pub mod web;
