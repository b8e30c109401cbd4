//! # IO Module
//!
//! Adapter layer between HTTP clients and the family store. Handlers here
//! translate JSON requests into store operations and store results (or
//! [`FamilyError`](crate::domain::FamilyError)s) into HTTP responses. No
//! business rules live in this layer.

pub mod rest;
