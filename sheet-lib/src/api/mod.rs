//! Request and response types for the remote table service

pub mod query;
