//! Client Module
//!
//! HTTP plumbing shared by the router and the completion backend.

pub mod http;

pub use http::HttpClient;
