//! # session-manager-api
//!
//! Shared API types for the session-manager service.
//! This crate is designed to be WASM-compatible and can be used in both
//! backend (Rust) and frontend (WASM/TypeScript via wasm-bindgen) applications.
//!
//! ## Features
//!
//! - Request DTOs (RegisterRequest, LoginRequest, RefreshRequest, ...)
//! - Response DTOs (UserResponse, SessionResponse, ...)
//! - Error response format (ErrorResponse)

pub mod error;
pub mod requests;
pub mod responses;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
