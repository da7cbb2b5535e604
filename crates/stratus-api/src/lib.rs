//! Thin client for the Stratus Cloud REST API.
//!
//! The crate wraps every documented endpoint in a method on [`ApiClient`].
//! Responses are returned as [`ApiResponse`] values that expose the raw body
//! and the parsed JSON; error statuses are mapped onto the [`Error`] taxonomy.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratus_api::ApiClient;
//!
//! # async fn example() -> Result<(), stratus_api::Error> {
//! let client = ApiClient::new("my-api-token")?;
//! let response = client.get_servers(100, 0).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod regions;
pub mod types;

pub use client::{ApiClient, ApiResponse};
pub use error::{ApiErrorKind, Error};
