//! HTTP client module
//!
//! Provides the HTTP client with retry and backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Result Envelopes**: Request outcomes are wrapped, never thrown
//! - **Linked Listing**: Page fetching and streaming over `next` links

mod client;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, AUTH_TOKEN_HEADER,
};
