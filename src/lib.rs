// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_fields_in_debug)]

//! # stacklink
//!
//! Response decoding and linked pagination for OpenStack-style REST APIs.
//!
//! ## Features
//!
//! - **Result Envelopes**: Request outcomes carry either a body or the
//!   transport error, decoded lazily on `extract`
//! - **Entity Decoding**: Typed records with flexible numerics, layout-aware
//!   timestamps, and custom properties folded into a string map
//! - **Linked Pagination**: Pages chained through `next` URLs or `*_links`
//!   arrays, walked lazily until an empty page or a missing link
//! - **Collection Extraction**: Decode the entity array of one page or all
//!   pages of a chain
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stacklink::{ClientConfig, ImagePage, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::from_file("image.yaml")?;
//!     let client = config.client()?;
//!
//!     for image in client.list_all::<ImagePage>("/v2/images").await? {
//!         println!("{} {:?}", image.id, image.properties);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │            HttpClient (reqwest, retries, backoff)            │
//! │  get/post/put/patch → ResultEnvelope   fetch_page → LinkPage │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────┬───────────────────┐
//! │   Envelope   │        Pagination         │      Extract      │
//! ├──────────────┼───────────────────────────┼───────────────────┤
//! │ extract<E>   │ NextUrlLink  LinksArray   │ extract_page      │
//! │ extract_into │ Pager  page_stream        │ extract_all       │
//! └──────────────┴───────────────────────────┴───────────────────┘
//!                                │
//!                ┌───────────────┴───────────────┐
//!                │  Decode: Entity, FieldReader, │
//!                │  KnownFieldSet, TimeLayout    │
//!                └───────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Entity decoding and custom property extraction
pub mod decode;

/// Result envelopes for single requests
pub mod envelope;

/// Linked pages, link strategies and the pager
pub mod pagination;

/// Collection extraction over pages
pub mod extract;

/// Image and volume resource kinds
pub mod resources;

/// HTTP client with retry
pub mod http;

/// Client configuration
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, TransportError};
pub use types::*;

pub use config::{BackoffConfig, ClientConfig};
pub use decode::{Entity, FieldReader, KnownFieldSet, TimeLayout};
pub use envelope::{ErrResult, ResultEnvelope};
pub use extract::{extract_all, extract_collection, extract_page};
pub use http::{HttpClient, HttpClientConfig};
pub use pagination::{LinkPage, LinkStrategy, LinksArray, NextPage, NextUrlLink, Page, Pager};
pub use resources::{Image, ImagePage, Volume, VolumePage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
