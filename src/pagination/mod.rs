//! Pagination module
//!
//! Supports: `next` string field, `<resource>_links` rel lists
//!
//! # Overview
//!
//! A list endpoint answers with one [`LinkPage`] at a time. Each resource
//! kind wraps it in a typed [`Page`] that knows where its entities live and
//! which [`LinkStrategy`] finds the next page. [`Pager`] walks the chain
//! synchronously; [`page_stream`] does the same for async fetchers.

mod pager;
mod strategies;
mod stream;
mod types;

pub use pager::{Pager, Pages};
pub use strategies::{resolve_next, LinksArray, NextUrlLink};
pub use stream::page_stream;
pub use types::{LinkPage, LinkStrategy, NextPage, Page};

#[cfg(test)]
mod tests;
