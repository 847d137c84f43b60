//! Async page traversal
//!
//! Same termination rules as [`Pages`](super::Pages), for fetchers that
//! return futures. Still strictly sequential: the next fetch starts only
//! when the consumer pulls.

use super::pager::{settle, Cursor};
use super::types::{LinkPage, Page};
use crate::error::{Error, Result};
use futures::stream::{self, Stream};
use std::future::Future;
use tracing::debug;
use url::Url;

/// Stream the pages of a linked list endpoint starting at `url`
pub fn page_stream<P, F, Fut>(url: Url, fetch: F) -> impl Stream<Item = Result<P>>
where
    P: Page,
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<LinkPage>>,
{
    stream::try_unfold((Cursor::Fetch(url), fetch), |(cursor, mut fetch)| async move {
        let url = match cursor {
            Cursor::Fetch(url) => url,
            Cursor::Failed(e) => return Err(e),
            Cursor::Finished => return Ok(None),
        };

        debug!("Fetching page {}", url);
        let page = P::from_link_page(fetch(url).await?);
        Ok::<_, Error>(settle(page)?.map(|(page, next)| (page, (next, fetch))))
    })
}
