//! Sequential page traversal
//!
//! Pages are pulled one at a time. Each page is checked for emptiness and
//! for a next reference before the following fetch is issued, so the
//! traversal never performs a trailing request past the last page.

use super::types::{LinkPage, NextPage, Page};
use crate::error::{Error, Result};
use crate::extract::extract_all;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use tracing::debug;
use url::Url;

/// What follows the page most recently yielded
#[derive(Debug)]
pub(crate) enum Cursor {
    /// Fetch the next page from this URL
    Fetch(Url),
    /// Next reference was unreadable; surface it on the next pull
    Failed(Error),
    /// Traversal is over
    Finished,
}

/// Decide whether a fetched page is yielded and what comes after it
///
/// `Ok(None)` means the page is empty: it is not yielded and nothing follows.
pub(crate) fn settle<P: Page>(page: P) -> Result<Option<(P, Cursor)>> {
    if page.is_empty()? {
        debug!("Empty page at {}, stopping", page.link_page().url());
        return Ok(None);
    }

    let cursor = match page.next_page() {
        Ok(NextPage::Continue { url }) => Cursor::Fetch(url),
        Ok(NextPage::Done) => {
            debug!("Last page reached at {}", page.link_page().url());
            Cursor::Finished
        }
        Err(e) => Cursor::Failed(e),
    };
    Ok(Some((page, cursor)))
}

// ============================================================================
// Pager
// ============================================================================

/// Restartable traversal of a linked list endpoint
///
/// `fetch` is the page-fetch capability: given a URL it returns the page
/// found there. Every call to [`Pager::pages`] starts again from the initial
/// URL.
pub struct Pager<P, F> {
    initial_url: Url,
    fetch: F,
    _page: PhantomData<fn() -> P>,
}

impl<P, F> Pager<P, F>
where
    P: Page,
    F: FnMut(&Url) -> Result<LinkPage>,
{
    /// Create a pager starting at `initial_url`
    pub fn new(initial_url: Url, fetch: F) -> Self {
        Self {
            initial_url,
            fetch,
            _page: PhantomData,
        }
    }

    /// URL of the first page
    pub fn initial_url(&self) -> &Url {
        &self.initial_url
    }

    /// Start a fresh traversal from the first page
    pub fn pages(&mut self) -> Pages<P, &mut F> {
        Pages::from_url(self.initial_url.clone(), &mut self.fetch)
    }

    /// Hand each page to `handler` until it returns `false` or pages run out
    pub fn each_page<H>(&mut self, mut handler: H) -> Result<()>
    where
        H: FnMut(P) -> Result<bool>,
    {
        for page in self.pages() {
            if !handler(page?)? {
                break;
            }
        }
        Ok(())
    }

    /// Decode the entities of every page, in page order
    pub fn all_items(&mut self) -> Result<Vec<P::Item>> {
        extract_all(self.pages())
    }
}

impl<P, F> std::fmt::Debug for Pager<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("initial_url", &self.initial_url.as_str())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Lazy sequence of pages, one fetch per pull
///
/// Ends after an empty page, after a page without a next reference, or
/// after the first error.
pub struct Pages<P, F> {
    initial: Option<P>,
    cursor: Cursor,
    fetch: F,
}

impl<P, F> Pages<P, F>
where
    P: Page,
    F: FnMut(&Url) -> Result<LinkPage>,
{
    /// Start from a page that has already been fetched
    pub fn starting_at(page: LinkPage, fetch: F) -> Self {
        Self {
            initial: Some(P::from_link_page(page)),
            cursor: Cursor::Finished,
            fetch,
        }
    }

    /// Start by fetching `url`
    pub fn from_url(url: Url, fetch: F) -> Self {
        Self {
            initial: None,
            cursor: Cursor::Fetch(url),
            fetch,
        }
    }
}

impl<P, F> Iterator for Pages<P, F>
where
    P: Page,
    F: FnMut(&Url) -> Result<LinkPage>,
{
    type Item = Result<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = match self.initial.take() {
            Some(page) => page,
            None => match mem::replace(&mut self.cursor, Cursor::Finished) {
                Cursor::Finished => return None,
                Cursor::Failed(e) => return Some(Err(e)),
                Cursor::Fetch(url) => {
                    debug!("Fetching page {}", url);
                    match (self.fetch)(&url) {
                        Ok(page) => P::from_link_page(page),
                        Err(e) => return Some(Err(e)),
                    }
                }
            },
        };

        match settle(page) {
            Ok(Some((page, cursor))) => {
                self.cursor = cursor;
                Some(Ok(page))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<P, F> FusedIterator for Pages<P, F>
where
    P: Page,
    F: FnMut(&Url) -> Result<LinkPage>,
{
}
