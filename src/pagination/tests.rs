//! Tests for pagination module

use super::*;
use crate::decode::{Entity, FieldReader, KnownFieldSet};
use crate::error::{Error, Result, TransportError};
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::LazyLock;
use test_case::test_case;
use url::Url;

// ============================================================================
// Test Page
// ============================================================================

static ITEM_FIELDS: LazyLock<KnownFieldSet> = LazyLock::new(|| KnownFieldSet::new(&["id"]));

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: String,
}

impl Entity for Item {
    fn known_fields() -> &'static KnownFieldSet {
        &ITEM_FIELDS
    }

    fn decode_fields(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.string("id")?,
        })
    }
}

#[derive(Debug)]
struct ItemPage(LinkPage);

impl Page for ItemPage {
    type Item = Item;
    const COLLECTION_KEY: &'static str = "items";

    fn from_link_page(page: LinkPage) -> Self {
        Self(page)
    }

    fn link_page(&self) -> &LinkPage {
        &self.0
    }

    fn next_page(&self) -> Result<NextPage> {
        NextUrlLink::default().next_page(&self.0)
    }
}

const BASE: &str = "https://api.example.com/v2/items";

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn page(at: &str, body: Value) -> LinkPage {
    LinkPage::new(url(at), serde_json::to_vec(&body).unwrap())
}

type Site = HashMap<String, Value>;

fn site(pages: &[(&str, Value)]) -> Site {
    pages
        .iter()
        .map(|(at, body)| ((*at).to_string(), body.clone()))
        .collect()
}

fn fetcher<'a>(site: &'a Site, calls: &'a Cell<usize>) -> impl FnMut(&Url) -> Result<LinkPage> + 'a {
    move |at: &Url| {
        calls.set(calls.get() + 1);
        site.get(at.as_str())
            .map(|body| page(at.as_str(), body.clone()))
            .ok_or_else(|| TransportError::status(404, at.as_str()).into())
    }
}

fn ids(pages: &[ItemPage]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.extract().unwrap())
        .map(|item| item.id)
        .collect()
}

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_with_url() {
    let next = NextPage::with_url(url("https://api.example.com/page2"));
    assert!(next.is_continue());
    assert!(!next.is_done());
    assert_eq!(next.url().map(Url::as_str), Some("https://api.example.com/page2"));
}

#[test]
fn test_next_page_done() {
    let next = NextPage::Done;
    assert!(next.is_done());
    assert!(!next.is_continue());
    assert!(next.into_url().is_none());
}

// ============================================================================
// NextUrlLink Tests
// ============================================================================

#[test_case(json!({"items": [{"id": "a"}]}) ; "absent")]
#[test_case(json!({"items": [{"id": "a"}], "next": ""}) ; "empty")]
#[test_case(json!({"items": [{"id": "a"}], "next": null}) ; "null")]
fn test_next_url_terminal(body: Value) {
    let next = NextUrlLink::default().next_page(&page(BASE, body)).unwrap();
    assert_eq!(next, NextPage::Done);
}

#[test]
fn test_next_url_relative_resolves_against_request_url() {
    let p = page(BASE, json!({"items": [], "next": "/v2/items?marker=a"}));
    let next = NextUrlLink::default().next_page(&p).unwrap();
    assert_eq!(
        next.url().map(Url::as_str),
        Some("https://api.example.com/v2/items?marker=a")
    );
}

#[test]
fn test_next_url_wrong_type_is_pagination_error() {
    let p = page(BASE, json!({"items": [], "next": 2}));
    let err = NextUrlLink::default().next_page(&p).unwrap_err();
    assert!(matches!(err, Error::MissingPaginationMetadata { .. }));
}

// ============================================================================
// LinksArray Tests
// ============================================================================

#[test]
fn test_links_array_follows_next_rel() {
    let p = page(
        BASE,
        json!({
            "volumes_links": [
                {"rel": "self", "href": "https://api.example.com/v2/volumes"},
                {"rel": "next", "href": "https://api.example.com/v2/volumes?marker=v9"}
            ]
        }),
    );
    let next = LinksArray::new("volumes_links").next_page(&p).unwrap();
    assert_eq!(
        next.url().map(Url::as_str),
        Some("https://api.example.com/v2/volumes?marker=v9")
    );
}

#[test]
fn test_links_array_custom_rel() {
    let p = page(BASE, json!({"links": [{"rel": "forward", "href": "/v2/items?page=3"}]}));
    let next = LinksArray::new("links").with_rel("forward").next_page(&p).unwrap();
    assert_eq!(
        next.url().map(Url::as_str),
        Some("https://api.example.com/v2/items?page=3")
    );
}

#[test_case(json!({}) ; "absent")]
#[test_case(json!({"volumes_links": []}) ; "empty list")]
#[test_case(json!({"volumes_links": [{"rel": "self", "href": "x"}]}) ; "no next rel")]
#[test_case(json!({"volumes_links": [{"rel": "next", "href": ""}]}) ; "empty href")]
fn test_links_array_terminal(body: Value) {
    let next = LinksArray::new("volumes_links").next_page(&page(BASE, body)).unwrap();
    assert!(next.is_done());
}

#[test_case(json!({"volumes_links": "next"}) ; "not an array")]
#[test_case(json!({"volumes_links": [{"rel": "next"}]}) ; "missing href")]
#[test_case(json!({"volumes_links": [42]}) ; "not an object")]
fn test_links_array_malformed(body: Value) {
    let err = LinksArray::new("volumes_links").next_page(&page(BASE, body)).unwrap_err();
    assert!(matches!(err, Error::MissingPaginationMetadata { .. }));
}

// ============================================================================
// URL Resolution Tests
// ============================================================================

#[test_case(
    "https://api.example.com/v2/items",
    "https://other.example.com/v2/items?marker=x",
    "https://other.example.com/v2/items?marker=x" ;
    "absolute url passes through"
)]
#[test_case(
    "https://api.example.com/v2/items",
    "page2",
    "https://api.example.com/v2/page2" ;
    "relative fragment"
)]
#[test_case(
    "https://api.example.com/image/v2/images?limit=2",
    "/v2/images?marker=abc&limit=2",
    "https://api.example.com/image/v2/images?marker=abc&limit=2" ;
    "service prefix kept"
)]
#[test_case(
    "https://api.example.com:9292/v2/images",
    "/v2/images?marker=abc",
    "https://api.example.com:9292/v2/images?marker=abc" ;
    "no prefix"
)]
#[test_case(
    "https://api.example.com/prefix/items",
    "/other/items",
    "https://api.example.com/other/items" ;
    "unrelated absolute path"
)]
fn test_resolve_next(current: &str, next: &str, expected: &str) {
    assert_eq!(resolve_next(&url(current), next).unwrap().as_str(), expected);
}

// ============================================================================
// Pager Tests
// ============================================================================

#[test]
fn test_pager_walks_chain_then_stops() {
    let site = site(&[
        (BASE, json!({"items": [{"id": "a"}], "next": "page2"})),
        (
            "https://api.example.com/v2/page2",
            json!({"items": [{"id": "b"}], "next": ""}),
        ),
    ]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));

    let pages: Vec<ItemPage> = pager.pages().collect::<Result<_>>().unwrap();
    assert_eq!(ids(&pages), vec!["a", "b"]);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_pager_is_restartable() {
    let site = site(&[
        (BASE, json!({"items": [{"id": "a"}], "next": "page2"})),
        ("https://api.example.com/v2/page2", json!({"items": [{"id": "b"}]})),
    ]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));

    let first: Vec<Item> = pager.all_items().unwrap();
    let second: Vec<Item> = pager.all_items().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(calls.get(), 4);
}

#[test]
fn test_empty_initial_page_terminates_without_fetch() {
    let site = Site::new();
    let calls = Cell::new(0);
    let initial = page(BASE, json!({"items": [], "next": "page2"}));

    let mut pages: Pages<ItemPage, _> = Pages::starting_at(initial, fetcher(&site, &calls));
    assert!(pages.next().is_none());
    assert!(pages.next().is_none());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_empty_page_is_detected() {
    let empty = ItemPage(page(BASE, json!({"items": []})));
    assert!(empty.is_empty().unwrap());

    let missing = ItemPage(page(BASE, json!({})));
    assert!(missing.is_empty().unwrap());

    let full = ItemPage(page(BASE, json!({"items": [{"id": "a"}]})));
    assert!(!full.is_empty().unwrap());
}

#[test]
fn test_empty_page_mid_chain_stops() {
    let site = site(&[
        (BASE, json!({"items": [{"id": "a"}], "next": "page2"})),
        (
            "https://api.example.com/v2/page2",
            json!({"items": [], "next": "page3"}),
        ),
    ]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));

    let items = pager.all_items().unwrap();
    assert_eq!(items, vec![Item { id: "a".into() }]);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_fetch_failure_surfaces_and_ends() {
    let site = site(&[(BASE, json!({"items": [{"id": "a"}], "next": "missing"}))]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));
    let mut pages = pager.pages();

    assert!(pages.next().unwrap().is_ok());
    let err = pages.next().unwrap().unwrap_err();
    assert!(err.is_transport());
    assert!(pages.next().is_none());
}

#[test]
fn test_malformed_next_yields_page_then_error() {
    let site = Site::new();
    let calls = Cell::new(0);
    let initial = page(BASE, json!({"items": [{"id": "a"}], "next": {"href": "x"}}));
    let mut pages: Pages<ItemPage, _> = Pages::starting_at(initial, fetcher(&site, &calls));

    let first = pages.next().unwrap().unwrap();
    assert_eq!(ids(&[first]), vec!["a"]);
    let err = pages.next().unwrap().unwrap_err();
    assert!(matches!(err, Error::MissingPaginationMetadata { .. }));
    assert!(pages.next().is_none());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_undecodable_page_fails_traversal() {
    let site = site(&[(BASE, json!({"items": [{"id": 7}], "next": "page2"}))]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));

    let err = pager.all_items().unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_each_page_stops_when_handler_declines() {
    let site = site(&[
        (BASE, json!({"items": [{"id": "a"}], "next": "page2"})),
        ("https://api.example.com/v2/page2", json!({"items": [{"id": "b"}]})),
    ]);
    let calls = Cell::new(0);
    let mut pager: Pager<ItemPage, _> = Pager::new(url(BASE), fetcher(&site, &calls));

    let mut seen = Vec::new();
    pager
        .each_page(|page| {
            seen.extend(page.extract()?);
            Ok(false)
        })
        .unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// Stream Tests
// ============================================================================

#[test]
fn test_page_stream_matches_pager() {
    use futures::TryStreamExt;

    let site = site(&[
        (BASE, json!({"items": [{"id": "a"}, {"id": "b"}], "next": "page2"})),
        (
            "https://api.example.com/v2/page2",
            json!({"items": [{"id": "c"}], "next": ""}),
        ),
    ]);
    let calls = Cell::new(0);

    let stream = page_stream::<ItemPage, _, _>(url(BASE), |at: Url| {
        calls.set(calls.get() + 1);
        let result = site
            .get(at.as_str())
            .map(|body| page(at.as_str(), body.clone()))
            .ok_or_else(|| Error::from(TransportError::status(404, at.as_str())));
        async move { result }
    });

    let pages: Vec<ItemPage> = tokio_test::block_on(stream.try_collect()).unwrap();
    assert_eq!(ids(&pages), vec!["a", "b", "c"]);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_page_stream_surfaces_fetch_error() {
    use futures::StreamExt;

    let stream = page_stream::<ItemPage, _, _>(url(BASE), |at: Url| async move {
        Err::<LinkPage, _>(Error::from(TransportError::status(503, at.as_str())))
    });

    let results: Vec<Result<ItemPage>> = tokio_test::block_on(stream.collect());
    assert_eq!(results.len(), 1);
    assert!(results[0].as_ref().unwrap_err().is_transport());
}
