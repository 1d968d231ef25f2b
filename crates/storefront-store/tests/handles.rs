//! Several handles sharing one store.

use std::thread;

use serde::{Deserialize, Serialize};
use storefront_store::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    items: Vec<u32>,
    applied_coupon: Option<String>,
}

#[test]
fn test_every_other_handle_is_notified() {
    let widget = MemoryStore::new();
    let checkout = widget.handle();
    let header = widget.handle();
    let mut checkout_feed = checkout.watch();
    let mut header_feed = header.watch();
    let mut widget_feed = widget.watch();

    let snapshot = Snapshot {
        items: vec![1, 2],
        applied_coupon: None,
    };
    widget.set("cart:state", &snapshot).unwrap();

    assert_eq!(checkout_feed.drain().len(), 1);
    assert_eq!(header_feed.drain().len(), 1);
    assert!(widget_feed.drain().is_empty());

    let seen: Option<Snapshot> = header.get("cart:state").unwrap();
    assert_eq!(seen, Some(snapshot));
}

#[test]
fn test_writes_from_another_thread() {
    let page = MemoryStore::new();
    let mut feed = page.watch();
    let worker = page.handle();
    let worker_origin = worker.origin().clone();

    thread::spawn(move || {
        worker
            .set(
                "cart:state",
                &Snapshot {
                    items: vec![7],
                    applied_coupon: Some("SAVE10".to_string()),
                },
            )
            .unwrap();
    })
    .join()
    .unwrap();

    let change = feed.try_next().unwrap();
    assert_eq!(change.key, "cart:state");
    assert_eq!(change.origin, worker_origin);

    let seen: Snapshot = page.get("cart:state").unwrap().unwrap();
    assert_eq!(seen.applied_coupon.as_deref(), Some("SAVE10"));
}

#[test]
fn test_values_survive_dropped_writer() {
    let page = MemoryStore::new();
    {
        let writer = page.handle();
        writer.set("cart:state", &vec![3u32]).unwrap();
    }

    let items: Option<Vec<u32>> = page.get("cart:state").unwrap();
    assert_eq!(items, Some(vec![3]));
}

#[test]
fn test_stored_json_is_camel_case() {
    let page = MemoryStore::new();
    page.set(
        "cart:state",
        &Snapshot {
            items: vec![],
            applied_coupon: Some("FREESHIP".to_string()),
        },
    )
    .unwrap();

    let raw: serde_json::Value = page.get("cart:state").unwrap().unwrap();
    assert_eq!(raw["appliedCoupon"], "FREESHIP");
}

#[tokio::test]
async fn test_feed_closes_when_store_is_gone() {
    let page = MemoryStore::new();
    let mut feed = page.watch();
    drop(page);

    assert!(feed.next().await.is_none());
}
