//! Scroll settling

mod support;

use screenlly_capture::{ScrollSync, ScrollTarget};
use screenlly_common::{Point, SettleConfig, Size};
use support::{fast_settle, striped_page, FakeBrowser};

fn tall_browser() -> FakeBrowser {
    FakeBrowser::new(striped_page(300, 1000), Size::new(300, 400))
}

#[tokio::test]
async fn test_settles_immediately_when_scroll_applies() {
    let browser = tall_browser();
    let target = ScrollTarget::Document;
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), fast_settle());

    let settled = sync.scroll_and_settle(Point::new(0, 250)).await.unwrap();

    assert_eq!(settled.offset, Point::new(0, 250));
    assert_eq!(settled.polls, 0);
}

#[tokio::test]
async fn test_clamped_scroll_stops_at_max_offset() {
    let browser = tall_browser();
    let target = ScrollTarget::Document;
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), fast_settle());

    let settled = sync.scroll_and_settle(Point::new(0, 5000)).await.unwrap();

    assert_eq!(settled.offset, Point::new(0, 600));
    assert_eq!(settled.polls, 0);
}

#[tokio::test]
async fn test_lagging_scroll_is_polled() {
    let browser = tall_browser().with_lag(3);
    let target = ScrollTarget::Document;
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), fast_settle());

    let settled = sync.scroll_and_settle(Point::new(0, 300)).await.unwrap();

    assert_eq!(settled.offset, Point::new(0, 300));
    assert_eq!(settled.polls, 2);
    assert_eq!(browser.state.lock().offset_reads, 3);
}

#[tokio::test(start_paused = true)]
async fn test_polling_is_bounded_by_attempts() {
    let browser = tall_browser().with_lag(50);
    let target = ScrollTarget::Document;
    let settle = SettleConfig {
        attempts: 4,
        interval_ms: 500,
    };
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), settle);

    let started = tokio::time::Instant::now();
    let settled = sync.scroll_and_settle(Point::new(0, 300)).await.unwrap();

    // Gives up and reports what it last saw.
    assert_eq!(settled.offset, Point::ORIGIN);
    assert_eq!(settled.polls, 4);
    assert_eq!(browser.state.lock().offset_reads, 5);
    assert!(started.elapsed() >= std::time::Duration::from_millis(2000));
}

#[tokio::test]
async fn test_current_offset_reads_container() {
    let container = screenlly_common::Selector::css("#scroller");
    let browser = tall_browser().with_container(&container);
    let element = screenlly_capture::Driver::find_element(&browser, &container)
        .await
        .unwrap();
    let target = ScrollTarget::Element(element);
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), fast_settle());

    sync.scroll_to(Point::new(0, 420)).await.unwrap();

    assert_eq!(sync.current_offset().await.unwrap(), Point::new(0, 420));
    assert_eq!(browser.state.lock().window_scrolls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_clamped_column_settles_without_polling() {
    let browser = FakeBrowser::new(striped_page(700, 900), Size::new(300, 400));
    let target = ScrollTarget::Document;
    let settle = SettleConfig {
        attempts: 3,
        interval_ms: 500,
    };
    let sync = ScrollSync::new(&browser, &target, browser.max_scroll(), settle);

    let started = tokio::time::Instant::now();
    let settled = sync.scroll_and_settle(Point::new(700, 0)).await.unwrap();

    // Only x is clamped; y is not at its maximum.
    assert_eq!(settled.offset, Point::new(400, 0));
    assert_eq!(settled.polls, 0);
    assert_eq!(browser.state.lock().offset_reads, 1);
    assert!(started.elapsed() < std::time::Duration::from_millis(500));
}
