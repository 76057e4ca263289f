// src/pipeline/check.rs

//! Single check cycle: detect, decide, notify, persist.

use chrono::{Local, Utc};

use crate::error::Result;
use crate::models::{Item, Reading, StatusRecord};
use crate::pipeline::transition::{self, Decision};
use crate::services::notifier::restock_body;
use crate::services::{Detector, Notify};
use crate::storage::StatusStore;
use crate::utils::log;

/// Run one full check cycle for an item.
///
/// The store is rewritten on every cycle, even when only the timestamp
/// moved, so `last_checked` survives restarts. Notification failures are
/// logged and swallowed; only persistence errors propagate, and the
/// caller treats those as local to this cycle.
pub async fn run_check(
    item: &Item,
    detector: &Detector,
    store: &mut StatusStore,
    notifier: &dyn Notify,
) -> Result<Reading> {
    log::separator();
    log::header(&format!(
        "Stock check - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    log::sub_item(&format!("Item: {}", item.name));
    log::sub_item(&format!("URL: {}", item.url));

    let reading = detector.check(&item.url).await;
    log::info(&format!("Status: {}", reading.message));

    process_reading(item, &reading, store, notifier).await;
    store.save().await?;

    log::separator();
    Ok(reading)
}

/// Apply a reading to the store and dispatch the notification if due.
///
/// Split from `run_check` so tests can inject readings directly instead of
/// fetching pages.
pub async fn process_reading(
    item: &Item,
    reading: &Reading,
    store: &mut StatusStore,
    notifier: &dyn Notify,
) {
    let key = item.key();
    let now = Utc::now();

    match transition::decide(store.get(&key), reading) {
        Decision::Baseline => {
            log::info(&format!("First check: {}", reading.message));
            store.insert(key, StatusRecord::from_reading(reading, now));
        }
        Decision::Unchanged => {
            log::info("Status unchanged");
            store.touch(&key, now);
        }
        Decision::Hold => {
            log::warn(&format!(
                "Inconclusive check, keeping previous status: {}",
                reading.message
            ));
            store.touch(&key, now);
        }
        Decision::Changed { notify } => {
            store.insert(key, StatusRecord::from_reading(reading, now));

            if notify {
                log::success(&format!("{} is back in stock!", item.name));
                let subject = format!("{} back in stock", item.name);
                let body = restock_body(item, &reading.message);
                if let Err(e) = notifier.notify(item, &subject, &body).await {
                    log::error(&format!("Failed to send notification: {e}"));
                }
            } else {
                log::info(&format!("{} is now out of stock", item.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::StockStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Notifier that records sends instead of talking to a mail server.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Notify for RecordingNotifier {
        async fn notify(&self, _item: &Item, subject: &str, _body: &str) -> Result<()> {
            self.sent.lock().unwrap().push(subject.to_string());
            Ok(())
        }
    }

    fn item() -> Item {
        Item {
            name: "Widget".to_string(),
            url: "https://example.com/widget/".to_string(),
        }
    }

    async fn empty_store(tmp: &TempDir) -> StatusStore {
        StatusStore::load(tmp.path().join("status.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_baseline_never_notifies() {
        let tmp = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();

        for reading in [
            Reading::available("in stock"),
            Reading::unavailable("gone"),
            Reading::unknown("Network error: timeout"),
        ] {
            let mut store = empty_store(&tmp).await;
            process_reading(&item(), &reading, &mut store, &notifier).await;
            assert_eq!(store.get(&item().key()).unwrap().in_stock, reading.status);
        }

        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_restock_notifies_exactly_once() {
        let tmp = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();
        let mut store = empty_store(&tmp).await;

        process_reading(&item(), &Reading::unavailable("gone"), &mut store, &notifier).await;
        process_reading(&item(), &Reading::available("back"), &mut store, &notifier).await;

        assert_eq!(notifier.sent_count(), 1);
        assert_eq!(
            store.get(&item().key()).unwrap().in_stock,
            StockStatus::Available
        );

        // A repeated available reading stays quiet.
        process_reading(&item(), &Reading::available("back"), &mut store, &notifier).await;
        assert_eq!(notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_going_out_of_stock_is_silent() {
        let tmp = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();
        let mut store = empty_store(&tmp).await;

        process_reading(&item(), &Reading::available("back"), &mut store, &notifier).await;
        process_reading(&item(), &Reading::unavailable("gone"), &mut store, &notifier).await;

        assert_eq!(notifier.sent_count(), 0);
        assert_eq!(
            store.get(&item().key()).unwrap().in_stock,
            StockStatus::Unavailable
        );
    }

    #[tokio::test]
    async fn test_unchanged_keeps_message_and_advances_timestamp() {
        let tmp = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();
        let mut store = empty_store(&tmp).await;

        process_reading(
            &item(),
            &Reading::unavailable("Product is not in stock"),
            &mut store,
            &notifier,
        )
        .await;
        let before = store.get(&item().key()).unwrap().clone();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        process_reading(
            &item(),
            &Reading::unavailable("No color variants are currently available"),
            &mut store,
            &notifier,
        )
        .await;

        let after = store.get(&item().key()).unwrap();
        assert_eq!(after.in_stock, before.in_stock);
        assert_eq!(after.message, before.message);
        assert!(after.last_checked > before.last_checked);
    }

    #[tokio::test]
    async fn test_unknown_holds_confirmed_record() {
        let tmp = TempDir::new().unwrap();
        let notifier = RecordingNotifier::default();
        let mut store = empty_store(&tmp).await;

        process_reading(&item(), &Reading::unavailable("gone"), &mut store, &notifier).await;
        let before = store.get(&item().key()).unwrap().clone();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        process_reading(
            &item(),
            &Reading::unknown("Network error: timeout"),
            &mut store,
            &notifier,
        )
        .await;

        let after = store.get(&item().key()).unwrap();
        assert_eq!(after.in_stock, StockStatus::Unavailable);
        assert_eq!(after.message, before.message);
        assert!(after.last_checked > before.last_checked);
        assert_eq!(notifier.sent_count(), 0);
    }
}
