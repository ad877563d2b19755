//! Integration tests for the kiosk event loop.
//!
//! All tests run on a paused clock, so every settle delay, blink and hold
//! completes instantly while keeping its virtual duration.

mod common;

use common::{READY, SHUTDOWN, blink};
use scanmate_hardware::LedColor;
use scanmate_kiosk::{KioskConfig, KioskError, ShutdownSignal, WorkflowError};
use scanmate_scanner::mock::{MockScanner, MockScannerHandle};
use scanmate_scanner::{CaptureError, CaptureSource, DecodeError};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Raises the shutdown flag when the first image is taken.
struct SignalOnCapture {
    inner: MockScanner,
    shutdown: ShutdownSignal,
}

impl CaptureSource for SignalOnCapture {
    async fn capture_image(&mut self) -> Result<(), CaptureError> {
        self.shutdown.trigger();
        self.inner.capture_image().await
    }

    async fn decode_image(&mut self) -> Result<String, DecodeError> {
        self.inner.decode_image().await
    }
}

fn scripted(barcodes: &[&str]) -> (MockScanner, MockScannerHandle) {
    let (scanner, script) = MockScanner::new();
    for barcode in barcodes {
        script.decode_after_misses(0, barcode);
    }
    (scanner, script)
}

/// Indicator colors of a transaction that reads both barcodes first time.
fn successful_transaction() -> Vec<LedColor> {
    vec![
        // authorization: waiting color, off after capture, reset
        LedColor::Blue,
        LedColor::Off,
        LedColor::Off,
        // product
        LedColor::Magenta,
        LedColor::Off,
        LedColor::Off,
        // success hold, then reset
        LedColor::Green,
        LedColor::Off,
    ]
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_idle() {
    let (scanner, script) = MockScanner::new();
    let (mut kiosk, button, leds) = common::kiosk(scanner, &KioskConfig::default());
    let shutdown = ShutdownSignal::new();
    shutdown.trigger();
    let started = Instant::now();

    kiosk.run(&shutdown).await.unwrap();

    assert_eq!(leds.history(), [READY.as_slice(), &SHUTDOWN].concat());
    assert_eq!(leds.color(), LedColor::Off);
    assert_eq!(button.read_count(), 0);
    assert!(script.calls().is_empty());
    assert_eq!(started.elapsed(), Duration::from_millis(1200));
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_transaction() {
    let (scanner, script) = scripted(&["AUTH123", "BOTTLE456"]);
    let (mut kiosk, button, leds) = common::kiosk(scanner, &KioskConfig::default());
    button.queue_reads([true]);

    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let result = kiosk.run(&shutdown).await;
            (kiosk, result)
        }
    });

    sleep(Duration::from_secs(30)).await;
    shutdown.trigger();
    let (kiosk, result) = task.await.unwrap();

    result.unwrap();
    assert_eq!(kiosk.completed_transactions(), 1);
    let transaction = kiosk.last_transaction().unwrap();
    assert_eq!(transaction.auth.as_str(), "AUTH123");
    assert_eq!(transaction.product.as_str(), "BOTTLE456");
    assert_eq!(script.capture_count(), 2);
    assert_eq!(script.decode_count(), 2);
    assert_eq!(
        leds.history(),
        [READY.as_slice(), &successful_transaction(), &SHUTDOWN].concat()
    );
    assert!(button.read_count() > 1);
    assert!(kiosk.workflow().history().len() >= 10);
}

#[tokio::test(start_paused = true)]
async fn test_transaction_holds_success_color() {
    let (scanner, _script) = scripted(&["AUTH123", "BOTTLE456"]);
    let (mut kiosk, _button, leds) = common::kiosk(scanner, &KioskConfig::default());
    let started = Instant::now();

    let transaction = kiosk.run_transaction().await.unwrap();

    assert_eq!(transaction.auth.as_str(), "AUTH123");
    assert_eq!(transaction.product.as_str(), "BOTTLE456");
    assert_eq!(leds.color(), LedColor::Green);
    // Two settle delays, then the success hold.
    assert_eq!(started.elapsed(), Duration::from_millis(1500 + 1500 + 3000));
}

#[tokio::test(start_paused = true)]
async fn test_signal_during_transaction_is_honored_afterwards() {
    let (inner, script) = scripted(&["AUTH123", "BOTTLE456"]);
    let shutdown = ShutdownSignal::new();
    let source = SignalOnCapture {
        inner,
        shutdown: shutdown.clone(),
    };
    let (mut kiosk, button, leds) = common::kiosk(source, &KioskConfig::default());
    button.queue_reads([true]);

    kiosk.run(&shutdown).await.unwrap();

    assert_eq!(script.capture_count(), 2);
    assert_eq!(button.read_count(), 1);
    assert_eq!(
        leds.history(),
        [READY.as_slice(), &successful_transaction(), &SHUTDOWN].concat()
    );
}

#[tokio::test(start_paused = true)]
async fn test_button_read_failure_is_fatal() {
    let (scanner, script) = MockScanner::new();
    let (mut kiosk, button, leds) = common::kiosk(scanner, &KioskConfig::default());
    button.fail_next_read();

    let err = kiosk.run(&ShutdownSignal::new()).await.unwrap_err();

    assert!(matches!(err, KioskError::Hardware(_)));
    assert!(script.calls().is_empty());
    assert_eq!(leds.history(), READY);
}

#[tokio::test(start_paused = true)]
async fn test_led_failure_during_transaction_is_fatal() {
    let (scanner, script) = scripted(&["AUTH123", "BOTTLE456"]);
    let (mut kiosk, button, leds) = common::kiosk(scanner, &KioskConfig::default());
    button.queue_reads([true]);

    // Let the ready pattern finish before breaking the blue line.
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { kiosk.run(&shutdown).await }
    });
    sleep(Duration::from_millis(700)).await;
    leds.blue.fail_next_write();

    let err = task.await.unwrap().unwrap_err();

    assert!(matches!(err, KioskError::Hardware(_)));
    assert!(script.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_authorization_resumes_polling() {
    let config = KioskConfig {
        max_attempts: 2,
        ..KioskConfig::default()
    };
    let (scanner, script) = MockScanner::new();
    let (mut kiosk, button, leds) = common::kiosk(scanner, &config);
    button.queue_reads([true]);

    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { kiosk.run(&shutdown).await }
    });

    sleep(Duration::from_secs(30)).await;
    let reads_before_shutdown = button.read_count();
    shutdown.trigger();
    task.await.unwrap().unwrap();

    assert_eq!(script.capture_count(), 2);
    assert!(reads_before_shutdown > 100);

    let colors = leds.history();
    assert!(!colors.contains(&LedColor::Magenta));
    assert_eq!(
        colors.iter().filter(|c| **c == LedColor::Yellow).count(),
        2 * 4
    );
    assert!(colors.ends_with(&SHUTDOWN));
}

#[tokio::test(start_paused = true)]
async fn test_scan_error_abandons_transaction_when_exit_disabled() {
    let config = KioskConfig {
        exit_on_scan_error: false,
        ..KioskConfig::default()
    };
    let (scanner, script) = scripted(&["AUTH123", "BOTTLE456"]);
    script.push_capture(Err(CaptureError::other("camera busy")));
    let (mut kiosk, button, leds) = common::kiosk(scanner, &config);
    button.queue_reads([true, false, true]);

    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let result = kiosk.run(&shutdown).await;
            (kiosk, result)
        }
    });

    sleep(Duration::from_secs(30)).await;
    shutdown.trigger();
    let (kiosk, result) = task.await.unwrap();

    result.unwrap();
    assert_eq!(kiosk.completed_transactions(), 1);
    // The failed press captured once, the second press read both barcodes.
    assert_eq!(script.capture_count(), 3);
    assert_eq!(script.decode_count(), 2);

    let failed_press = [
        vec![LedColor::Blue],
        blink(LedColor::Red, 4),
        vec![LedColor::Off, LedColor::Off],
    ]
    .concat();
    assert_eq!(
        leds.history(),
        [
            READY.as_slice(),
            &failed_press,
            &successful_transaction(),
            &SHUTDOWN
        ]
        .concat()
    );
}

#[tokio::test(start_paused = true)]
async fn test_decode_error_stops_kiosk_by_default() {
    let (scanner, script) = MockScanner::new();
    script.push_decode(Err(DecodeError::fatal("zbarimg crashed")));
    let (mut kiosk, button, leds) = common::kiosk(scanner, &KioskConfig::default());
    button.queue_reads([true]);

    // No signal is ever raised, only the failure can end the loop.
    let shutdown = ShutdownSignal::new();
    let err = tokio::time::timeout(Duration::from_secs(20), kiosk.run(&shutdown))
        .await
        .expect("kiosk kept polling after a fatal decode error")
        .unwrap_err();

    match err {
        KioskError::Scan(WorkflowError::Decode(DecodeError::Fatal { message })) => {
            assert_eq!(message, "zbarimg crashed");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(script.capture_count(), 1);
    assert_eq!(button.read_count(), 1);
    assert_eq!(kiosk.completed_transactions(), 0);
    assert_eq!(leds.color(), LedColor::Off);
    assert!(!leds.history().ends_with(&SHUTDOWN));
}

#[tokio::test(start_paused = true)]
async fn test_capture_error_stops_kiosk_by_default() {
    let (scanner, script) = scripted(&["AUTH123", "BOTTLE456"]);
    script.push_capture(Err(CaptureError::other("camera busy")));
    let (mut kiosk, button, _leds) = common::kiosk(scanner, &KioskConfig::default());
    button.queue_reads([true, false, true]);

    let err = kiosk.run(&ShutdownSignal::new()).await.unwrap_err();

    assert!(matches!(err, KioskError::Scan(WorkflowError::Capture(_))));
    assert_eq!(script.capture_count(), 1);
    assert_eq!(script.decode_count(), 0);
    assert!(kiosk.last_transaction().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_custom_waiting_colors() {
    let mut config = KioskConfig::default();
    config.colors.auth = LedColor::Cyan;
    config.colors.product = LedColor::White;
    let (scanner, _script) = scripted(&["AUTH123", "BOTTLE456"]);
    let (mut kiosk, _button, leds) = common::kiosk(scanner, &config);

    kiosk.run_transaction().await.unwrap();

    let colors = leds.history();
    assert_eq!(colors[0], LedColor::Cyan);
    assert_eq!(colors[3], LedColor::White);
    leds.clear();
    assert!(leds.history().is_empty());
}
