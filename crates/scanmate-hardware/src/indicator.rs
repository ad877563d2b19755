//! Three-LED color indicator.
//!
//! The indicator drives a red, a green and a blue output line. It keeps no
//! record of the color it shows: every [`Indicator::set_color`] call writes
//! all three lines, which makes it idempotent and lets callers reset it
//! unconditionally.

use crate::error::Result;
use crate::traits::OutputPin;
use crate::types::LedColor;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// RGB indicator built from three output pins.
///
/// # Examples
///
/// ```
/// use scanmate_hardware::indicator::Indicator;
/// use scanmate_hardware::mock::MockPin;
/// use scanmate_hardware::LedColor;
///
/// #[tokio::main]
/// async fn main() -> scanmate_hardware::Result<()> {
///     let (red, red_handle) = MockPin::new(7);
///     let (green, green_handle) = MockPin::new(8);
///     let (blue, blue_handle) = MockPin::new(25);
///     let mut indicator = Indicator::new(red, green, blue);
///
///     indicator.set_color(LedColor::Yellow).await?;
///
///     assert!(red_handle.value());
///     assert!(green_handle.value());
///     assert!(!blue_handle.value());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Indicator<O> {
    red: O,
    green: O,
    blue: O,
}

impl<O: OutputPin> Indicator<O> {
    pub fn new(red: O, green: O, blue: O) -> Self {
        Self { red, green, blue }
    }

    /// Show `color`.
    ///
    /// Issues exactly one enable or disable per line, in red, green, blue
    /// order. Nothing is read back.
    ///
    /// # Errors
    ///
    /// Returns the first pin write error. Later lines are not written.
    pub async fn set_color(&mut self, color: LedColor) -> Result<()> {
        debug!(%color, "indicator");

        let (red, green, blue) = color.as_rgb();
        self.red.set(red).await?;
        self.green.set(green).await?;
        self.blue.set(blue).await
    }

    /// Turn all LEDs off.
    ///
    /// # Errors
    ///
    /// Returns the first pin write error.
    pub async fn off(&mut self) -> Result<()> {
        self.set_color(LedColor::Off).await
    }

    /// Flash `color` `count` times.
    ///
    /// Waits `interval`, shows `color`, waits `interval`, turns the LEDs off,
    /// and repeats. That is `2 * count` color changes, each preceded by a
    /// wait. Deadlines are anchored at the call time, so slow pin writes do
    /// not stretch the pattern. The color shown before the call is left
    /// untouched until the first deadline.
    ///
    /// # Errors
    ///
    /// Returns the first pin write error and stops blinking.
    pub async fn blink(&mut self, color: LedColor, interval: Duration, count: u32) -> Result<()> {
        let mut deadline = Instant::now();

        for _ in 0..count {
            deadline += interval;
            sleep_until(deadline).await;
            self.set_color(color).await?;

            deadline += interval;
            sleep_until(deadline).await;
            self.set_color(LedColor::Off).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPinHandle, PinOp};

    fn indicator() -> (Indicator<MockPin>, [MockPinHandle; 3]) {
        let (red, red_handle) = MockPin::new(7);
        let (green, green_handle) = MockPin::new(8);
        let (blue, blue_handle) = MockPin::new(25);
        (
            Indicator::new(red, green, blue),
            [red_handle, green_handle, blue_handle],
        )
    }

    fn op(high: bool) -> PinOp {
        if high { PinOp::Enable } else { PinOp::Disable }
    }

    #[tokio::test]
    async fn test_set_color_writes_each_line_once() {
        for color in LedColor::ALL {
            let (mut indicator, handles) = indicator();

            indicator.set_color(color).await.unwrap();

            let (r, g, b) = color.as_rgb();
            assert_eq!(handles[0].ops(), vec![op(r)], "red for {color}");
            assert_eq!(handles[1].ops(), vec![op(g)], "green for {color}");
            assert_eq!(handles[2].ops(), vec![op(b)], "blue for {color}");
            assert_eq!(
                LedColor::from_rgb(
                    handles[0].value(),
                    handles[1].value(),
                    handles[2].value()
                ),
                color
            );
        }
    }

    #[tokio::test]
    async fn test_set_color_is_idempotent() {
        let (mut indicator, handles) = indicator();

        indicator.set_color(LedColor::Cyan).await.unwrap();
        indicator.set_color(LedColor::Cyan).await.unwrap();

        assert_eq!(handles[0].ops(), vec![PinOp::Disable, PinOp::Disable]);
        assert_eq!(handles[1].ops(), vec![PinOp::Enable, PinOp::Enable]);
        assert_eq!(handles[2].ops(), vec![PinOp::Enable, PinOp::Enable]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_alternates_color_and_off() {
        let (mut indicator, handles) = indicator();
        let interval = Duration::from_millis(125);

        let start = Instant::now();
        indicator.blink(LedColor::Red, interval, 4).await.unwrap();

        assert_eq!(start.elapsed(), interval * 8);
        assert_eq!(
            handles[0].ops(),
            [PinOp::Enable, PinOp::Disable].repeat(4)
        );
        assert_eq!(handles[1].ops(), vec![PinOp::Disable; 8]);
        assert_eq!(handles[2].ops(), vec![PinOp::Disable; 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_waits_before_first_transition() {
        let (mut indicator, handles) = indicator();
        let interval = Duration::from_millis(100);

        let blink = tokio::spawn(async move {
            indicator.blink(LedColor::Green, interval, 1).await.unwrap();
        });

        tokio::time::sleep(interval / 2).await;
        assert!(handles[1].ops().is_empty());

        tokio::time::sleep(interval).await;
        assert_eq!(handles[1].ops(), vec![PinOp::Enable]);

        blink.await.unwrap();
        assert_eq!(handles[1].ops(), vec![PinOp::Enable, PinOp::Disable]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blink_zero_count_does_nothing() {
        let (mut indicator, handles) = indicator();

        indicator
            .blink(LedColor::White, Duration::from_millis(100), 0)
            .await
            .unwrap();

        assert!(handles.iter().all(|h| h.ops().is_empty()));
    }

    #[tokio::test]
    async fn test_set_color_propagates_write_error() {
        let (mut indicator, handles) = indicator();
        handles[1].fail_next_write();

        let err = indicator.set_color(LedColor::Green).await.unwrap_err();

        assert_eq!(err.pin(), Some(8));
        assert_eq!(handles[0].ops(), vec![PinOp::Disable]);
        assert!(handles[2].ops().is_empty());
    }
}
