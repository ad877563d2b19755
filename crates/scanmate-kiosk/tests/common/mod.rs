//! Common test utilities for kiosk integration tests.
//!
//! Kiosks are built from mock pins and a scripted capture source. LED
//! assertions work on colors rather than pin writes: the indicator writes
//! red, green and blue once per color change, so zipping the three write
//! logs yields the sequence of colors shown.

#![allow(dead_code)]

use scanmate_hardware::mock::{MockPin, MockPinHandle, PinOp};
use scanmate_hardware::{Indicator, LedColor};
use scanmate_kiosk::{Kiosk, KioskConfig};
use scanmate_scanner::CaptureSource;

/// Observers for the three LED lines.
pub struct Leds {
    pub red: MockPinHandle,
    pub green: MockPinHandle,
    pub blue: MockPinHandle,
}

impl Leds {
    /// Color currently shown.
    pub fn color(&self) -> LedColor {
        LedColor::from_rgb(self.red.value(), self.green.value(), self.blue.value())
    }

    /// Every color shown so far, in order.
    pub fn history(&self) -> Vec<LedColor> {
        let level = |op: &PinOp| *op == PinOp::Enable;
        let red = self.red.writes();
        let green = self.green.writes();
        let blue = self.blue.writes();
        assert_eq!(red.len(), green.len(), "LED lines written unevenly");
        assert_eq!(red.len(), blue.len(), "LED lines written unevenly");

        red.iter()
            .zip(&green)
            .zip(&blue)
            .map(|((r, g), b)| LedColor::from_rgb(level(r), level(g), level(b)))
            .collect()
    }

    pub fn clear(&self) {
        self.red.clear_ops();
        self.green.clear_ops();
        self.blue.clear_ops();
    }
}

/// `count` flashes of `color`.
pub fn blink(color: LedColor, count: usize) -> Vec<LedColor> {
    [color, LedColor::Off].repeat(count)
}

pub const READY: [LedColor; 6] = [
    LedColor::Green,
    LedColor::Off,
    LedColor::Green,
    LedColor::Off,
    LedColor::Green,
    LedColor::Off,
];

/// Shutdown pattern followed by the final reset.
pub const SHUTDOWN: [LedColor; 7] = [
    LedColor::Red,
    LedColor::Off,
    LedColor::Red,
    LedColor::Off,
    LedColor::Red,
    LedColor::Off,
    LedColor::Off,
];

/// Build a kiosk on mock pins 17 (button), 7, 8 and 25 (LEDs).
pub fn kiosk<S: CaptureSource>(
    source: S,
    config: &KioskConfig,
) -> (Kiosk<MockPin, MockPin, S>, MockPinHandle, Leds) {
    let (button, button_handle) = MockPin::new(config.pins.button);
    let (red, red_handle) = MockPin::new(config.pins.red);
    let (green, green_handle) = MockPin::new(config.pins.green);
    let (blue, blue_handle) = MockPin::new(config.pins.blue);

    let kiosk = Kiosk::from_config(button, Indicator::new(red, green, blue), source, config);
    let leds = Leds {
        red: red_handle,
        green: green_handle,
        blue: blue_handle,
    };

    (kiosk, button_handle, leds)
}
