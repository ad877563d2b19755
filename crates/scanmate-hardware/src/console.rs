//! Operator console for running the kiosk without GPIO hardware.
//!
//! In simulation mode the button and the capture tools are driven from
//! stdin. A single reader thread forwards stdin lines into a channel; the
//! [`ConsoleButton`] treats any line entered while idle as a button press,
//! and the console capture source (in `scanmate-scanner`) consumes the
//! answers to its prompts from the same channel.
//!
//! [`ConsoleLed`] keeps the LED level in memory and traces every change;
//! the indicator logs the resulting color.
//!
//! Two idle commands inject pin failures so the fatal GPIO path can be tried
//! by hand: `fail` makes the pending button read fail, `fail led` makes the
//! next write to any attached LED fail.

use crate::{
    HardwareError, Result,
    traits::{InputPin, OutputPin},
};
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, trace, warn};

/// Idle command failing the button read that receives it.
pub const FAIL_READ_COMMAND: &str = "fail";

/// Idle command arming a failure of the next LED write.
pub const FAIL_LED_COMMAND: &str = "fail led";


/// Shared source of operator input lines.
#[derive(Debug, Clone)]
pub struct ConsoleInput {
    lines: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
    led_fault: Arc<AtomicBool>,
}

impl ConsoleInput {
    /// Start forwarding stdin lines.
    ///
    /// Spawns a detached reader thread that ends on EOF or read error, after
    /// which the console reports itself as closed.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            debug!("console input closed");
        });

        Self::from_receiver(rx)
    }

    /// Create a console fed by the returned sender.
    pub fn channel() -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from_receiver(rx), tx)
    }

    pub fn from_receiver(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            lines: Arc::new(Mutex::new(rx)),
            led_fault: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make the next LED write on this console fail.
    pub fn arm_led_fault(&self) {
        self.led_fault.store(true, Ordering::SeqCst);
    }

    /// Wait for the next line.
    ///
    /// Returns `None` once the input is closed.
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }

    /// Take the next line if one is already available.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Disconnected`] once the input is closed and
    /// drained.
    pub fn try_next_line(&self) -> Result<Option<String>> {
        // Someone else is waiting for an answer, the line is theirs.
        let Ok(mut lines) = self.lines.try_lock() else {
            return Ok(None);
        };

        match lines.try_recv() {
            Ok(line) => Ok(Some(line)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(HardwareError::disconnected("console input"))
            }
        }
    }
}

/// Button pressed by entering a line on the console.
#[derive(Debug, Clone)]
pub struct ConsoleButton {
    id: u32,
    console: ConsoleInput,
}

impl ConsoleButton {
    pub fn new(id: u32, console: ConsoleInput) -> Self {
        Self { id, console }
    }
}

impl InputPin for ConsoleButton {
    fn id(&self) -> u32 {
        self.id
    }

    async fn read(&self) -> Result<bool> {
        let Some(line) = self.console.try_next_line()? else {
            return Ok(false);
        };

        match line.trim().to_ascii_lowercase().as_str() {
            FAIL_READ_COMMAND => Err(HardwareError::io(
                self.id,
                std::io::Error::other("simulated read failure"),
            )),
            FAIL_LED_COMMAND => {
                warn!("next LED write will fail");
                self.console.arm_led_fault();
                Ok(false)
            }
            _ => Ok(true),
        }
    }
}

/// LED that only exists in the log.
#[derive(Debug, Clone)]
pub struct ConsoleLed {
    id: u32,
    high: bool,
    fault: Arc<AtomicBool>,
}

impl ConsoleLed {
    /// Create a console LED, initially disabled like a freshly set up pin.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            high: false,
            fault: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a console LED that fails once `console` arms an LED fault.
    pub fn attached(id: u32, console: &ConsoleInput) -> Self {
        Self {
            fault: Arc::clone(&console.led_fault),
            ..Self::new(id)
        }
    }

    fn write(&mut self, high: bool) -> Result<()> {
        if self.fault.swap(false, Ordering::SeqCst) {
            return Err(HardwareError::io(
                self.id,
                std::io::Error::other("simulated write failure"),
            ));
        }
        trace!(pin = self.id, high, "LED write");
        self.high = high;
        Ok(())
    }
}

impl InputPin for ConsoleLed {
    fn id(&self) -> u32 {
        self.id
    }

    async fn read(&self) -> Result<bool> {
        Ok(self.high)
    }
}

impl OutputPin for ConsoleLed {
    async fn enable(&mut self) -> Result<()> {
        self.write(true)
    }

    async fn disable(&mut self) -> Result<()> {
        self.write(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_button_press_per_line() {
        let (console, tx) = ConsoleInput::channel();
        let button = ConsoleButton::new(17, console);

        assert!(!button.read().await.unwrap());

        tx.send(String::new()).unwrap();
        assert!(button.read().await.unwrap());
        assert!(!button.read().await.unwrap());
    }

    #[tokio::test]
    async fn test_console_button_closed_input() {
        let (console, tx) = ConsoleInput::channel();
        let button = ConsoleButton::new(17, console);
        drop(tx);

        let err = button.read().await.unwrap_err();
        assert!(matches!(err, HardwareError::Disconnected { .. }));
    }

    #[tokio::test]
    async fn test_console_lines_in_order() {
        let (console, tx) = ConsoleInput::channel();
        tx.send("n".to_string()).unwrap();
        tx.send("4006381333931".to_string()).unwrap();
        drop(tx);

        assert_eq!(console.next_line().await.as_deref(), Some("n"));
        assert_eq!(
            console.try_next_line().unwrap().as_deref(),
            Some("4006381333931")
        );
        assert_eq!(console.next_line().await, None);
    }

    #[tokio::test]
    async fn test_console_led_level() {
        let mut led = ConsoleLed::new(7);

        assert!(!led.read().await.unwrap());
        led.enable().await.unwrap();
        assert!(led.read().await.unwrap());
        led.disable().await.unwrap();
        assert!(!led.read().await.unwrap());
    }

    #[tokio::test]
    async fn test_console_fail_command_fails_read() {
        let (console, tx) = ConsoleInput::channel();
        let button = ConsoleButton::new(17, console);
        tx.send("FAIL".to_string()).unwrap();

        let err = button.read().await.unwrap_err();
        assert!(matches!(err, HardwareError::Io { pin: 17, .. }));
        assert!(!button.read().await.unwrap());
    }

    #[tokio::test]
    async fn test_console_fail_led_command_fails_next_write() {
        let (console, tx) = ConsoleInput::channel();
        let button = ConsoleButton::new(17, console.clone());
        let mut red = ConsoleLed::attached(7, &console);
        let mut detached = ConsoleLed::new(8);
        tx.send("fail led".to_string()).unwrap();

        assert!(!button.read().await.unwrap());
        detached.enable().await.unwrap();

        let err = red.enable().await.unwrap_err();
        assert!(matches!(err, HardwareError::Io { pin: 7, .. }));
        assert!(!red.read().await.unwrap());

        red.enable().await.unwrap();
        assert!(red.read().await.unwrap());
    }
}
