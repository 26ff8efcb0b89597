//! What a run leaves behind.
//!
//! The only persisted state is the interpreter pin. Everything else a
//! run learns is carried to later steps as a [`Resolution`] value.

pub mod pin;

pub use pin::{pin_path, read_pin, write_once, PinOutcome, PIN_FILE};

use crate::requirements::ProbeResult;

/// The outcome of a successful interpreter resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub probe: ProbeResult,
    /// Whether an install ran before the interpreter resolved.
    pub installed: bool,
    /// `None` on dry runs, which never write the pin.
    pub pin: Option<PinOutcome>,
}
