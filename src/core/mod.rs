//! Core signal processing traits.
//!
//! - `Signal` for mono sample sources
//! - `Pitched` for anything with a tunable frequency

mod signal;

pub use signal::{Pitched, Signal};
