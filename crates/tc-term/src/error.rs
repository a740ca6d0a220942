// SPDX-License-Identifier: MIT
//
// Errors raised by the color codec.
//
// Geometry is never an error in this crate: out-of-bounds writes to the
// frame buffer are silently dropped. The only failures are color specifiers
// that cannot be decoded into an escape sequence.

use thiserror::Error;

/// A color specifier that could not be turned into an SGR sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Hex strings must be `RRGGBB` or `RGB`, optionally prefixed with `#`.
    #[error("invalid hex color {input:?}: expected #RRGGBB or #RGB")]
    InvalidHex {
        /// The string as given by the caller.
        input: String,
    },

    /// A palette index or packed RGB value beyond what the target supports.
    #[error("color index {index} out of range (max {max})")]
    IndexOutOfRange {
        /// The rejected value.
        index: u32,
        /// The largest value the operation accepts.
        max: u32,
    },
}
