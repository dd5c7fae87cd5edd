//! Encoder options.
//!
//! # Beispiel
//!
//! ```
//! use jsontlv::options::EncoderOptions;
//!
//! let opts = EncoderOptions::default()
//!     .with_strict()
//!     .with_max_value_length(1024);
//!
//! assert!(opts.strict());
//! assert_eq!(opts.max_value_length(), Some(1024));
//! assert!(opts.validate().is_ok());
//! ```

use crate::{Error, Result};

/// Options controlling one encoding session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderOptions {
    /// Malformed lines abort the run instead of being skipped.
    pub strict: bool,
    /// Upper bound for string payload lengths (including the sentinel byte).
    ///
    /// Gilt beim Schreiben (Encoder) und beim Lesen (Decoder, tlvdump).
    pub max_value_length: Option<u32>,
}

impl EncoderOptions {
    // --- Builder ---

    /// Aktiviert Strict-Modus.
    pub fn with_strict(mut self) -> Self { self.strict = true; self }
    /// Setzt das Value-Max-Length-Limit.
    pub fn with_max_value_length(mut self, len: u32) -> Self { self.max_value_length = Some(len); self }

    // --- Mutable Setter ---

    /// Setzt Strict-Modus.
    pub fn set_strict(&mut self, val: bool) { self.strict = val; }
    /// Setzt das Value-Max-Length-Limit.
    pub fn set_max_value_length(&mut self, len: Option<u32>) { self.max_value_length = len; }

    // --- Getter ---

    pub fn strict(&self) -> bool { self.strict }
    pub fn max_value_length(&self) -> Option<u32> { self.max_value_length }

    /// Validates the option combination.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOption` if `max_value_length` is `Some(0)`: every
    /// string payload carries at least its sentinel byte.
    pub fn validate(&self) -> Result<()> {
        if self.max_value_length == Some(0) {
            return Err(Error::InvalidOption(
                "max value length must be at least 1 (string sentinel)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = EncoderOptions::default();
        assert!(!opts.strict());
        assert_eq!(opts.max_value_length(), None);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn setters() {
        let mut opts = EncoderOptions::default();
        opts.set_strict(true);
        opts.set_max_value_length(Some(16));
        assert_eq!(opts, EncoderOptions::default().with_strict().with_max_value_length(16));
        opts.set_max_value_length(None);
        assert_eq!(opts.max_value_length(), None);
    }

    #[test]
    fn zero_max_value_length_is_invalid() {
        let opts = EncoderOptions::default().with_max_value_length(0);
        assert!(matches!(opts.validate(), Err(Error::InvalidOption(_))));
        assert!(EncoderOptions::default().with_max_value_length(1).validate().is_ok());
    }
}
