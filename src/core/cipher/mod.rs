//! Encryption of file output.
//!
//! Encrypted output files are sealed for a single public key configured as
//! `ejson.public_key`. The only backend is age (x25519, ASCII armored).
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file (e.g., `nacl.rs`)
//! 3. Re-export from this module and select it in the file sink

use crate::error::Result;

mod age;

pub use self::age::{decrypt, parse_recipient, AgeCipher};

/// Seals a document for a fixed recipient.
pub trait Cipher {
    /// Encrypt `plaintext`.
    ///
    /// # Returns
    ///
    /// Text-safe ciphertext suitable for writing to a file.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if encryption fails.
    fn encrypt(&self, plaintext: &[u8]) -> Result<String>;

    /// Public key the output is sealed for, as configured.
    fn public_key(&self) -> &str;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
