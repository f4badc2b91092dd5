//! age backend.

use std::io::{Read, Write};

use ::age::armor::{ArmoredReader, ArmoredWriter, Format};
use ::age::x25519;
use tracing::trace;

use super::Cipher;
use crate::error::{CipherError, Result};

/// Encrypts for one age x25519 recipient with ASCII armor
pub struct AgeCipher {
    public_key: String,
    recipient: x25519::Recipient,
}

impl AgeCipher {
    /// Create a cipher for an `age1...` public key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidPublicKey` if the key does not parse.
    pub fn for_public_key(public_key: &str) -> Result<Self> {
        let public_key = public_key.trim();
        Ok(Self {
            recipient: parse_recipient(public_key)?,
            public_key: public_key.to_string(),
        })
    }
}

impl Cipher for AgeCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let encryptor = ::age::Encryptor::with_recipients(std::iter::once(
            &self.recipient as &dyn ::age::Recipient,
        ))
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut sealed = Vec::new();
        let armor = ArmoredWriter::wrap_output(&mut sealed, Format::AsciiArmor)
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
        let mut writer = encryptor
            .wrap_output(armor)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        writer
            .write_all(plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?
            .finish()
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;

        trace!(ciphertext_len = sealed.len(), "encrypted");

        String::from_utf8(sealed)
            .map_err(|e| CipherError::ArmorFailed(format!("non UTF-8 armor: {}", e)).into())
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn name(&self) -> &'static str {
        "age"
    }
}

/// Decrypt armored age output with `identity`.
///
/// # Errors
///
/// Returns `CipherError::DecryptionFailed` if the input is not age output or
/// was not sealed for `identity`.
pub fn decrypt(armored: &str, identity: &x25519::Identity) -> Result<Vec<u8>> {
    let failed = |e: &dyn std::fmt::Display| CipherError::DecryptionFailed(e.to_string());

    let decryptor =
        ::age::Decryptor::new(ArmoredReader::new(armored.as_bytes())).map_err(|e| failed(&e))?;
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn ::age::Identity))
        .map_err(|e| failed(&e))?;

    let mut plaintext = Vec::new();
    reader.read_to_end(&mut plaintext).map_err(|e| failed(&e))?;
    Ok(plaintext)
}

/// Parse an `age1...` public key
///
/// # Errors
///
/// Returns `CipherError::InvalidPublicKey` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidPublicKey(key.to_string()).into())
}
