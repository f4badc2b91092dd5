//! Credential prompting.
//!
//! Sessions ask for tokens and passwords through the [`Prompt`] trait so
//! that the authentication logic never touches the terminal directly.

use std::io::{self, IsTerminal};

use dialoguer::Password;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{AuthError, Result};

/// Source of secret user input.
pub trait Prompt {
    /// Ask for a secret value labelled `label` (e.g. "token", "password").
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Prompt` if no value can be read.
    fn secret(&self, label: &str) -> Result<Zeroizing<String>>;
}

/// Prompts on the controlling terminal without echoing input.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn secret(&self, label: &str) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(AuthError::Prompt(format!(
                "cannot prompt for {} in non-interactive mode",
                label
            ))
            .into());
        }

        debug!(label, "prompting for credential");
        let value = Password::new()
            .with_prompt(label)
            .interact()
            .map_err(|e| AuthError::Prompt(e.to_string()))?;
        Ok(Zeroizing::new(value))
    }
}
