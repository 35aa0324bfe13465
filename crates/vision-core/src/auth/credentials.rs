use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "vision-admin";

/// Remembered admin passwords in the OS keychain, keyed by backend origin and
/// username so the same login on two sites does not collide.
pub struct CredentialStore;

impl CredentialStore {
    fn entry(origin: &str, username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &Self::account(origin, username))
            .context("Failed to create keyring entry")
    }

    fn account(origin: &str, username: &str) -> String {
        format!("{}@{}", username, origin)
    }

    /// Store username and password in the OS keychain
    pub fn store(origin: &str, username: &str, password: &str) -> Result<()> {
        Self::entry(origin, username)?
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve password for a username from the OS keychain
    pub fn get_password(origin: &str, username: &str) -> Result<String> {
        Self::entry(origin, username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for a username
    pub fn delete(origin: &str, username: &str) -> Result<()> {
        Self::entry(origin, username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check if credentials exist for a username
    pub fn has_credentials(origin: &str, username: &str) -> bool {
        Self::entry(origin, username)
            .and_then(|entry| entry.get_password().map_err(Into::into))
            .is_ok()
    }
}
