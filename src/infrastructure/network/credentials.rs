// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::common::parsing::strip_0x;
use alloy::signers::local::PrivateKeySigner;
use std::path::PathBuf;
use std::str::FromStr;

/// Supplies the signing account for an invocation.
pub trait CredentialProvider {
    fn load(&self) -> Result<PrivateKeySigner, AppError>;

    /// Human-readable origin, for logs. Must not include secrets.
    fn describe(&self) -> String;
}

/// Web3 Secret Storage keystore file unlocked with a password.
pub struct KeystoreCredentials {
    path: PathBuf,
    password: String,
}

impl KeystoreCredentials {
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
        }
    }
}

impl CredentialProvider for KeystoreCredentials {
    fn load(&self) -> Result<PrivateKeySigner, AppError> {
        if !self.path.exists() {
            return Err(AppError::AccountLoad(format!(
                "keystore not found: {}",
                self.path.display()
            )));
        }
        PrivateKeySigner::decrypt_keystore(&self.path, &self.password).map_err(|e| {
            AppError::AccountLoad(format!(
                "keystore {} could not be decrypted: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn describe(&self) -> String {
        format!("keystore {}", self.path.display())
    }
}

/// Raw hex private key.
pub struct PrivateKeyCredentials {
    key: String,
}

impl PrivateKeyCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialProvider for PrivateKeyCredentials {
    fn load(&self) -> Result<PrivateKeySigner, AppError> {
        let trimmed = strip_0x(self.key.trim());
        if trimmed.is_empty() {
            return Err(AppError::AccountLoad("private key is empty".into()));
        }
        PrivateKeySigner::from_str(trimmed)
            .map_err(|e| AppError::AccountLoad(format!("invalid private key: {e}")))
    }

    fn describe(&self) -> String {
        "private key".to_string()
    }
}
