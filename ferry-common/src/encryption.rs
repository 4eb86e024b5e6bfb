//! File encryption key container
//!
//! Encrypted transfers carry a key that only the workers use; the
//! coordinator passes it through untouched. An empty key means the file is
//! transferred in the clear.

use serde::{Deserialize, Serialize};

/// Key material for an encrypted transfer
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEncryptionKey {
    secret: Vec<u8>,
}

impl FileEncryptionKey {
    /// Key for an unencrypted transfer
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Returns true if the transfer is unencrypted
    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

// Manual Debug so key bytes never end up in logs
impl std::fmt::Debug for FileEncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEncryptionKey")
            .field("len", &self.secret.len())
            .finish()
    }
}
