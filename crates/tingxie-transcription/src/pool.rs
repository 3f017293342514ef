//! Rotating pool of provider credentials.

use parking_lot::Mutex;
use tingxie_core::Credential;

use crate::errors::PoolEmpty;

/// An ordered set of credentials with a circular cursor.
///
/// Built once at startup and shared by `Arc` between drivers. Reading the
/// current slot and rotating are each a single critical section; the lock is
/// never held across an await.
#[derive(Debug)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
    index: Mutex<usize>,
}

impl CredentialPool {
    /// Create a pool starting at the first credential.
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            index: Mutex::new(0),
        }
    }

    /// The credential requests should use right now.
    pub fn current(&self) -> Result<Credential, PoolEmpty> {
        self.current_slot().map(|(_, credential)| credential)
    }

    /// The current credential together with its position in the pool.
    pub fn current_slot(&self) -> Result<(usize, Credential), PoolEmpty> {
        let index = *self.index.lock();
        self.credentials
            .get(index)
            .map(|credential| (index, credential.clone()))
            .ok_or(PoolEmpty)
    }

    /// Advance to the next credential, wrapping around.
    ///
    /// Returns `false` (and changes nothing) when there is no other
    /// credential to move to.
    pub fn rotate(&self) -> bool {
        let len = self.credentials.len();
        if len < 2 {
            return false;
        }
        let mut index = self.index.lock();
        *index = (*index + 1) % len;
        true
    }

    /// Number of credentials.
    pub fn size(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the pool has no credentials at all.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
