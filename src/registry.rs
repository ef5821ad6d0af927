// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exclusive ownership of the active client.
//!
//! There is at most one client per platform, and every call it makes
//! mutates its arena in place. The [`Registry`] holds that client behind a
//! single lock: registering installs it, [`acquire`](Registry::acquire)
//! hands out exclusive access for the duration of one operation, and
//! unregistering waits for the operation in flight before removing it.

use crate::{Errno, Result, Status};
use core::fmt::{self, Debug, Display, Formatter};
use core::ops::{Deref, DerefMut};
use spin::{Mutex, MutexGuard};

/// Slot holding the active client, if any.
///
/// ```
/// use uefisecapp::{Registry, Status};
///
/// static REGISTRY: Registry<u32> = Registry::new();
///
/// assert_eq!(REGISTRY.acquire().unwrap_err().status(), Status::NOT_READY);
/// REGISTRY.register(7).unwrap();
/// assert_eq!(*REGISTRY.acquire().unwrap(), 7);
/// assert_eq!(REGISTRY.unregister(), Some(7));
/// ```
pub struct Registry<C> {
    client: Mutex<Option<C>>,
}

impl<C> Registry<C> {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    /// Install `client` as the active client.
    ///
    /// # Errors
    ///
    /// Fails if a client is already registered, handing `client` back.
    pub fn register(&self, client: C) -> core::result::Result<(), AlreadyRegistered<C>> {
        let mut slot = self.client.lock();
        if slot.is_some() {
            return Err(AlreadyRegistered(client));
        }
        *slot = Some(client);
        Ok(())
    }

    /// Remove the active client and return it.
    ///
    /// Waits for any operation holding the client to finish first. Does
    /// nothing if no client is registered.
    pub fn unregister(&self) -> Option<C> {
        self.client.lock().take()
    }

    /// Returns true if a client is registered.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.client.lock().is_some()
    }

    /// Get exclusive access to the active client.
    ///
    /// Blocks while another caller holds it. Access ends when the guard is
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`Status::NOT_READY`] if no client is registered.
    pub fn acquire(&self) -> Result<ClientGuard<'_, C>> {
        let guard = self.client.lock();
        if guard.is_none() {
            return Err(Status::NOT_READY.into());
        }
        Ok(ClientGuard { guard })
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for Registry<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Exclusive access to the active client of a [`Registry`].
pub struct ClientGuard<'a, C> {
    guard: MutexGuard<'a, Option<C>>,
}

impl<C> Deref for ClientGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        match self.guard.as_ref() {
            Some(client) => client,
            None => unreachable!("client guard without a client"),
        }
    }
}

impl<C> DerefMut for ClientGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        match self.guard.as_mut() {
            Some(client) => client,
            None => unreachable!("client guard without a client"),
        }
    }
}

impl<C: Debug> Debug for ClientGuard<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientGuard").field(&**self).finish()
    }
}

/// A client was already registered. Holds the client that was rejected.
#[derive(PartialEq, Eq)]
pub struct AlreadyRegistered<C>(pub C);

impl<C> AlreadyRegistered<C> {
    /// Take back the rejected client.
    pub fn into_inner(self) -> C {
        self.0
    }

    /// Generic error number for this condition.
    #[must_use]
    pub const fn errno(&self) -> Errno {
        Errno::EEXIST
    }
}

impl<C> Debug for AlreadyRegistered<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("AlreadyRegistered(..)")
    }
}

impl<C> Display for AlreadyRegistered<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a client is already registered")
    }
}

impl<C> core::error::Error for AlreadyRegistered<C> {}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};
    use core::time::Duration;
    use std::string::String;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_is_exclusive() {
        let registry = Registry::new();
        assert!(!registry.is_registered());

        registry.register(1).unwrap();
        let err = registry.register(2).unwrap_err();
        assert_eq!(err.errno(), Errno::EEXIST);
        assert_eq!(err.into_inner(), 2);
        assert_eq!(*registry.acquire().unwrap(), 1);
    }

    #[test]
    fn test_acquire_without_client() {
        let registry = Registry::<u8>::new();
        assert_eq!(
            registry.acquire().unwrap_err().status(),
            Status::NOT_READY
        );
        assert_eq!(registry.unregister(), None);
        assert_eq!(registry.unregister(), None);
    }

    #[test]
    fn test_unregister_returns_client() {
        let registry = Registry::new();
        registry.register(String::from("client")).unwrap();
        {
            let mut client = registry.acquire().unwrap();
            client.push('!');
        }
        assert_eq!(registry.unregister().as_deref(), Some("client!"));
        assert!(!registry.is_registered());

        registry.register(String::from("again")).unwrap();
        assert!(registry.is_registered());
    }

    #[test]
    fn test_acquire_blocks_while_held() {
        let registry = Arc::new(Registry::new());
        registry.register(0u32).unwrap();
        let released = Arc::new(AtomicBool::new(false));

        let mut guard = registry.acquire().unwrap();
        let waiter = {
            let registry = Arc::clone(&registry);
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let client = registry.acquire().unwrap();
                assert!(released.load(Ordering::SeqCst));
                *client
            })
        };

        thread::sleep(Duration::from_millis(50));
        *guard = 5;
        released.store(true, Ordering::SeqCst);
        drop(guard);

        assert_eq!(waiter.join().unwrap(), 5);
    }

    #[test]
    fn test_unregister_waits_for_holder() {
        let registry = Arc::new(Registry::new());
        registry.register(1u32).unwrap();
        let released = Arc::new(AtomicBool::new(false));

        let guard = registry.acquire().unwrap();
        let remover = {
            let registry = Arc::clone(&registry);
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let client = registry.unregister();
                assert!(released.load(Ordering::SeqCst));
                client
            })
        };

        thread::sleep(Duration::from_millis(50));
        released.store(true, Ordering::SeqCst);
        drop(guard);

        assert_eq!(remover.join().unwrap(), Some(1));
        assert_eq!(
            registry.acquire().unwrap_err().status(),
            Status::NOT_READY
        );
    }
}
