//! Handle bookkeeping shared by every resource wrapper

use conduit_core::{BridgeError, Ownership, ResourceKind, Result};
use std::fmt;

/// A native handle plus who is responsible for freeing it.
///
/// Releasing empties the slot. Only an owned handle comes back out of
/// `release`, so a borrowed view can never free what it does not own, and a
/// second release has nothing left to hand out.
#[derive(Debug)]
pub(crate) struct HandleSlot<H> {
    handle: Option<H>,
    ownership: Ownership,
    resource: ResourceKind,
}

impl<H: Copy + fmt::Display> HandleSlot<H> {
    pub fn owned(handle: H, resource: ResourceKind) -> Self {
        Self {
            handle: Some(handle),
            ownership: Ownership::Owned,
            resource,
        }
    }

    pub fn borrowed(handle: H, resource: ResourceKind) -> Self {
        Self {
            handle: Some(handle),
            ownership: Ownership::Borrowed,
            resource,
        }
    }

    /// The live handle, or `InvalidHandle` once released.
    pub fn get(&self) -> Result<H> {
        self.handle.ok_or(BridgeError::InvalidHandle {
            resource: self.resource,
        })
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Empty the slot, returning the handle only if the caller must free it.
    pub fn release(&mut self) -> Option<H> {
        let handle = self.handle.take()?;
        match self.ownership {
            Ownership::Owned => {
                tracing::debug!("Releasing {} {}", self.resource, handle);
                Some(handle)
            }
            Ownership::Borrowed => None,
        }
    }
}
