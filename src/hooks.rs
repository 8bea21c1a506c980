//! Keyboard hook module
//!
//! Owns this process's keyboard hook registration and routes every hooked
//! key either to the window in the shared target slot or down the hook chain.
//!
//! The registration is per process: each process that maps the DLL has its
//! own copy of the controller, while all of them read the same `TargetSlot`.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use thiserror::Error;

use crate::event::{classify, Action, Forward, KeyEvent};
use crate::shared::{TargetSlot, WindowHandle};

/// Opaque OS hook registration (`HHOOK` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookHandle(NonZeroUsize);

impl HookHandle {
    pub const fn from_raw(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    pub const fn as_raw(self) -> usize {
        self.0.get()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HookError {
    #[error("failed to install keyboard hook (os error {0})")]
    Registration(u32),

    #[error("keyboard hooks are not available on this platform")]
    Unsupported,
}

/// What the OS side of the hook has to provide.
///
/// Implementations are called from the hook callback, so `post` must not
/// block.
pub trait HookBackend {
    fn register(&self) -> Result<HookHandle, HookError>;

    fn unregister(&self, hook: HookHandle);

    /// Queues the message and returns whether the OS accepted it.
    fn post(&self, forward: &Forward) -> bool;
}

/// Backend for hosts without a keyboard hook facility.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl HookBackend for Unsupported {
    fn register(&self) -> Result<HookHandle, HookError> {
        Err(HookError::Unsupported)
    }

    fn unregister(&self, _hook: HookHandle) {}

    fn post(&self, _forward: &Forward) -> bool {
        false
    }
}

/// Outcome of one hook callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Swallow the key: neither the rest of the chain nor the focused window sees it.
    Consume,
    /// Call the next hook and return its result.
    PassThrough,
}

pub struct HookController<'a, B: HookBackend> {
    slot: &'a TargetSlot,
    backend: B,
    hook: AtomicUsize,
}

impl<'a, B: HookBackend> HookController<'a, B> {
    pub const fn new(slot: &'a TargetSlot, backend: B) -> Self {
        Self {
            slot,
            backend,
            hook: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registration(&self) -> Option<HookHandle> {
        HookHandle::from_raw(self.hook.load(Ordering::SeqCst))
    }

    pub fn is_installed(&self) -> bool {
        self.registration().is_some()
    }

    /// Points the shared slot at `target` and makes sure this process has a
    /// hook registered.
    ///
    /// The slot is overwritten on every call, even when registration fails.
    /// A second call while registered reuses the existing hook.
    pub fn install(&self, target: Option<WindowHandle>) -> Result<HookHandle, HookError> {
        self.slot.set(target);

        if let Some(hook) = self.registration() {
            return Ok(hook);
        }

        let hook = self.backend.register().inspect_err(|err| {
            debug!("Keyboard hook not installed: {}", err);
        })?;
        self.hook.store(hook.as_raw(), Ordering::SeqCst);
        debug!(
            "Keyboard hook {:#x} installed, target {:#x}",
            hook.as_raw(),
            target.map_or(0, WindowHandle::as_raw)
        );
        Ok(hook)
    }

    /// Removes this process's hook. The target slot is left as it is.
    ///
    /// Returns whether a hook was registered.
    pub fn uninstall(&self) -> bool {
        match self.release() {
            Some(hook) => {
                debug!("Keyboard hook {:#x} removed", hook.as_raw());
                true
            }
            None => false,
        }
    }

    fn release(&self) -> Option<HookHandle> {
        let hook = HookHandle::from_raw(self.hook.swap(0, Ordering::SeqCst))?;
        self.backend.unregister(hook);
        Some(hook)
    }

    /// Hook callback body. Runs on the input thread of whichever process
    /// received the key: no logging, no blocking.
    ///
    /// Only the shared slot is consulted. In most processes this image never
    /// called `install`, so there is no local registration to release.
    pub fn handle(&self, event: &KeyEvent) -> Decision {
        match classify(event, self.slot.get()) {
            Action::Uninstall => {
                self.release();
                Decision::Consume
            }
            Action::Forward(forward) => {
                // Delivery failures are not observable here and not retried.
                let _ = self.backend.post(&forward);
                Decision::Consume
            }
            Action::PassThrough => Decision::PassThrough,
        }
    }
}

impl<B: HookBackend> Drop for HookController<'_, B> {
    fn drop(&mut self) {
        self.release();
    }
}
