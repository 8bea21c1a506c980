//! Cross-process target window slot
//!
//! The hook procedure runs inside every process that receives keyboard input,
//! each with its own copy of this DLL's statics. The one value they all need
//! to agree on, the window that receives forwarded keys, lives in the
//! `.shared` section (marked RWS by `build.rs`) so every mapping of the DLL
//! reads the same word.
//!
//! Reads and writes are single relaxed atomic word operations with no lock.
//! A reader may see a value that is one write behind; that costs at most one
//! misrouted key and is accepted.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Raw window handle value as passed across the C boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(NonZeroUsize);

impl WindowHandle {
    /// Returns `None` for the null handle.
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

/// A single window-handle-sized cell, zero meaning "no target".
#[derive(Debug)]
pub struct TargetSlot {
    window: AtomicUsize,
}

impl TargetSlot {
    pub const fn new() -> Self {
        Self {
            window: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, window: Option<WindowHandle>) {
        self.window
            .store(window.map_or(0, WindowHandle::as_raw), Ordering::Relaxed);
    }

    pub fn get(&self) -> Option<WindowHandle> {
        WindowHandle::from_raw(self.window.load(Ordering::Relaxed))
    }
}

impl Default for TargetSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The slot shared by every process that has this DLL mapped.
#[cfg_attr(windows, link_section = ".shared")]
pub static TARGET: TargetSlot = TargetSlot::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(TargetSlot::new().get(), None);
    }

    #[test]
    fn set_then_get_returns_the_same_window() {
        let slot = TargetSlot::new();
        let window = WindowHandle::from_raw(0x0004_02a6);
        slot.set(window);
        assert_eq!(slot.get(), window);
        assert_eq!(slot.get().map(WindowHandle::as_raw), Some(0x0004_02a6));
    }

    #[test]
    fn later_write_wins() {
        let slot = TargetSlot::new();
        slot.set(WindowHandle::from_raw(1));
        slot.set(WindowHandle::from_raw(2));
        assert_eq!(slot.get(), WindowHandle::from_raw(2));
    }

    #[test]
    fn null_handle_clears_the_slot() {
        let slot = TargetSlot::new();
        slot.set(WindowHandle::from_raw(42));
        slot.set(WindowHandle::from_raw(0));
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn handle_round_trips_full_word() {
        let window = WindowHandle::from_raw(usize::MAX).unwrap();
        assert_eq!(window.as_raw(), usize::MAX);
    }
}
