//! Keyboard event model
//!
//! Decides what to do with one `WH_KEYBOARD` callback without touching the
//! OS, so the decision tree can be tested on any host.

use crate::shared::WindowHandle;

pub const VK_ESCAPE: usize = 0x1B;

pub const WM_KEYDOWN: u32 = 0x0100;
pub const WM_KEYUP: u32 = 0x0101;

/// `KF_UP` shifted into the high word of the keystroke flags (bit 31,
/// the transition state).
pub const KF_UP_MASK: u32 = 0x8000 << 16;

/// Arguments of one keyboard hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Hook code; negative values are chain management and must be passed on.
    pub code: i32,
    /// Virtual key code (`wParam`).
    pub vk: usize,
    /// Repeat count, scan code and transition flags (`lParam`).
    pub flags: isize,
}

impl KeyEvent {
    pub const fn new(code: i32, vk: usize, flags: isize) -> Self {
        Self { code, vk, flags }
    }

    pub fn transition(&self) -> Transition {
        if self.flags as u32 & KF_UP_MASK == KF_UP_MASK {
            Transition::Up
        } else {
            Transition::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Down,
    Up,
}

impl Transition {
    pub const fn message(self) -> u32 {
        match self {
            Transition::Down => WM_KEYDOWN,
            Transition::Up => WM_KEYUP,
        }
    }
}

/// A synthetic key message to post to the target window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forward {
    pub target: WindowHandle,
    pub message: u32,
    pub vk: usize,
    pub flags: isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Escape was pressed: drop this process's hook and swallow the key.
    Uninstall,
    /// Post the key to the target window and swallow it.
    Forward(Forward),
    /// Hand the event to the next hook unchanged.
    PassThrough,
}

pub fn classify(event: &KeyEvent, target: Option<WindowHandle>) -> Action {
    if event.code < 0 {
        return Action::PassThrough;
    }

    if event.vk == VK_ESCAPE {
        return Action::Uninstall;
    }

    match target {
        Some(target) => Action::Forward(Forward {
            target,
            message: event.transition().message(),
            vk: event.vk,
            flags: event.flags,
        }),
        None => Action::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VK_A: usize = 0x41;
    // Repeat count 1, scan code 0x1E.
    const DOWN_FLAGS: isize = 0x001E_0001;
    const UP_FLAGS: isize = 0xC01E_0001_u32 as i32 as isize;

    fn window(raw: usize) -> Option<WindowHandle> {
        WindowHandle::from_raw(raw)
    }

    #[test]
    fn transition_follows_bit_31() {
        assert_eq!(KeyEvent::new(0, VK_A, DOWN_FLAGS).transition(), Transition::Down);
        assert_eq!(KeyEvent::new(0, VK_A, UP_FLAGS).transition(), Transition::Up);
        // Previous-state bit alone (auto-repeat) is still a key down.
        assert_eq!(
            KeyEvent::new(0, VK_A, 0x401E_0001).transition(),
            Transition::Down
        );
    }

    #[test]
    fn key_down_is_forwarded_as_wm_keydown() {
        let action = classify(&KeyEvent::new(0, VK_A, DOWN_FLAGS), window(0x10));
        assert_eq!(
            action,
            Action::Forward(Forward {
                target: window(0x10).unwrap(),
                message: WM_KEYDOWN,
                vk: VK_A,
                flags: DOWN_FLAGS,
            })
        );
    }

    #[test]
    fn key_up_is_forwarded_as_wm_keyup() {
        match classify(&KeyEvent::new(0, VK_A, UP_FLAGS), window(0x10)) {
            Action::Forward(forward) => {
                assert_eq!(forward.message, WM_KEYUP);
                assert_eq!(forward.vk, VK_A);
                assert_eq!(forward.flags, UP_FLAGS);
            }
            other => panic!("expected a forward, got {other:?}"),
        }
    }

    #[test]
    fn escape_uninstalls_with_or_without_target() {
        let escape = KeyEvent::new(0, VK_ESCAPE, DOWN_FLAGS);
        assert_eq!(classify(&escape, None), Action::Uninstall);
        assert_eq!(classify(&escape, window(0x10)), Action::Uninstall);
    }

    #[test]
    fn empty_slot_passes_through() {
        assert_eq!(
            classify(&KeyEvent::new(0, VK_A, DOWN_FLAGS), None),
            Action::PassThrough
        );
    }

    #[test]
    fn negative_code_is_never_inspected() {
        assert_eq!(
            classify(&KeyEvent::new(-1, VK_ESCAPE, DOWN_FLAGS), window(0x10)),
            Action::PassThrough
        );
        assert_eq!(
            classify(&KeyEvent::new(-1, VK_A, DOWN_FLAGS), window(0x10)),
            Action::PassThrough
        );
    }

    #[test]
    fn no_remove_code_is_processed() {
        // HC_NOREMOVE (3) is still real key data.
        assert!(matches!(
            classify(&KeyEvent::new(3, VK_A, DOWN_FLAGS), window(0x10)),
            Action::Forward(_)
        ));
    }
}
