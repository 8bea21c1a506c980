//! Emoji Key Hooker
//!
//! A DLL that redirects keyboard input to one window. The controller (the
//! emoji picker) calls `install_hook_dll` with its window handle; from then
//! on every key pressed anywhere on the desktop is posted to that window as
//! `WM_KEYDOWN`/`WM_KEYUP` instead of reaching the focused application.
//! Escape, or `uninstall_hook_dll`, removes the hook again.

pub mod event;
pub mod hooks;
pub mod shared;
#[cfg(windows)]
mod win32;

use shared::{WindowHandle, TARGET};

#[cfg(windows)]
use win32::CONTROLLER;

#[cfg(not(windows))]
static CONTROLLER: hooks::HookController<'static, hooks::Unsupported> =
    hooks::HookController::new(&TARGET, hooks::Unsupported);

/// Returned by `test_dll` once the DLL is loaded.
pub const SELF_TEST_OK: i32 = 1;

pub fn self_test() -> i32 {
    SELF_TEST_OK
}

/// Sets the shared target window and makes sure this process has a keyboard
/// hook. Returns whether a hook is active afterwards.
pub fn install(window: usize) -> bool {
    CONTROLLER.install(WindowHandle::from_raw(window)).is_ok()
}

/// Removes this process's keyboard hook, if any. The target window stays set.
pub fn uninstall() {
    CONTROLLER.uninstall();
}

#[cfg(test)]
fn is_installed() -> bool {
    CONTROLLER.is_installed()
}

#[cfg(test)]
fn target() -> Option<WindowHandle> {
    TARGET.get()
}

#[no_mangle]
pub extern "C" fn test_dll() -> i32 {
    self_test()
}

#[no_mangle]
pub extern "C" fn install_hook_dll(window: usize) -> i32 {
    install(window) as i32
}

#[no_mangle]
pub extern "C" fn uninstall_hook_dll() {
    uninstall();
}
