//! Win32 hook backend
//!
//! Registers a `WH_KEYBOARD` hook owned by this DLL, so Windows maps the DLL
//! into every process that receives keyboard input and calls
//! `keyboard_hook_proc` there.

use std::ptr::null_mut;
use windows_sys::Win32::Foundation::{GetLastError, HMODULE, HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::System::LibraryLoader::{
    GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
    GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, PostMessageW, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, WH_KEYBOARD,
};

use crate::event::{Forward, KeyEvent};
use crate::hooks::{Decision, HookBackend, HookController, HookError, HookHandle};
use crate::shared::TARGET;

/// This process's controller. Lives in ordinary (per-process) data.
pub static CONTROLLER: HookController<'static, Win32Hooks> =
    HookController::new(&TARGET, Win32Hooks);

#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Hooks;

impl HookBackend for Win32Hooks {
    fn register(&self) -> Result<HookHandle, HookError> {
        unsafe {
            let module = current_module()?;
            let hook = SetWindowsHookExW(WH_KEYBOARD, Some(keyboard_hook_proc), module, 0);
            HookHandle::from_raw(hook as usize).ok_or_else(last_error)
        }
    }

    fn unregister(&self, hook: HookHandle) {
        unsafe {
            UnhookWindowsHookEx(hook.as_raw() as HHOOK);
        }
    }

    fn post(&self, forward: &Forward) -> bool {
        unsafe {
            PostMessageW(
                forward.target.as_raw() as HWND,
                forward.message,
                forward.vk,
                forward.flags,
            ) != 0
        }
    }
}

fn last_error() -> HookError {
    HookError::Registration(unsafe { GetLastError() })
}

/// Handle of the module containing this code (the DLL, not the host exe).
fn current_module() -> Result<HMODULE, HookError> {
    let mut module: HMODULE = null_mut();
    let found = unsafe {
        GetModuleHandleExW(
            GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
            keyboard_hook_proc as usize as *const u16,
            &mut module,
        )
    };
    if found == 0 {
        return Err(last_error());
    }
    Ok(module)
}

/// Keyboard hook callback
unsafe extern "system" fn keyboard_hook_proc(
    code: i32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match CONTROLLER.handle(&KeyEvent::new(code, wparam, lparam)) {
        Decision::Consume => 1,
        Decision::PassThrough => {
            let hook = CONTROLLER
                .registration()
                .map_or(null_mut(), |hook| hook.as_raw() as HHOOK);
            CallNextHookEx(hook, code, wparam, lparam)
        }
    }
}
