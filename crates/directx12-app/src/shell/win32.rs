use tracing::info;
use tracing::trace;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::GetStockObject;
use windows::Win32::Graphics::Gdi::GRAY_BRUSH;
use windows::Win32::Graphics::Gdi::HBRUSH;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::*;

use super::MessagePump;
use super::PumpStatus;
use crate::app_error::AppResult;

pub const WINDOW_TITLE: PCWSTR = w!("DirectX12-App");
pub const CLIENT_WIDTH: i32 = 800;
pub const CLIENT_HEIGHT: i32 = 600;
const WINDOW_CLASS: PCWSTR = w!("DX12App");

// Every message goes to the default handler.
extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    unsafe { DefWindowProcW(window, message, wparam, lparam) }
}

/// Registers the window class and opens a shown, overlapped window whose
/// client area is exactly 800x600.
pub fn create_window() -> AppResult<HWND> {
    let instance = unsafe { GetModuleHandleW(None)? };

    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        hbrBackground: HBRUSH(unsafe { GetStockObject(GRAY_BRUSH) }.0),
        lpszClassName: WINDOW_CLASS,
        ..Default::default()
    };
    let atom = unsafe { RegisterClassExW(&wc) };
    if atom == 0 {
        return Err(Error::from_win32().into());
    }

    // Grow the outer rectangle so the client area ends up at the requested size.
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: CLIENT_WIDTH,
        bottom: CLIENT_HEIGHT,
    };
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            WINDOW_CLASS,
            WINDOW_TITLE,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,
            None,
            Some(instance.into()),
            None,
        )
    }?;

    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
        let _ = UpdateWindow(hwnd);
    }
    info!(
        width = CLIENT_WIDTH,
        height = CLIENT_HEIGHT,
        "Created window"
    );
    Ok(hwnd)
}

/// Drains the messages queued for one window. It never asks the loop to
/// exit.
pub struct Win32Pump {
    hwnd: HWND,
}

impl Win32Pump {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }
}

impl MessagePump for Win32Pump {
    fn pump(&mut self) -> AppResult<PumpStatus> {
        let mut message = MSG::default();
        let mut drained = 0u32;
        while unsafe { PeekMessageW(&mut message, Some(self.hwnd), 0, 0, PM_REMOVE) }.into() {
            unsafe {
                let _ = TranslateMessage(&message);
                DispatchMessageW(&message);
            }
            drained += 1;
        }
        if drained > 0 {
            trace!(drained, "Dispatched window messages");
        }
        Ok(PumpStatus::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_procedure_only_forwards() {
        let hwnd = create_window().unwrap();
        let forwarded = wndproc(hwnd, WM_NULL, WPARAM(0), LPARAM(0));
        let default = unsafe { DefWindowProcW(hwnd, WM_NULL, WPARAM(0), LPARAM(0)) };
        assert_eq!(forwarded, default);
        // Close is not intercepted; the default handler destroys the window.
        assert_eq!(wndproc(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)), LRESULT(0));
    }
}
