//! Win32 host window for the toggle screen
//!
//! One top-level window owns the [`ToggleScreen`]. Backend callbacks arrive on
//! WinRT threads and only post [`WM_TORCH_NOTIFY`]; all state changes happen
//! on the window thread when that message is pumped.

use std::ffi::c_void;
use std::sync::Arc;
use std::time::Instant;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, DIB_RGB_COLORS, EndPaint, InvalidateRect,
    PAINTSTRUCT, SRCCOPY, StretchDIBits, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::WinRT::{RO_INIT_MULTITHREADED, RoInitialize};
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW,
    DispatchMessageW, GWLP_USERDATA, GetClientRect, GetMessageW, GetWindowLongPtrW, IDC_ARROW,
    KillTimer, LoadCursorW, MSG, PostMessageW, PostQuitMessage, RegisterClassW, SW_SHOW, SetTimer,
    SetWindowLongPtrW, ShowWindow, TranslateMessage, WINDOW_EX_STYLE, WM_APP, WM_DESTROY,
    WM_ERASEBKGND, WM_KILLFOCUS, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_PAINT, WM_SIZE, WM_TIMER,
    WNDCLASSW, WS_OVERLAPPEDWINDOW,
};
use windows::core::w;

use super::WindowError;
use crate::app::{AppError, ToggleScreen, UiWaker};
use crate::config::AppConfig;
use crate::domain::core::{Point, Rect};
use crate::input::{PointerEvent, TapRecognizer};
use crate::platform::TorchBackend;
use crate::platform::lamp::LampTorch;
use crate::ui::renderer::{RendererError, ToggleLayout, ToggleRenderer};

/// Posted by the backend waker; the window thread then pumps the adapter
const WM_TORCH_NOTIFY: u32 = WM_APP + 1;
const ANIMATION_TIMER_ID: usize = 1;
/// Roughly 60 frames per second while a color transition runs
const FRAME_INTERVAL_MS: u32 = 16;

/// State owned by the window through `GWLP_USERDATA`
struct WindowState {
    screen: ToggleScreen,
    renderer: ToggleRenderer,
    tap: TapRecognizer,
    toggle_size: f32,
    client_width: u32,
    client_height: u32,
}

impl WindowState {
    fn layout(&self, now: Instant) -> Result<ToggleLayout, RendererError> {
        ToggleLayout::from_frame(
            &self.screen.frame(now),
            self.client_width,
            self.client_height,
            self.toggle_size,
        )
    }

    fn resize(&mut self, width: u32, height: u32, now: Instant) {
        self.client_width = width;
        self.client_height = height;
        match self.layout(now) {
            Ok(layout) => self.tap.set_region(layout.toggle_rect),
            // Minimized: nothing can be tapped
            Err(_) => self.tap.set_region(Rect::default()),
        }
    }

    fn paint(&self, hwnd: HWND, now: Instant) {
        let mut ps = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(hwnd, &mut ps) };

        let pressed = self.tap.is_pressed();
        let frame = self
            .layout(now)
            .and_then(|layout| self.renderer.render(&layout.with_press(pressed)));
        match frame {
            Ok(pixmap) => {
                let bgra = ToggleRenderer::pixmap_to_bgra(&pixmap);
                let width = pixmap.width() as i32;
                let height = pixmap.height() as i32;

                let mut bitmap_info = BITMAPINFO::default();
                bitmap_info.bmiHeader = BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // top-down
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                };

                unsafe {
                    StretchDIBits(
                        hdc,
                        0,
                        0,
                        width,
                        height,
                        0,
                        0,
                        width,
                        height,
                        Some(bgra.as_ptr() as *const c_void),
                        &bitmap_info,
                        DIB_RGB_COLORS,
                        SRCCOPY,
                    );
                }
            }
            Err(RendererError::InvalidCanvasDimensions { .. }) => {}
            Err(err) => tracing::warn!(error = %err, "frame rendering failed"),
        }

        unsafe {
            let _ = EndPaint(hwnd, &ps);
        }
    }
}

fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16;
    Point::new(x as f32, y as f32)
}

/// Feeds a pointer event to the tap recognizer, repainting when the press
/// ripple appears or disappears; returns true on a completed tap
fn handle_pointer(state: &mut WindowState, hwnd: HWND, event: PointerEvent) -> bool {
    let was_pressed = state.tap.is_pressed();
    let tapped = state.tap.handle(event);
    if state.tap.is_pressed() != was_pressed {
        unsafe {
            let _ = InvalidateRect(hwnd, None, false);
        }
    }
    tapped
}

fn request_frames(hwnd: HWND) {
    unsafe {
        let _ = InvalidateRect(hwnd, None, false);
        SetTimer(hwnd, ANIMATION_TIMER_ID, FRAME_INTERVAL_MS, None);
    }
}

/// Opens the toggle window and runs its message loop until it is closed
pub fn run(config: AppConfig) -> Result<(), AppError> {
    unsafe { RoInitialize(RO_INIT_MULTITHREADED) }
        .map_err(|e| WindowError::RuntimeInitFailed(e.message().to_string()))?;

    if let Err(err) = unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) } {
        tracing::debug!(error = %err, "per-monitor DPI awareness unavailable");
    }

    let backend: Arc<dyn TorchBackend> = Arc::new(LampTorch::open());
    let hwnd = create_main_window(&config)?;

    let waker: UiWaker = Arc::new(move || unsafe {
        let _ = PostMessageW(hwnd, WM_TORCH_NOTIFY, WPARAM(0), LPARAM(0));
    });
    let mut screen = ToggleScreen::create(backend, &config, Some(waker), Instant::now())?;
    screen.observe(move |_| request_frames(hwnd));

    let renderer = ToggleRenderer::with_optional_font(config.caption_font.as_deref());
    if !renderer.has_caption_font() {
        tracing::info!("no caption font, drawing the toggle without a caption");
    }

    let mut state = Box::new(WindowState {
        screen,
        renderer,
        tap: TapRecognizer::new(Rect::default()),
        toggle_size: config.toggle_size as f32,
        client_width: 0,
        client_height: 0,
    });

    let mut client = RECT::default();
    if unsafe { GetClientRect(hwnd, &mut client) }.is_ok() {
        state.resize(
            (client.right - client.left).max(0) as u32,
            (client.bottom - client.top).max(0) as u32,
            Instant::now(),
        );
    }

    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
        ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    tracing::info!("toggle window shown");
    message_loop()
}

fn message_loop() -> Result<(), AppError> {
    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match result.0 {
            0 => return Ok(()),
            -1 => return Err(WindowError::MessageLoopFailed.into()),
            _ => unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }
}

fn create_main_window(config: &AppConfig) -> Result<HWND, WindowError> {
    let class_name = w!("TorchToggleWindow");
    let hinstance =
        unsafe { GetModuleHandleW(None) }.map_err(|_| WindowError::ModuleHandleFailed)?;

    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(window_proc),
        hInstance: hinstance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
        lpszClassName: class_name,
        ..Default::default()
    };
    if unsafe { RegisterClassW(&wc) } == 0 {
        return Err(WindowError::WindowClassRegistrationFailed);
    }

    let mut frame = RECT {
        left: 0,
        top: 0,
        right: config.window_width as i32,
        bottom: config.window_height as i32,
    };
    unsafe {
        let _ = AdjustWindowRect(&mut frame, WS_OVERLAPPEDWINDOW, false);
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("Flashlight"),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            frame.right - frame.left,
            frame.bottom - frame.top,
            None,
            None,
            hinstance,
            None,
        )
    };

    if hwnd.0 == 0 {
        return Err(WindowError::WindowCreationFailed);
    }

    Ok(hwnd)
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let state_ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut WindowState;

    if msg == WM_DESTROY {
        if !state_ptr.is_null() {
            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                // SAFETY: produced by Box::into_raw in `run`; the slot was just cleared
                drop(Box::from_raw(state_ptr));
            }
        }
        unsafe { PostQuitMessage(0) };
        return LRESULT(0);
    }

    if state_ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }
    // SAFETY: only this thread touches the pointer and it lives until WM_DESTROY
    let state = unsafe { &mut *state_ptr };
    let now = Instant::now();

    match msg {
        WM_TORCH_NOTIFY => {
            // Observers request the repaint when the confirmed state moved
            state.screen.pump(now);
            LRESULT(0)
        }
        WM_TIMER if wparam.0 == ANIMATION_TIMER_ID => {
            if !state.screen.is_animating(now) {
                unsafe {
                    let _ = KillTimer(hwnd, ANIMATION_TIMER_ID);
                }
            }
            unsafe {
                let _ = InvalidateRect(hwnd, None, false);
            }
            LRESULT(0)
        }
        WM_LBUTTONDOWN => {
            handle_pointer(state, hwnd, PointerEvent::Down(point_from_lparam(lparam)));
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            if handle_pointer(state, hwnd, PointerEvent::Up(point_from_lparam(lparam))) {
                state.screen.on_tap();
            }
            LRESULT(0)
        }
        WM_KILLFOCUS => {
            handle_pointer(state, hwnd, PointerEvent::Cancel);
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        WM_SIZE => {
            let width = (lparam.0 & 0xFFFF) as u32;
            let height = ((lparam.0 >> 16) & 0xFFFF) as u32;
            state.resize(width, height, now);
            unsafe {
                let _ = InvalidateRect(hwnd, None, false);
            }
            LRESULT(0)
        }
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            state.paint(hwnd, now);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
