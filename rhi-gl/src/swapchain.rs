//! `GlSwapchain`: wraps the platform GL context for one native window.
//!
//! The backend never creates its own window — callers own the window (and the
//! event loop) and hand this crate a `RawWindowHandle`, matching spec.md §4.5's
//! "one swapchain per native window" framing and keeping `rhi-gl` windowing-
//! toolkit-agnostic the way the teacher's `render-gl` keeps GL concerns out of
//! its own `window.rs`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glutin::{ContextBuilder, ContextWrapper, GlProfile, GlRequest, PossiblyCurrent};
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};

use crate::api::Gl;
use crate::backend::GlDevice;
use crate::config::DeviceConfig;
use rhi::Swapchain;

thread_local! {
    /// spec.md §4.5: the GL debug callback is registered once, the first time
    /// any swapchain is created on this thread, never again.
    static DEBUG_CALLBACK_REGISTERED: Cell<bool> = Cell::new(false);

    /// Native window handles a swapchain has already been created for.
    /// spec.md §4.5: creating a second swapchain for the same handle is
    /// forbidden and must yield the null handle rather than a second,
    /// silently-conflicting context.
    static SWAPCHAIN_WINDOWS: RefCell<Vec<RawWindowHandle>> = RefCell::new(Vec::new());
}

fn window_already_has_swapchain(handle: RawWindowHandle) -> bool {
    SWAPCHAIN_WINDOWS.with(|windows| windows.borrow().contains(&handle))
}

fn register_swapchain_window(handle: RawWindowHandle) {
    SWAPCHAIN_WINDOWS.with(|windows| windows.borrow_mut().push(handle));
}

#[derive(Debug)]
pub struct GlSwapchain {
    context: ContextWrapper<PossiblyCurrent, ()>,
    window_handle: RawWindowHandle,
    width: u32,
    height: u32,
}

impl Drop for GlSwapchain {
    fn drop(&mut self) {
        SWAPCHAIN_WINDOWS.with(|windows| windows.borrow_mut().retain(|h| *h != self.window_handle));
    }
}

impl GlSwapchain {
    /// Creates a context for `window`, makes it current on the calling thread,
    /// and loads the GL 4.5 core function pointers. `window` must outlive the
    /// returned swapchain and must not already have a swapchain created for it
    /// (spec.md §4.5: duplicate creation is a validation failure, reported here
    /// by returning `None` rather than a silently-broken second context).
    pub fn new(window: &impl HasRawWindowHandle, config: &DeviceConfig) -> Option<(GlSwapchain, GlDevice)> {
        let raw_handle = window.raw_window_handle();
        if window_already_has_swapchain(raw_handle) {
            log::error!("create_swapchain: a swapchain already exists for this native window handle");
            return None;
        }
        let (width, height) = (config.initial_width, config.initial_height);

        let context = unsafe {
            ContextBuilder::new()
                .with_gl_profile(GlProfile::Core)
                .with_gl_debug_flag(config.debug_context)
                .with_vsync(config.vsync)
                .with_gl(GlRequest::Specific(glutin::Api::OpenGl, (4, 5)))
                .build_raw_context(raw_handle)
        };
        let context = match context {
            Ok(ctx) => ctx,
            Err(err) => {
                log::error!("create_swapchain: failed to create GL context: {}", err);
                return None;
            }
        };
        let context = match unsafe { context.make_current() } {
            Ok(ctx) => ctx,
            Err((_, err)) => {
                log::error!("create_swapchain: failed to make GL context current: {}", err);
                return None;
            }
        };

        let gl = Rc::new(Gl::load_with(|symbol| context.get_proc_address(symbol) as *const _));
        if config.debug_context {
            register_debug_callback_once(&gl);
        }

        register_swapchain_window(raw_handle);
        let swapchain = GlSwapchain {
            context,
            window_handle: raw_handle,
            width,
            height,
        };
        let device = GlDevice::new(gl);
        Some((swapchain, device))
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.context.resize(glutin::dpi::PhysicalSize::new(width, height));
    }
}

impl Swapchain for GlSwapchain {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn present(&mut self) {
        if let Err(err) = self.context.swap_buffers() {
            log::error!("present: swap_buffers failed: {}", err);
        }
    }
}

fn register_debug_callback_once(gl: &Gl) {
    DEBUG_CALLBACK_REGISTERED.with(|registered| {
        if registered.get() {
            return;
        }
        registered.set(true);
        unsafe {
            gl.Enable(crate::api::DEBUG_OUTPUT);
            gl.Enable(crate::api::DEBUG_OUTPUT_SYNCHRONOUS);
            gl.DebugMessageCallback(Some(gl_debug_callback), std::ptr::null());
        }
    });
}

extern "system" fn gl_debug_callback(
    source: crate::api::types::GLenum,
    gl_type: crate::api::types::GLenum,
    id: crate::api::types::GLuint,
    severity: crate::api::types::GLenum,
    length: crate::api::types::GLsizei,
    message: *const crate::api::types::GLchar,
    _user_param: *mut std::ffi::c_void,
) {
    use crate::api as gl;

    // NOTIFICATION-severity spam (buffer/texture usage hints, etc.) dwarfs
    // anything actionable; everything else is worth a log line.
    if severity == gl::DEBUG_SEVERITY_NOTIFICATION {
        return;
    }

    let text = unsafe {
        let slice = std::slice::from_raw_parts(message as *const u8, length as usize);
        String::from_utf8_lossy(slice).into_owned()
    };

    let level = match severity {
        gl::DEBUG_SEVERITY_HIGH => log::Level::Error,
        gl::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        _ => log::Level::Info,
    };
    log::log!(
        level,
        "GL debug [source={:#x} type={:#x} id={}]: {}",
        source,
        gl_type,
        id,
        text
    );
}
