//! Device-level tunables, read the way `autograph-render-gl`'s window/backend
//! constructors take a `&config::Config` rather than hard-coded constants.
//!
//! Scene-level cvars (lightmap display, polygon-offset tuning, curve
//! subdivision tolerance, lighting scale) belong to the renderer layered on
//! top of this crate and have no representation here.

use config::Config;

#[derive(Copy, Clone, Debug)]
pub struct DeviceConfig {
    pub debug_context: bool,
    pub vsync: bool,
    pub initial_width: u32,
    pub initial_height: u32,
}

impl Default for DeviceConfig {
    fn default() -> DeviceConfig {
        DeviceConfig {
            debug_context: cfg!(debug_assertions),
            vsync: true,
            initial_width: 1280,
            initial_height: 720,
        }
    }
}

impl DeviceConfig {
    /// Overlays values found under the `rhi.*` keys of `cfg` onto the
    /// defaults; a `Config` with none of these keys set yields plain
    /// defaults, matching the teacher's "config file is optional" posture.
    pub fn from_config(cfg: &Config) -> DeviceConfig {
        let mut out = DeviceConfig::default();
        if let Ok(v) = cfg.get_bool("rhi.debug_context") {
            out.debug_context = v;
        }
        if let Ok(v) = cfg.get_bool("rhi.vsync") {
            out.vsync = v;
        }
        if let Ok(v) = cfg.get_int("rhi.initial_width") {
            out.initial_width = v.max(1) as u32;
        }
        if let Ok(v) = cfg.get_int("rhi.initial_height") {
            out.initial_height = v.max(1) as u32;
        }
        out
    }
}
