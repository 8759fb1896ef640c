//! Browser environment probes feeding the device fingerprint.
//!
//! Client-side (hydrate): reads `navigator`, `screen`, the `Intl` resolved
//! timezone, and a rendered offscreen canvas. Server-side (SSR): collection
//! reports no probe surface and the resolver falls back accordingly.
//!
//! TRADE-OFFS
//! ==========
//! Individual probes degrade independently: a blocked canvas or missing
//! `screen` yields empty/zero fields rather than aborting collection, so a
//! partially-probed device still fingerprints consistently.

use crate::identity::fingerprint::{DeviceSignals, SignalSource};

/// Probe set backed by `web-sys`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSignals;

impl SignalSource for BrowserSignals {
    fn collect(&self) -> Option<DeviceSignals> {
        #[cfg(feature = "hydrate")]
        {
            collect_browser_signals()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }
}

#[cfg(feature = "hydrate")]
fn collect_browser_signals() -> Option<DeviceSignals> {
    let window = web_sys::window()?;
    let navigator = window.navigator();

    let (screen_width, screen_height, color_depth) = window
        .screen()
        .ok()
        .map(|screen| {
            (
                screen.width().unwrap_or(0),
                screen.height().unwrap_or(0),
                screen.color_depth().unwrap_or(0),
            )
        })
        .unwrap_or((0, 0, 0));

    Some(DeviceSignals {
        user_agent: navigator.user_agent().unwrap_or_default(),
        language: navigator.language().unwrap_or_default(),
        timezone: resolved_timezone().unwrap_or_default(),
        screen_width,
        screen_height,
        color_depth,
        platform: navigator.platform().unwrap_or_default(),
        cookies_enabled: navigator.cookie_enabled(),
        canvas_hash: canvas_pixel_hash().unwrap_or_default(),
    })
}

/// IANA timezone from `Intl.DateTimeFormat().resolvedOptions().timeZone`.
#[cfg(feature = "hydrate")]
fn resolved_timezone() -> Option<String> {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    let options = format.resolved_options();
    js_sys::Reflect::get(&options, &wasm_bindgen::JsValue::from_str("timeZone"))
        .ok()?
        .as_string()
}

/// Render fixed text to an offscreen canvas and hash the encoded pixels.
/// The exact strings and geometry are frozen; changing them re-identifies
/// every device.
#[cfg(feature = "hydrate")]
fn canvas_pixel_hash() -> Option<String> {
    use wasm_bindgen::JsCast;

    const PROBE_TEXT: &str = "stockroom device probe 42";

    let document = web_sys::window()?.document()?;
    let canvas: web_sys::HtmlCanvasElement =
        document.create_element("canvas").ok()?.dyn_into().ok()?;
    canvas.set_width(240);
    canvas.set_height(60);

    let ctx: web_sys::CanvasRenderingContext2d =
        canvas.get_context("2d").ok().flatten()?.dyn_into().ok()?;
    ctx.set_fill_style_str("#f6f2ef");
    ctx.fill_rect(0.0, 0.0, 240.0, 60.0);
    ctx.set_font("16px Arial");
    ctx.set_fill_style_str("#1f1a17");
    ctx.fill_text(PROBE_TEXT, 4.0, 24.0).ok()?;
    ctx.set_fill_style_str("rgba(64, 120, 192, 0.6)");
    ctx.fill_text(PROBE_TEXT, 6.0, 40.0).ok()?;

    let data_url = canvas.to_data_url().ok()?;
    Some(crate::identity::fingerprint::hex_digest(
        data_url.as_bytes(),
    ))
}
