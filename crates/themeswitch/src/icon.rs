//! Tray icons, drawn at startup and cached.
//!
//! The sun is a disc with eight rays, the moon a crescent cut from a disc by
//! a second, offset disc. Both are drawn on a transparent 32×32 canvas.

use std::sync::OnceLock;

use image::{Rgba, RgbaImage};
use themeswitch_lib::ui::IconVariant;

/// Windows tray icons range from 16 px (100 % DPI) to 32 px (200 % DPI).
pub const ICON_SIZE: u32 = 32;

const SUN_COLOR: Rgba<u8> = Rgba([0xFF, 0xC1, 0x07, 0xFF]);
const MOON_COLOR: Rgba<u8> = Rgba([0xE3, 0xE8, 0xF2, 0xFF]);

const SUN_CORE_RADIUS: f32 = 7.5;
const SUN_RAY_INNER: f32 = 10.0;
const SUN_RAY_OUTER: f32 = 15.0;
const SUN_RAY_HALF_WIDTH: f32 = 1.5;
const SUN_RAYS: usize = 8;

const MOON_RADIUS: f32 = 12.5;
const MOON_CUT_RADIUS: f32 = 10.5;
/// Offset of the cutting disc's center from the canvas center.
const MOON_CUT_OFFSET: (f32, f32) = (6.0, -5.0);

/// Decoded RGBA pixel data cached for cheap cloning into a tray icon.
pub struct CachedIcon {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CachedIcon {
    fn from_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            rgba: img.into_raw(),
            width,
            height,
        }
    }
}

/// Offset of pixel `(x, y)`'s center from the canvas center.
fn from_center(x: u32, y: u32) -> (f32, f32) {
    let c = ICON_SIZE as f32 / 2.0;
    (x as f32 + 0.5 - c, y as f32 + 0.5 - c)
}

fn on_sun(dx: f32, dy: f32) -> bool {
    let r = dx.hypot(dy);
    if r <= SUN_CORE_RADIUS {
        return true;
    }
    if !(SUN_RAY_INNER..=SUN_RAY_OUTER).contains(&r) {
        return false;
    }
    // Distance from the nearest ray's center line, measured along the arc
    let step = std::f32::consts::TAU / SUN_RAYS as f32;
    let angle = dy.atan2(dx);
    let off = angle - (angle / step).round() * step;
    (off * r).abs() <= SUN_RAY_HALF_WIDTH
}

fn on_moon(dx: f32, dy: f32) -> bool {
    let (cx, cy) = MOON_CUT_OFFSET;
    dx.hypot(dy) <= MOON_RADIUS && (dx - cx).hypot(dy - cy) > MOON_CUT_RADIUS
}

fn draw(color: Rgba<u8>, inside: impl Fn(f32, f32) -> bool) -> RgbaImage {
    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (dx, dy) = from_center(x, y);
        if inside(dx, dy) {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

pub fn draw_sun() -> RgbaImage {
    draw(SUN_COLOR, on_sun)
}

pub fn draw_moon() -> RgbaImage {
    draw(MOON_COLOR, on_moon)
}

/// Cached pixels for `variant`, drawn on first use.
pub fn pixels(variant: IconVariant) -> &'static CachedIcon {
    static SUN: OnceLock<CachedIcon> = OnceLock::new();
    static MOON: OnceLock<CachedIcon> = OnceLock::new();
    match variant {
        IconVariant::Sun => SUN.get_or_init(|| CachedIcon::from_image(draw_sun())),
        IconVariant::Moon => MOON.get_or_init(|| CachedIcon::from_image(draw_moon())),
    }
}
