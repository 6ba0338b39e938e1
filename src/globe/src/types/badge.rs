use std::collections::HashMap;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

const RIM: Rgba<u8> = Rgba([255, 255, 255, 230]);

/// Circular backing images for avatar glyphs, rendered once per glyph.
///
/// Only the tinted disc and its rim are drawn here. The glyph itself is
/// rasterised by the host on top of the badge, with whatever emoji font the
/// platform provides.
#[derive(Debug)]
pub struct BadgeCache {
    size: u32,
    badges: HashMap<String, Arc<RgbaImage>>,
    renders: usize,
}

impl BadgeCache {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(4),
            badges: HashMap::new(),
            renders: 0,
        }
    }

    pub fn badge(&mut self, glyph: &str) -> Arc<RgbaImage> {
        if let Some(badge) = self.badges.get(glyph) {
            return Arc::clone(badge);
        }

        log::trace!("Rendering badge for {glyph:?}");
        self.renders += 1;

        let badge = Arc::new(render_badge(glyph, self.size));
        self.badges.insert(glyph.to_owned(), Arc::clone(&badge));
        badge
    }

    /// How many badges were actually drawn.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

/// Backing colour for a glyph, stable across builds and platforms.
fn tint(glyph: &str) -> Rgba<u8> {
    let [r, g, b, ..] = *blake3::hash(glyph.as_bytes()).as_bytes();

    // Keep the backing dark enough for a light glyph on top.
    Rgba([40 + r % 120, 40 + g % 120, 40 + b % 120, 255])
}

fn render_badge(glyph: &str, size: u32) -> RgbaImage {
    let fill = tint(glyph);
    let radius = size as f32 / 2.;
    let rim_width = (size as f32 * 0.06).max(1.);

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance > radius {
            Rgba([0, 0, 0, 0])
        } else if distance > radius - rim_width {
            RIM
        } else {
            fill
        }
    })
}
