use image::{Rgba, RgbaImage};

const OCEAN: [f32; 3] = [0.05, 0.10, 0.25];
const LAND: [f32; 3] = [0.12, 0.22, 0.15];
const LAND_ALPHA: f32 = 0.7;

// (x, y, width, height) of rough land masses, as fractions of the texture.
const LAND_MASSES: [(f32, f32, f32, f32); 6] = [
    (0.15, 0.15, 0.25, 0.35),
    (0.25, 0.20, 0.12, 0.25),
    (0.10, 0.45, 0.18, 0.35),
    (0.55, 0.18, 0.20, 0.40),
    (0.60, 0.50, 0.10, 0.30),
    (0.82, 0.65, 0.10, 0.10),
];

/// Day/night texture pair for the globe surface.
///
/// Loading the images is the host's business. When the day texture is
/// missing a procedural stand-in is generated; nothing in the orientation or
/// route math looks at textures, so the globe behaves the same either way.
#[derive(Debug)]
pub struct SurfaceTextures {
    day: RgbaImage,
    night: Option<RgbaImage>,
    placeholder: bool,
}

impl SurfaceTextures {
    pub fn new(day: Option<RgbaImage>, night: Option<RgbaImage>) -> Self {
        match day {
            Some(day) => Self {
                day,
                night,
                placeholder: false,
            },
            None => {
                log::warn!("No day texture supplied, using placeholder surface");
                Self::placeholder()
            }
        }
    }

    pub fn placeholder() -> Self {
        Self {
            day: placeholder_texture(256),
            night: None,
            placeholder: true,
        }
    }

    pub fn day(&self) -> &RgbaImage {
        &self.day
    }

    pub fn night(&self) -> Option<&RgbaImage> {
        self.night.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

impl Default for SurfaceTextures {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Equirectangular ocean with a few elliptical continents, `width` x `width / 2`.
pub fn placeholder_texture(width: u32) -> RgbaImage {
    let width = width.max(2);
    let height = width / 2;

    let blended = std::array::from_fn::<f32, 3, _>(|channel| {
        OCEAN[channel] * (1. - LAND_ALPHA) + LAND[channel] * LAND_ALPHA
    });

    let to_pixel = |color: [f32; 3]| {
        Rgba([
            (color[0] * 255.).round() as u8,
            (color[1] * 255.).round() as u8,
            (color[2] * 255.).round() as u8,
            255,
        ])
    };

    let ocean = to_pixel(OCEAN);
    let land = to_pixel(blended);

    RgbaImage::from_fn(width, height, |x, y| {
        let u = (x as f32 + 0.5) / width as f32;
        let v = (y as f32 + 0.5) / height as f32;

        let on_land = LAND_MASSES.iter().any(|&(left, top, w, h)| {
            let dx = (u - (left + w / 2.)) / (w / 2.);
            let dy = (v - (top + h / 2.)) / (h / 2.);
            dx * dx + dy * dy <= 1.
        });

        if on_land {
            land
        } else {
            ocean
        }
    })
}
