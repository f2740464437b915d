use crate::draw::composite::RgbaBuffer;
use crate::error::SurfaceError;
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Tight axis-aligned box around every pixel with non-zero alpha, inclusive
/// on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Position of a result overlay in surface-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl InkBounds {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    pub fn centroid(&self) -> Anchor {
        Anchor {
            x: (self.min_x + self.max_x) as f32 / 2.0,
            y: (self.min_y + self.max_y) as f32 / 2.0,
        }
    }
}

/// Scans the whole buffer. Semi-transparent pixels count as ink. Returns
/// `None` when nothing is drawn.
pub fn scan_opaque_bounds(buffer: &RgbaBuffer) -> Option<InkBounds> {
    let width = buffer.width as usize;
    if width == 0 {
        return None;
    }
    let mut bounds: Option<InkBounds> = None;
    for (i, px) in buffer.pixels.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        bounds = Some(match bounds {
            None => InkBounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
            Some(b) => InkBounds {
                min_x: b.min_x.min(x),
                min_y: b.min_y.min(y),
                max_x: b.max_x.max(x),
                max_y: b.max_y.max(y),
            },
        });
    }
    bounds
}

pub fn encode_png(buffer: &RgbaBuffer) -> Result<Vec<u8>, SurfaceError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ColorType::Rgba8)
        .map_err(|e| SurfaceError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// PNG snapshot as a `data:` URI, the form the evaluation service expects.
pub fn encode_png_data_uri(buffer: &RgbaBuffer) -> Result<String, SurfaceError> {
    let png = encode_png(buffer)?;
    Ok(format!(
        "{PNG_DATA_URI_PREFIX}{}",
        general_purpose::STANDARD.encode(png)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::composite::CompositeMode;
    use crate::draw::model::Color;

    #[test]
    fn empty_buffer_has_no_bounds() {
        assert_eq!(scan_opaque_bounds(&RgbaBuffer::transparent(16, 8)), None);
    }

    #[test]
    fn faint_pixels_still_count_as_ink() {
        let mut buffer = RgbaBuffer::transparent(10, 10);
        buffer.composite_pixel(3, 7, CompositeMode::SourceOver(Color::rgba(0, 0, 0, 1)));
        assert_eq!(
            scan_opaque_bounds(&buffer),
            Some(InkBounds {
                min_x: 3,
                min_y: 7,
                max_x: 3,
                max_y: 7
            })
        );
    }

    #[test]
    fn bounds_cover_scattered_ink_and_centroid_is_midpoint() {
        let mut buffer = RgbaBuffer::transparent(100, 100);
        buffer.composite_pixel(10, 40, CompositeMode::SourceOver(Color::RED));
        buffer.composite_pixel(30, 20, CompositeMode::SourceOver(Color::RED));
        buffer.composite_pixel(21, 81, CompositeMode::SourceOver(Color::RED));

        let bounds = scan_opaque_bounds(&buffer).expect("ink present");
        assert_eq!(
            bounds,
            InkBounds {
                min_x: 10,
                min_y: 20,
                max_x: 30,
                max_y: 81
            }
        );
        assert_eq!(bounds.centroid(), Anchor { x: 20.0, y: 50.5 });
    }

    #[test]
    fn data_uri_decodes_back_to_png() {
        let mut buffer = RgbaBuffer::transparent(4, 3);
        buffer.composite_pixel(1, 1, CompositeMode::SourceOver(Color::RED));
        let uri = encode_png_data_uri(&buffer).expect("encode");
        let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).expect("prefix");
        let bytes = general_purpose::STANDARD.decode(payload).expect("base64");

        let decoded = image::load_from_memory(&bytes).expect("png").to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }
}
