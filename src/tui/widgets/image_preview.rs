//! Half-block image rendering.
//!
//! Each terminal cell shows two vertical pixels: `▀` with the top pixel as
//! foreground and the bottom pixel as background.

use std::cell::RefCell;

use image::{imageops::FilterType, DynamicImage, RgbaImage};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Longest side kept after decoding. Terminals never show more pixels.
const MAX_SIDE: u32 = 512;

type CachedLines = ((u16, u16), Vec<Line<'static>>);

/// A decoded image ready to be drawn into a cell area.
///
/// Decoding is CPU-bound; callers run it off the event loop. The scaled
/// lines for the last cell area are cached so redraws do not rescale.
#[derive(Debug)]
pub struct ImagePreview {
    image: DynamicImage,
    /// Size of the source image before downsampling.
    original: (u32, u32),
    cache: RefCell<Option<CachedLines>>,
}

impl ImagePreview {
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let image = image::load_from_memory(bytes)?;
        let original = (image.width(), image.height());
        let image = if original.0 > MAX_SIDE || original.1 > MAX_SIDE {
            image.thumbnail(MAX_SIDE, MAX_SIDE)
        } else {
            image
        };
        Ok(Self {
            image,
            original,
            cache: RefCell::new(None),
        })
    }

    /// Width and height of the source image.
    pub fn dimensions(&self) -> (u32, u32) {
        self.original
    }

    /// Lines fitting `cols × rows` cells, aspect ratio preserved.
    pub fn lines(&self, cols: u16, rows: u16) -> Vec<Line<'static>> {
        if cols == 0 || rows == 0 {
            return Vec::new();
        }
        if let Some((area, lines)) = self.cache.borrow().as_ref() {
            if *area == (cols, rows) {
                return lines.clone();
            }
        }
        let scaled = self
            .image
            .resize(u32::from(cols), u32::from(rows) * 2, FilterType::Triangle)
            .to_rgba8();
        let lines = halfblock_lines(&scaled);
        *self.cache.borrow_mut() = Some(((cols, rows), lines.clone()));
        lines
    }

    fn cached_area(&self) -> Option<(u16, u16)> {
        self.cache.borrow().as_ref().map(|(area, _)| *area)
    }
}

fn rgb(image: &RgbaImage, x: u32, y: u32) -> Color {
    let [r, g, b, a] = image.get_pixel(x, y).0;
    // Blend transparency over black.
    let scale = |c: u8| ((u16::from(c) * u16::from(a)) / 255) as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

/// One line per pixel-row pair. An odd last row gets a black bottom half.
pub fn halfblock_lines(image: &RgbaImage) -> Vec<Line<'static>> {
    let (w, h) = image.dimensions();
    (0..h)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..w)
                .map(|x| {
                    let top = rgb(image, x, y);
                    let bottom = if y + 1 < h {
                        rgb(image, x, y + 1)
                    } else {
                        Color::Rgb(0, 0, 0)
                    };
                    Span::styled("▀", Style::default().fg(top).bg(bottom))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_halfblock_pairs_rows() {
        let mut img = RgbaImage::new(2, 3);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let lines = halfblock_lines(&img);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(lines[0].spans[0].style.bg, Some(Color::Rgb(0, 0, 255)));
        assert_eq!(lines[1].spans[0].style.bg, Some(Color::Rgb(0, 0, 0)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ImagePreview::decode(b"definitely not an image").is_err());
    }

    #[test]
    fn test_decode_png_and_fit() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255])));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let preview = ImagePreview::decode(&png).unwrap();
        assert_eq!(preview.dimensions(), (40, 20));
        let lines = preview.lines(10, 10);
        assert!(lines.len() <= 10);
        assert!(lines.iter().all(|l| l.spans.len() <= 10));
        assert!(preview.lines(0, 10).is_empty());
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255])));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    #[test]
    fn test_large_image_is_downsampled_but_reports_source_size() {
        let preview = ImagePreview::decode(&png(2000, 1000)).unwrap();
        assert_eq!(preview.dimensions(), (2000, 1000));
        assert!(preview.image.width() <= MAX_SIDE);
        assert!(preview.image.height() <= MAX_SIDE);
    }

    #[test]
    fn test_lines_are_cached_per_area() {
        let preview = ImagePreview::decode(&png(64, 32)).unwrap();
        assert_eq!(preview.cached_area(), None);

        let first = preview.lines(20, 10);
        assert_eq!(preview.cached_area(), Some((20, 10)));
        assert_eq!(preview.lines(20, 10), first);

        preview.lines(8, 4);
        assert_eq!(preview.cached_area(), Some((8, 4)));
    }
}
