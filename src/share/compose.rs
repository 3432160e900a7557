//! Rasterizes the on-screen card (picture + caption) into one bitmap

use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};

use super::text::TextRasterizer;
use crate::error::ComposeError;

/// The picture region as laid out on screen
#[derive(Debug, Clone, Copy)]
pub struct ImageSurface<'a> {
    pub width: u32,
    pub height: u32,
    /// Painted under the picture (and alone if nothing is displayed)
    pub background: Rgba<u8>,
    /// The displayed picture, drawn scaled to cover the surface
    pub content: Option<&'a RgbaImage>,
}

/// The caption region, positioned relative to the image surface
#[derive(Debug, Clone, Copy)]
pub struct CaptionSurface<'a> {
    pub text: &'a str,
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    pub font_px: f32,
    pub color: Rgba<u8>,
    /// Inset between the region edges and the text, on every side
    pub padding: u32,
    /// Translucent strip behind the text
    pub band: Option<Rgba<u8>>,
}

/// Draw the picture, then the caption over it.
///
/// The output is exactly `image.width` x `image.height`. Without a
/// rasterizer the caption band is still painted but the text is skipped.
pub fn compose(
    image: &ImageSurface<'_>,
    caption: &CaptionSurface<'_>,
    text: Option<&dyn TextRasterizer>,
) -> Result<RgbaImage, ComposeError> {
    if image.width == 0 || image.height == 0 {
        return Err(ComposeError::EmptySurface {
            width: image.width,
            height: image.height,
        });
    }

    let mut canvas = RgbaImage::from_pixel(image.width, image.height, image.background);

    if let Some(content) = image.content {
        let scaled = cover(content, image.width, image.height);
        imageops::overlay(&mut canvas, &scaled, 0, 0);
    }

    if let Some(band) = caption.band {
        for_each_in_rect(&mut canvas, caption, |pixel, _, _| pixel.blend(&band));
    }

    if let Some(rasterizer) = text {
        if !caption.text.trim().is_empty() && caption.width > 0 {
            draw_caption_text(&mut canvas, caption, rasterizer);
        }
    }

    Ok(canvas)
}

/// Scale to fill `width` x `height`, cropping the overflow around the centre
fn cover(content: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if content.dimensions() == (width, height) {
        return content.clone();
    }
    DynamicImage::ImageRgba8(content.clone())
        .resize_to_fill(width, height, FilterType::Triangle)
        .into_rgba8()
}

fn draw_caption_text(canvas: &mut RgbaImage, caption: &CaptionSurface<'_>, rasterizer: &dyn TextRasterizer) {
    let inner_width = caption.width.saturating_sub(2 * caption.padding);
    if inner_width == 0 {
        return;
    }
    let mask = rasterizer.rasterize(caption.text, caption.font_px, inner_width);

    // Center vertically; a block taller than the region keeps its first line
    let left = caption.x + caption.padding as i64;
    let top = (caption.y + (caption.height as i64 - mask.height as i64) / 2).max(caption.y);
    let color = caption.color;

    for_each_in_rect(canvas, caption, |pixel, x, y| {
        let my = y - top;
        let mx = x - left;
        if mx < 0 || my < 0 {
            return;
        }
        let coverage = mask.get(mx as u32, my as u32);
        if coverage == 0 {
            return;
        }
        let alpha = (color[3] as u32 * coverage as u32 / 255) as u8;
        pixel.blend(&Rgba([color[0], color[1], color[2], alpha]));
    });
}

/// Visit every canvas pixel inside the caption rectangle
fn for_each_in_rect(
    canvas: &mut RgbaImage,
    caption: &CaptionSurface<'_>,
    mut f: impl FnMut(&mut Rgba<u8>, i64, i64),
) {
    let x0 = caption.x.max(0);
    let y0 = caption.y.max(0);
    let x1 = (caption.x + caption.width as i64).min(canvas.width() as i64);
    let y1 = (caption.y + caption.height as i64).min(canvas.height() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            f(canvas.get_pixel_mut(x as u32, y as u32), x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::text::TextMask;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    /// Every character is a solid block `px / 2` wide and `px` tall, centered
    struct BlockRasterizer;

    impl TextRasterizer for BlockRasterizer {
        fn rasterize(&self, text: &str, px: f32, max_width: u32) -> TextMask {
            let glyph_w = (px / 2.0) as u32;
            let text_w = (glyph_w * text.chars().count() as u32).min(max_width);
            let mut mask = TextMask::new(max_width, px as u32);
            let block = vec![255u8; (text_w * px as u32) as usize];
            mask.blit(((max_width - text_w) / 2) as i32, 0, text_w, px as u32, &block);
            mask
        }
    }

    fn caption<'a>(text: &'a str) -> CaptionSurface<'a> {
        CaptionSurface {
            text,
            x: 0,
            y: 30,
            width: 40,
            height: 10,
            font_px: 10.0,
            color: WHITE,
            padding: 0,
            band: None,
        }
    }

    /// Only the first row of the text block is inked
    struct TopRowRasterizer;

    impl TextRasterizer for TopRowRasterizer {
        fn rasterize(&self, _text: &str, px: f32, max_width: u32) -> TextMask {
            let mut mask = TextMask::new(max_width, px as u32 * 3);
            mask.blit(0, 0, max_width, 1, &vec![255u8; max_width as usize]);
            mask
        }
    }

    /// Remembers the wrap width it was asked for
    #[derive(Default)]
    struct WidthRecorder {
        seen: std::sync::Mutex<Vec<u32>>,
    }

    impl TextRasterizer for WidthRecorder {
        fn rasterize(&self, text: &str, px: f32, max_width: u32) -> TextMask {
            self.seen.lock().unwrap().push(max_width);
            BlockRasterizer.rasterize(text, px, max_width)
        }
    }

    #[test]
    fn test_output_matches_surface_size() {
        let picture = RgbaImage::from_pixel(640, 480, RED);
        for (w, h) in [(40, 40), (360, 360), (17, 93)] {
            let surface = ImageSurface {
                width: w,
                height: h,
                background: BLACK,
                content: Some(&picture),
            };
            let out = compose(&surface, &caption("Woof"), Some(&BlockRasterizer)).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_zero_size_surface_is_rejected() {
        let surface = ImageSurface {
            width: 0,
            height: 40,
            background: BLACK,
            content: None,
        };
        let result = compose(&surface, &caption("Woof"), None);
        assert_eq!(result, Err(ComposeError::EmptySurface { width: 0, height: 40 }));
    }

    #[test]
    fn test_picture_covers_surface() {
        let picture = RgbaImage::from_pixel(2, 1, RED);
        let surface = ImageSurface {
            width: 8,
            height: 8,
            background: BLACK,
            content: Some(&picture),
        };
        let out = compose(&surface, &caption(""), None).unwrap();
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_caption_drawn_inside_its_region() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let out = compose(&surface, &caption("Woof"), Some(&BlockRasterizer)).unwrap();

        // "Woof" is 4 blocks of 5px = 20px wide, centered in 40px
        assert_eq!(*out.get_pixel(20, 35), WHITE);
        assert_eq!(*out.get_pixel(10, 30), WHITE);
        assert_eq!(*out.get_pixel(5, 35), BLACK);
        // Nothing above the caption region is touched
        assert!((0..30).all(|y| *out.get_pixel(20, y) == BLACK));
    }

    #[test]
    fn test_band_without_rasterizer() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let mut region = caption("Woof");
        region.band = Some(WHITE);

        let out = compose(&surface, &region, None).unwrap();
        assert_eq!(*out.get_pixel(0, 30), WHITE);
        assert_eq!(*out.get_pixel(39, 39), WHITE);
        assert_eq!(*out.get_pixel(0, 29), BLACK);
    }

    #[test]
    fn test_caption_partially_off_canvas_is_clipped() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let mut region = caption("Woof");
        region.y = 35;
        region.band = Some(WHITE);

        let out = compose(&surface, &region, Some(&BlockRasterizer)).unwrap();
        assert_eq!(out.dimensions(), (40, 40));
        assert_eq!(*out.get_pixel(0, 39), WHITE);
    }

    #[test]
    fn test_padding_narrows_wrap_width() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let mut region = caption("WoofWoofWo");
        region.padding = 5;

        let recorder = WidthRecorder::default();
        let out = compose(&surface, &region, Some(&recorder)).unwrap();
        assert_eq!(*recorder.seen.lock().unwrap(), vec![30]);

        // 10 blocks of 5px are clipped to the 30px between the insets
        assert_eq!(*out.get_pixel(5, 35), WHITE);
        assert_eq!(*out.get_pixel(34, 35), WHITE);
        assert_eq!(*out.get_pixel(4, 35), BLACK);
        assert_eq!(*out.get_pixel(35, 35), BLACK);
    }

    #[test]
    fn test_tall_caption_keeps_first_line() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let mut region = caption("Woof Au au cachorro lindo");
        region.height = 4;

        let out = compose(&surface, &region, Some(&TopRowRasterizer)).unwrap();
        assert_eq!(*out.get_pixel(20, 30), WHITE);
        assert!((31..34).all(|y| *out.get_pixel(20, y) == BLACK));
    }

    #[test]
    fn test_padding_wider_than_region_skips_text() {
        let surface = ImageSurface {
            width: 40,
            height: 40,
            background: BLACK,
            content: None,
        };
        let mut region = caption("Woof");
        region.padding = 20;

        let out = compose(&surface, &region, Some(&BlockRasterizer)).unwrap();
        assert!(out.pixels().all(|p| *p == BLACK));
    }
}
