//! Caption text rasterization
//!
//! Produces an 8-bit coverage mask for a caption, word-wrapped to a maximum
//! width with every line centered. `fontdue` does the glyph work.

use fontdue::{Font, FontSettings};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 8-bit coverage mask, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMask {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl TextMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Copy a `w`x`h` coverage block with its top-left at (`x`, `y`).
    /// Pixels outside the mask are dropped; overlaps keep the max.
    pub fn blit(&mut self, x: i32, y: i32, w: u32, h: u32, data: &[u8]) {
        for row in 0..h {
            let ty = y + row as i32;
            if ty < 0 || ty >= self.height as i32 {
                continue;
            }
            for col in 0..w {
                let tx = x + col as i32;
                if tx < 0 || tx >= self.width as i32 {
                    continue;
                }
                let Some(&value) = data.get((row * w + col) as usize) else {
                    continue;
                };
                let idx = (ty as u32 * self.width + tx as u32) as usize;
                self.coverage[idx] = self.coverage[idx].max(value);
            }
        }
    }
}

/// Turns caption text into a coverage mask
pub trait TextRasterizer: Send + Sync {
    /// Lay `text` out in lines no wider than `max_width` at `px` pixels
    /// per em. The mask is `max_width` wide and as tall as the lines need.
    fn rasterize(&self, text: &str, px: f32, max_width: u32) -> TextMask;
}

/// Greedy word wrap. A single word wider than `max_width` gets its own line.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("could not read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font data: {0}")]
    Invalid(&'static str),
}

/// `TextRasterizer` over a single TTF/OTF face
pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(FontError::Invalid)?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes)
    }

    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, px).advance_width)
            .sum()
    }
}

impl TextRasterizer for FontdueRasterizer {
    fn rasterize(&self, text: &str, px: f32, max_width: u32) -> TextMask {
        let lines = wrap_words(text, max_width as f32, |s| self.measure(s, px));

        let (ascent, line_height) = match self.font.horizontal_line_metrics(px) {
            Some(metrics) => (metrics.ascent, metrics.new_line_size),
            None => (px * 0.8, px * 1.2),
        };

        let height = (line_height * lines.len() as f32).ceil() as u32;
        let mut mask = TextMask::new(max_width, height);

        for (index, line) in lines.iter().enumerate() {
            let line_width = self.measure(line, px);
            let mut pen_x = ((max_width as f32 - line_width) / 2.0).max(0.0);
            let baseline = ascent + index as f32 * line_height;

            for ch in line.chars() {
                let (metrics, bitmap) = self.font.rasterize(ch, px);
                // ymin is the distance from the baseline up to the glyph's bottom edge
                let x = (pen_x + metrics.xmin as f32).round() as i32;
                let y = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i32;
                mask.blit(x, y, metrics.width as u32, metrics.height as u32, &bitmap);
                pen_x += metrics.advance_width;
            }
        }

        mask
    }
}

impl std::fmt::Debug for FontdueRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueRasterizer").finish_non_exhaustive()
    }
}
