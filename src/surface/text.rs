//! Text shaping for the overlay effects.
//!
//! Text is laid out with `parley` from raw font bytes and rasterized through
//! [`Pen::fill_text`](crate::surface::painter::Pen::fill_text). No system font discovery is done
//! by `parley` itself; the font file comes from [`FONT_ENV`] or a short list of well-known paths.

use crate::foundation::error::{FxError, FxResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Environment variable naming the TTF/OTF file used for text overlays.
pub const FONT_ENV: &str = "LIVEFX_FONT";

const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Read a font file into shared bytes.
pub fn load_font(path: &Path) -> FxResult<Arc<Vec<u8>>> {
    let bytes = std::fs::read(path).map_err(|e| {
        FxError::unavailable(format!("read font '{}': {e}", path.display()))
    })?;
    if bytes.is_empty() {
        return Err(FxError::unavailable(format!(
            "font '{}' is empty",
            path.display()
        )));
    }
    Ok(Arc::new(bytes))
}

fn font_candidates() -> Vec<PathBuf> {
    std::env::var_os(FONT_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(FALLBACK_FONTS.iter().map(PathBuf::from))
        .collect()
}

/// Process-wide default font, resolved once. `None` when no candidate file is readable.
pub fn default_font() -> Option<Arc<Vec<u8>>> {
    static FONT: OnceLock<Option<Arc<Vec<u8>>>> = OnceLock::new();
    FONT.get_or_init(|| {
        for path in font_candidates() {
            match load_font(&path) {
                Ok(bytes) => {
                    tracing::debug!(path = %path.display(), "text font loaded");
                    return Some(bytes);
                }
                Err(e) => tracing::trace!(error = %e, "font candidate skipped"),
            }
        }
        tracing::warn!(
            "no font found for text overlays (set {FONT_ENV}); text will not be drawn"
        );
        None
    })
    .clone()
}

/// Shaped single-paragraph text ready for [`Pen::fill_text`](crate::surface::painter::Pen::fill_text).
#[derive(Clone)]
pub struct TextLine {
    pub(crate) layout: parley::Layout<()>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLine")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl TextLine {
    /// Widest line advance in pixels.
    pub fn width(&self) -> f32 {
        self.layout
            .lines()
            .map(|l| l.metrics().advance)
            .fold(0.0, f32::max)
    }

    pub fn height(&self) -> f32 {
        self.layout
            .lines()
            .map(|l| {
                let m = l.metrics();
                m.ascent + m.descent + m.leading
            })
            .sum()
    }

    /// Distance from the top of the layout to the first baseline.
    pub fn ascent(&self) -> f32 {
        self.layout
            .lines()
            .next()
            .map_or(0.0, |l| l.metrics().ascent + l.metrics().leading / 2.0)
    }
}

/// Font plus reusable `parley` contexts.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("family", &self.family)
            .finish()
    }
}

impl TextEngine {
    /// Engine over the process default font.
    pub fn system() -> FxResult<Self> {
        let bytes = default_font()
            .ok_or_else(|| FxError::unavailable(format!("no text font (set {FONT_ENV})")))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(font_bytes: &[u8]) -> FxResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| FxError::validation("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FxError::validation("registered font family has no name"))?
            .to_owned();
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Shape `text` at `size_px` on a single unbounded line.
    pub fn layout(&mut self, text: &str, size_px: f32) -> FxResult<TextLine> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FxError::validation("text size must be finite and > 0"));
        }
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(TextLine {
            layout,
            font: self.font.clone(),
        })
    }

    /// Advance width of `text` at `size_px`.
    pub fn measure(&mut self, text: &str, size_px: f32) -> FxResult<f32> {
        Ok(self.layout(text, size_px)?.width())
    }
}

/// Greedy word wrap: words are joined with single spaces while `measure` stays within
/// `max_width`. A single word wider than `max_width` gets a line of its own.
pub fn wrap_words(
    text: &str,
    max_width: f32,
    mut measure: impl FnMut(&str) -> f32,
) -> Vec<String> {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    let mut current = first.to_owned();
    for word in words {
        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/surface/text.rs"]
mod tests;
