use std::borrow::Cow;

use anyhow::{Context, Result};

pub const ELLIPSIS: char = '…';

pub trait TextMeasure {
    /// Horizontal advance of `text` at `size` pixels.
    fn advance(&self, text: &str, size: f32) -> f32;
}

/// Glyph advances read from the card font.
pub struct FontMetrics<'a> {
    face: ttf_parser::Face<'a>,
}

impl<'a> FontMetrics<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0).context("Failed to parse font")?;
        Ok(Self { face })
    }
}

impl TextMeasure for FontMetrics<'_> {
    fn advance(&self, text: &str, size: f32) -> f32 {
        let units_per_em = self.face.units_per_em().max(1) as f32;
        let units: u32 = text
            .chars()
            .map(|c| {
                let glyph = self.face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                self.face.glyph_hor_advance(glyph).unwrap_or(0) as u32
            })
            .sum();
        units as f32 * size / units_per_em
    }
}

/// Shorten `text` to a single line of at most `max_width`, ending in an ellipsis.
pub fn truncate<'t>(
    text: &'t str,
    max_width: f32,
    size: f32,
    metrics: &impl TextMeasure,
) -> Cow<'t, str> {
    if metrics.advance(text, size) <= max_width {
        return Cow::Borrowed(text);
    }
    let mut ends = text.char_indices().map(|(i, _)| i).collect::<Vec<_>>();
    ends.reverse();
    for end in ends {
        let mut candidate = text[..end].trim_end().to_string();
        candidate.push(ELLIPSIS);
        if metrics.advance(&candidate, size) <= max_width {
            return Cow::Owned(candidate);
        }
    }
    Cow::Owned(ELLIPSIS.to_string())
}

/// Greedy word wrap. Whitespace collapses the way it does in normal flow;
/// words wider than a whole line are broken between characters.
pub fn wrap(text: &str, max_width: f32, size: f32, metrics: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() { word.to_string() } else { format!("{line} {word}") };
        if metrics.advance(&candidate, size) <= max_width {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        for c in word.chars() {
            line.push(c);
            if metrics.advance(&line, size) > max_width && line.chars().count() > 1 {
                line.pop();
                lines.push(std::mem::take(&mut line));
                line.push(c);
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
