pub mod card;
pub mod layout;
pub mod svg;
pub mod text;

use std::{collections::HashMap, io::Cursor, time::Instant};

use anyhow::{Context, Result};
use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use og_card_core::models::ImageData;

use crate::{
    card::CardImages,
    layout::CardLayout,
    svg::Fonts,
    text::FontMetrics,
};

/// Everything a card needs besides its layout, fetched fresh per request.
#[derive(Debug, Clone)]
pub struct CardAssets {
    pub header: ImageData,
    pub font: Bytes,
    /// Family name the font is registered and referenced under.
    pub family: String,
    /// Avatar images keyed by the URL the layout refers to.
    pub avatars: HashMap<String, ImageData>,
}

/// Turns a card layout into encoded image bytes.
pub trait CardRenderer: Send + Sync {
    fn render(&self, layout: &CardLayout, assets: &CardAssets) -> Result<Vec<u8>>;
}

/// Draws the card as SVG and rasterizes it to PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgCardRenderer;

impl CardRenderer for SvgCardRenderer {
    fn render(&self, layout: &CardLayout, assets: &CardAssets) -> Result<Vec<u8>> {
        let start = Instant::now();
        let header_size = ImageReader::new(Cursor::new(&assets.header.data[..]))
            .with_guessed_format()?
            .into_dimensions()
            .context("Failed to read header image")?;
        let fonts = Fonts::load(&assets.font, &assets.family)?;
        let metrics = FontMetrics::parse(&assets.font)?;
        let images = CardImages { header: &assets.header, header_size, avatars: &assets.avatars };
        let svg = card::render_svg(layout, &images, &fonts.family, &metrics)?;
        let data = svg::render_image(&svg, Some(&fonts), ImageFormat::Png)?;
        tracing::debug!("Rendered card ({} bytes) in {:?}", data.len(), start.elapsed());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use og_card_core::models::AvatarSource;

    use super::*;
    use crate::text::tests::HalfEm;

    fn png(width: u32, height: u32) -> Bytes { solid_png(width, height, [0, 0, 0, 255]) }

    fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::from_pixel(width, height, Rgba(color))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner().into()
    }

    fn layout() -> CardLayout {
        CardLayout {
            category: "Engineering".to_string(),
            tag: None,
            date: "May 4, 2023".to_string(),
            title: "Title".to_string(),
            excerpt: String::new(),
            lead_avatar: None,
            comment_avatars: vec![],
        }
    }

    #[test]
    fn test_render_rejects_invalid_font() {
        let assets = CardAssets {
            header: ImageData { mime: "image/png".to_string(), data: png(1200, 100) },
            font: Bytes::from_static(b"not a font"),
            family: "Matter".to_string(),
            avatars: HashMap::new(),
        };
        assert!(SvgCardRenderer.render(&layout(), &assets).is_err());
    }

    #[test]
    fn test_render_rejects_invalid_header() {
        let assets = CardAssets {
            header: ImageData { mime: "image/png".to_string(), data: Bytes::from_static(b"??") },
            font: Bytes::new(),
            family: "Matter".to_string(),
            avatars: HashMap::new(),
        };
        assert!(SvgCardRenderer.render(&layout(), &assets).is_err());
    }

    #[test]
    fn test_full_card_raster() {
        let png_data = |data: Bytes| ImageData { mime: "image/png".to_string(), data };
        let header = png_data(solid_png(1200, 120, [0, 0, 255, 255]));
        let avatars = HashMap::from([
            ("https://cdn/author.png".to_string(), png_data(solid_png(8, 8, [255, 0, 0, 255]))),
            ("https://cdn/commenter.png".to_string(), png_data(solid_png(8, 8, [0, 255, 0, 255]))),
        ]);
        let layout = CardLayout {
            tag: Some("Rust".to_string()),
            excerpt: "Short".to_string(),
            lead_avatar: Some("https://cdn/author.png".to_string()),
            comment_avatars: vec![
                AvatarSource::Image("https://cdn/commenter.png".to_string()),
                AvatarSource::Placeholder,
            ],
            ..layout()
        };
        let images = CardImages { header: &header, header_size: (1200, 120), avatars: &avatars };
        let svg = card::render_svg(&layout, &images, "Matter", &HalfEm).unwrap();
        let data = svg::render_image(&svg, None, ImageFormat::Png).unwrap();

        let raster =
            image::load_from_memory_with_format(&data, ImageFormat::Png).unwrap().to_rgba8();
        assert_eq!(raster.dimensions(), (card::WIDTH, card::HEIGHT));
        // header banner
        assert_eq!(raster.get_pixel(0, 0).0, [0, 0, 255, 255]);
        // background
        assert_eq!(raster.get_pixel(1199, 629).0, [0xee, 0xef, 0xe9, 255]);
        // lead avatar, centered at (83, 288) below the 120px header and meta row
        assert_eq!(raster.get_pixel(83, 288).0, [255, 0, 0, 255]);
        // first comment avatar, then the placeholder's background circle
        assert_eq!(raster.get_pixel(175, 436).0, [0, 255, 0, 255]);
        assert_eq!(raster.get_pixel(209, 414).0, [0xe5, 0xe7, 0xe0, 255]);
    }
}
