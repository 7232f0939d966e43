use std::{io::Cursor, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use image::{ImageFormat, RgbaImage};
use resvg::{
    tiny_skia,
    usvg::{self, fontdb},
};

/// Fonts available while rasterizing, plus the family name to reference them by.
pub struct Fonts {
    pub db: Arc<fontdb::Database>,
    pub family: String,
}

impl Fonts {
    /// Load font data and register every face in it under `family`, in addition to the
    /// names in the font's own name table.
    pub fn load(data: &[u8], family: &str) -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_font_data(data.to_vec());
        let faces = db.faces().cloned().collect::<Vec<_>>();
        if faces.is_empty() {
            bail!("Font data contains no faces");
        }
        for mut face in faces {
            db.remove_face(face.id);
            if !face.families.iter().any(|(name, _)| name == family) {
                face.families.insert(0, (family.to_string(), fontdb::Language::English_UnitedStates));
            }
            db.push_face_info(face);
        }
        Ok(Self { db: Arc::new(db), family: family.to_string() })
    }
}

/// Rasterize an SVG document at its intrinsic size and encode it.
pub fn render_image(svg: &str, fonts: Option<&Fonts>, format: ImageFormat) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    if let Some(fonts) = fonts {
        options.fontdb = fonts.db.clone();
        options.font_family = fonts.family.clone();
    }
    let tree = usvg::Tree::from_str(svg, &options).context("Failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Invalid image size {}x{}", size.width(), size.height()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let pixels = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect::<Vec<_>>();
    let image = RgbaImage::from_raw(size.width(), size.height(), pixels)
        .ok_or_else(|| anyhow!("Pixel buffer size mismatch"))?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
            <rect width="40" height="20" fill="#EEEFE9"/>
            <circle cx="10" cy="10" r="8" fill="#D0D1C9"/>
        </svg>"##;
        let data = render_image(svg, None, ImageFormat::Png).unwrap();
        let image = image::load_from_memory_with_format(&data, ImageFormat::Png).unwrap();
        assert_eq!((image.width(), image.height()), (40, 20));
        let pixel = image.to_rgba8().get_pixel(39, 0).0;
        assert_eq!(pixel, [0xee, 0xef, 0xe9, 0xff]);
    }

    #[test]
    fn test_render_invalid_svg() {
        assert!(render_image("<svg", None, ImageFormat::Png).is_err());
    }

    #[test]
    fn test_load_invalid_font() {
        assert!(Fonts::load(b"not a font", "Matter").is_err());
    }

    #[test]
    fn test_font_registered_under_family() {
        // Uses a system font when one is installed.
        let Ok(data) = std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf") else {
            return;
        };
        let fonts = Fonts::load(&data, "Card Sans").unwrap();
        assert_eq!(fonts.family, "Card Sans");
        let face = fonts.db.faces().next().unwrap();
        assert_eq!(face.families[0].0, "Card Sans");
        assert!(face.families.iter().any(|(name, _)| name == "DejaVu Sans"));

        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="60" height="40">
            <rect width="60" height="40" fill="white"/>
            <text x="4" y="32" font-family="Card Sans" font-size="36" fill="black">M</text>
        </svg>"##;
        let data = render_image(svg, Some(&fonts), ImageFormat::Png).unwrap();
        let image = image::load_from_memory_with_format(&data, ImageFormat::Png).unwrap();
        assert!(image.to_rgba8().pixels().any(|p| p.0[0] < 64));
    }
}
