//! UI rendering helpers.
//!
//! Turning encoded image bytes into textures, sizing images for the
//! comparison view, and the small pieces of text around them.

use crate::client::InferenceResult;
use crate::error::{AppError, Result};
use eframe::egui;

/// Decodes encoded image bytes (PNG, JPEG, ...) for display.
///
/// # Errors
///
/// Returns [`AppError::ImageLoad`] if the bytes are not a decodable image.
pub fn decode_color_image(bytes: &[u8]) -> Result<egui::ColorImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AppError::image(format!("Failed to decode image: {}", e)))?;

    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.as_flat_samples();

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

/// Scales `size` down to fit inside `max`, keeping the aspect ratio.
///
/// Never scales up.
pub fn fit_size(size: egui::Vec2, max: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
    size * scale
}

/// The line shown above the comparison, e.g. `Model: naive · Inference: 0.42s`.
///
/// Values are shown exactly as the service reported them.
pub fn result_summary(result: &InferenceResult) -> String {
    format!(
        "Model: {} \u{b7} Inference: {}s",
        result.model, result.inference_time_s
    )
}

/// Draws a titled card with a texture scaled to `max_size`, or a
/// placeholder text when the texture isn't available.
pub fn comparison_card(
    ui: &mut egui::Ui,
    title: &str,
    texture: Option<&egui::TextureHandle>,
    placeholder: &str,
    max_size: egui::Vec2,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.heading(title);
            match texture {
                Some(texture) => {
                    let size = fit_size(texture.size_vec2(), max_size);
                    ui.add(egui::Image::new((texture.id(), size)));
                }
                None => {
                    ui.label(placeholder);
                }
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn fit_size_keeps_aspect_and_never_upscales() {
        let fitted = fit_size(egui::vec2(800.0, 400.0), egui::vec2(400.0, 400.0));
        assert_eq!(fitted, egui::vec2(400.0, 200.0));

        let small = fit_size(egui::vec2(100.0, 50.0), egui::vec2(400.0, 400.0));
        assert_eq!(small, egui::vec2(100.0, 50.0));

        assert_eq!(fit_size(egui::Vec2::ZERO, egui::vec2(10.0, 10.0)), egui::Vec2::ZERO);
    }

    #[test]
    fn summary_reports_values_verbatim() {
        let result = InferenceResult {
            depth_map: "X".into(),
            inference_time_s: 1.23,
            model: "deeplearning".into(),
        };
        assert_eq!(result_summary(&result), "Model: deeplearning \u{b7} Inference: 1.23s");
    }

    #[test]
    fn decodes_png_bytes() {
        let mut encoded = Vec::new();
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .unwrap();

        let image = decode_color_image(&encoded).unwrap();
        assert_eq!(image.size, [3, 2]);
        assert!(decode_color_image(b"definitely not an image").is_err());
    }
}
