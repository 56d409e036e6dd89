pub mod image_helper {
    use crate::core_modules::geometry::BoundingBox;
    use crate::error::ImageError;
    use image::{ImageEncoder, RgbaImage, imageops};

    /// Cuts `bbox` out of `image`.
    ///
    /// A group's consolidated box can reach past the edge of a smaller member image;
    /// the part outside the source is left fully transparent.
    pub fn crop(image: &RgbaImage, bbox: &BoundingBox) -> Result<RgbaImage, ImageError> {
        if bbox.is_empty() {
            return Err(ImageError::EmptyCrop {
                x: bbox.x0,
                y: bbox.y0,
                width: bbox.width(),
                height: bbox.height(),
            });
        }

        let mut canvas = RgbaImage::new(bbox.width(), bbox.height());
        imageops::replace(&mut canvas, image, -(bbox.x0 as i64), -(bbox.y0 as i64));
        Ok(canvas)
    }

    /// Encodes an RGBA buffer as PNG bytes.
    pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut bytes);

        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::geometry::BoundingBox;
    use image::{Rgba, RgbaImage};

    #[test]
    fn crop_copies_the_requested_region() {
        let mut image = RgbaImage::new(10, 10);
        image.put_pixel(4, 5, Rgba([1, 2, 3, 255]));

        let cropped = crop(&image, &BoundingBox::new(4, 5, 6, 8)).expect("Error Cropping.");
        assert_eq!(cropped.dimensions(), (2, 3));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
        assert_eq!(cropped.get_pixel(1, 2)[3], 0);
    }

    #[test]
    fn crop_past_the_edge_pads_with_transparency() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));

        let cropped = crop(&image, &BoundingBox::new(2, 2, 8, 8)).expect("Error Cropping.");
        assert_eq!(cropped.dimensions(), (6, 6));
        assert_eq!(cropped.get_pixel(1, 1)[3], 255);
        assert_eq!(cropped.get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn empty_crop_is_rejected() {
        let image = RgbaImage::new(4, 4);
        assert!(crop(&image, &BoundingBox::new(1, 1, 1, 3)).is_err());
    }

    #[test]
    fn encoded_png_decodes_back() {
        let height = 12u32;
        let width = 20u32;
        let mut buffer = RgbaImage::new(width, height);
        let mut intensity = 0u8;

        for pixel in buffer.pixels_mut() {
            *pixel = Rgba([intensity, intensity, intensity, 255]);
            intensity = intensity.wrapping_add(1);
        }

        let bytes = encode_png(&buffer).expect("Error Encoding File.");
        let decoded = image::load_from_memory(&bytes).expect("decodes").to_rgba8();
        assert_eq!(decoded, buffer);
    }
}
