use crate::error::Result;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::Path;

/// How the pixel data ends up in the PDF
pub enum ImageData {
    /// Baseline RGB JPEGs are embedded as-is
    Jpeg(Vec<u8>),
    /// Everything else is decoded and re-compressed
    Pixels(DynamicImage),
}

/// A raster image that can be placed on pages any number of times while only
/// being embedded once
pub struct Image {
    pub data: ImageData,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

struct Encoded {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Image {
    /// Load a PNG, JPEG, TGA, etc. from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Image> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        // TGA files have no magic number to guess from
        let is_tga = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("tga"))
            .unwrap_or(false);
        let format = if is_tga {
            ImageFormat::Tga
        } else {
            image::guess_format(&data)?
        };
        Image::from_bytes(data, format)
    }

    pub fn from_bytes(data: Vec<u8>, format: ImageFormat) -> Result<Image> {
        let image = image::load_from_memory_with_format(&data, format)?;
        let (width, height) = (image.width(), image.height());

        let data = match (format, image.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => ImageData::Jpeg(data),
            _ => ImageData::Pixels(image),
        };

        Ok(Image {
            data,
            width,
            height,
        })
    }

    pub fn from_image(image: DynamicImage) -> Image {
        Image {
            width: image.width(),
            height: image.height(),
            data: ImageData::Pixels(image),
        }
    }

    /// Natural size of the image, one point per pixel
    pub fn size(&self) -> (Pt, Pt) {
        (Pt(self.width as f32), Pt(self.height as f32))
    }

    fn encode(&self) -> Encoded {
        match &self.data {
            ImageData::Jpeg(bytes) => Encoded {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            ImageData::Pixels(image) => {
                let level = CompressionLevel::DefaultLevel as u8;
                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });
                Encoded {
                    filter: Filter::FlateDecode,
                    bytes: compress_to_vec_zlib(image.to_rgb8().as_raw(), level),
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
        let encoded = self.encode();
        let id = refs.alloc(RefType::Image(index));
        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.alloc(RefType::ImageMask(index)));

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn pixels_keep_their_size_and_alpha() {
        let image = Image::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            3,
            2,
            Rgba([255, 0, 0, 128]),
        )));
        assert_eq!(image.size(), (Pt(3.0), Pt(2.0)));
        assert!(image.encode().mask.is_some());

        let opaque = Image::from_image(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            1,
            1,
            Rgb([0, 0, 0]),
        )));
        assert!(opaque.encode().mask.is_none());
    }

    #[test]
    fn unreadable_files_fail() {
        assert!(Image::load("does/not/exist.png").is_err());
    }
}
