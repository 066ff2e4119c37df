//! Image XObjects
//!
//! Photographs are embedded as-is with the DCTDecode filter after a full
//! decode has proven them readable. The logo may be any format the `image`
//! crate reads; it is stored as raw RGB (Flate-compressed on save) with an
//! optional soft mask carrying its alpha channel.

use std::fs;
use std::path::Path;
use image::ImageFormat;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};

/// An image stored in a document, with its pixel size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageXObject {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

fn image_dictionary(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

/// Frame header facts the decoder does not report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegHeader {
    /// Colour components in the frame: 1 (gray), 3 (YCbCr/RGB) or 4 (CMYK/YCCK)
    pub components: u8,
    /// An Adobe APP14 segment is present; CMYK samples are then stored inverted
    pub adobe: bool,
}

/// Read the component count and Adobe marker from the segments before the
/// first scan. Returns `None` when no frame header is found.
pub fn read_jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut adobe = false;
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }
        // End of image or start of scan: no frame header ahead
        if marker == 0xD9 || marker == 0xDA {
            return None;
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let segment = bytes.get(pos + 4..pos + 2 + length)?;

        match marker {
            // SOF0..SOF15, excluding DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let components = *segment.get(5)?;
                return Some(JpegHeader { components, adobe });
            }
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            _ => {}
        }
        pos += 2 + length;
    }
    None
}

/// Decode a JPEG file and embed its original bytes.
///
/// The colour space comes from the frame header, since the decoder
/// converts CMYK to RGB. Nothing is added to `doc` when the file cannot be
/// read or decoded.
pub fn embed_jpeg(doc: &mut Document, path: &Path) -> Result<ImageXObject> {
    let bytes = fs::read(path)?;
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)?;
    let (width, height) = (decoded.width(), decoded.height());

    let header = read_jpeg_header(&bytes)
        .ok_or_else(|| Error::General(format!("No JPEG frame header in {}", path.display())))?;

    let color_space: &[u8] = match header.components {
        1 => b"DeviceGray",
        3 => b"DeviceRGB",
        4 => b"DeviceCMYK",
        n => {
            return Err(Error::General(format!(
                "Unsupported JPEG component count {} in {}",
                n,
                path.display()
            )))
        }
    };

    let mut dict = image_dictionary(width, height, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    if header.components == 4 && header.adobe {
        dict.set(
            "Decode",
            Object::Array([1, 0, 1, 0, 1, 0, 1, 0].into_iter().map(Object::Integer).collect()),
        );
    }

    let stream = Stream::new(dict, bytes).with_compression(false);
    let id = doc.add_object(Object::Stream(stream));

    Ok(ImageXObject { id, width, height })
}

/// Decode any supported raster image and embed it as RGB pixels
pub fn embed_raster(doc: &mut Document, path: &Path) -> Result<ImageXObject> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut dict = image_dictionary(width, height, b"DeviceRGB");

    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask = Stream::new(image_dictionary(width, height, b"DeviceGray"), alpha);
        let mask_id = doc.add_object(Object::Stream(mask));
        dict.set("SMask", Object::Reference(mask_id));
    }

    let id = doc.add_object(Object::Stream(Stream::new(dict, rgb)));

    Ok(ImageXObject { id, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_embed_jpeg_keeps_original_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        RgbImage::from_pixel(12, 8, Rgb([200, 40, 40])).save(&path).unwrap();

        let mut doc = Document::with_version("1.5");
        let image = embed_jpeg(&mut doc, &path).unwrap();

        assert_eq!((image.width, image.height), (12, 8));
        let stream = doc.get_object(image.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, fs::read(&path).unwrap());
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    }

    #[test]
    fn test_embed_grayscale_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gray.jpg");
        image::GrayImage::from_pixel(8, 8, image::Luma([120])).save(&path).unwrap();

        let mut doc = Document::with_version("1.5");
        let image = embed_jpeg(&mut doc, &path).unwrap();

        let stream = doc.get_object(image.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceGray");
    }

    #[test]
    fn test_embed_cmyk_jpeg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("print.jpg");
        let pixels: Vec<u8> = [10u8, 200, 30, 0].repeat(16 * 16);
        jpeg_encoder::Encoder::new_file(&path, 90)
            .unwrap()
            .encode(&pixels, 16, 16, jpeg_encoder::ColorType::Cmyk)
            .unwrap();

        let mut doc = Document::with_version("1.5");
        let image = embed_jpeg(&mut doc, &path).unwrap();

        let stream = doc.get_object(image.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceCMYK");

        let header = read_jpeg_header(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(header.components, 4);
        assert_eq!(stream.dict.has(b"Decode"), header.adobe);
    }

    /// SOI, optional APP14 "Adobe", then a baseline frame header with `components`
    fn synthetic_header(components: u8, adobe: bool) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        if adobe {
            bytes.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            bytes.extend_from_slice(b"Adobe");
            bytes.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x00]);
        }
        let length = 8 + 3 * components as u16;
        bytes.extend_from_slice(&[0xFF, 0xC0]);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&[8, 0x00, 0x10, 0x00, 0x10, components]);
        for id in 1..=components {
            bytes.extend_from_slice(&[id, 0x11, 0x00]);
        }
        bytes.extend_from_slice(&[0xFF, 0xDA]);
        bytes
    }

    #[test]
    fn test_read_jpeg_header() {
        assert_eq!(
            read_jpeg_header(&synthetic_header(4, true)),
            Some(JpegHeader { components: 4, adobe: true })
        );
        assert_eq!(
            read_jpeg_header(&synthetic_header(3, false)),
            Some(JpegHeader { components: 3, adobe: false })
        );
        assert_eq!(read_jpeg_header(b"not a jpeg"), None);
        assert_eq!(read_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02]), None);
    }

    #[test]
    fn test_embed_jpeg_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        let mut doc = Document::with_version("1.5");
        let result = embed_jpeg(&mut doc, &path);

        assert!(matches!(result, Err(Error::Image(_))));
        assert!(doc.objects.is_empty());
    }

    #[test]
    fn test_embed_raster_with_alpha_adds_soft_mask() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        let mut logo = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 255, 255]));
        logo.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        logo.save(&path).unwrap();

        let mut doc = Document::with_version("1.5");
        let image = embed_raster(&mut doc, &path).unwrap();

        let stream = doc.get_object(image.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content.len(), 4 * 2 * 3);
        assert!(stream.dict.get(b"SMask").is_ok());
    }

    #[test]
    fn test_embed_raster_opaque_has_no_mask() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        RgbImage::from_pixel(3, 3, Rgb([10, 20, 30])).save(&path).unwrap();

        let mut doc = Document::with_version("1.5");
        let image = embed_raster(&mut doc, &path).unwrap();

        let stream = doc.get_object(image.id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_err());
        assert_eq!(doc.objects.len(), 1);
    }

    #[test]
    fn test_embed_raster_missing_file() {
        let mut doc = Document::with_version("1.5");
        let result = embed_raster(&mut doc, Path::new("no/such/logo.png"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
