//! Image-file codec for iris codes, via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Codes and masks are
//! stored as 8-bit single-channel images in which every pixel byte carries 8
//! packed code bits, so an image of `w x h` pixels is a `8w x h` bit code.

use crate::code::{BitTemplate, CodeLoader};
use crate::util::{HdEvalError, HdEvalResult};
use std::path::Path;

/// Copies a grayscale image buffer into a packed code.
pub fn code_from_gray_image(img: &image::GrayImage) -> HdEvalResult<BitTemplate> {
    let row_bytes = img.width() as usize;
    let rows = img.height() as usize;
    BitTemplate::from_rows(img.as_raw().clone(), row_bytes, rows)
}

/// Converts a decoded image into a packed code.
///
/// Only `L8` images are accepted; any other pixel encoding would silently
/// reinterpret the bit layout.
pub fn code_from_dynamic_image(img: image::DynamicImage) -> Result<BitTemplate, String> {
    match img {
        image::DynamicImage::ImageLuma8(gray) => {
            if gray.width() == 0 || gray.height() == 0 {
                return Err("image has no pixels".to_string());
            }
            code_from_gray_image(&gray).map_err(|err| err.to_string())
        }
        other => Err(format!(
            "expected 8-bit single-channel image, found {:?}",
            other.color()
        )),
    }
}

/// Loads a packed code from an image file.
pub fn load_code<P: AsRef<Path>>(path: P) -> HdEvalResult<BitTemplate> {
    let path = path.as_ref();
    let decode_err = |reason: String| HdEvalError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let img = image::open(path).map_err(|err| decode_err(err.to_string()))?;
    code_from_dynamic_image(img).map_err(decode_err)
}

/// `CodeLoader` backed by image files on disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl CodeLoader for ImageCodec {
    fn load(&self, path: &Path) -> HdEvalResult<BitTemplate> {
        load_code(path)
    }
}
