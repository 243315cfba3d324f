//! Electrode pads carry their serial and expiry as two barcodes in the
//! lower-right part of the package.

use image::{DynamicImage, GenericImageView};

use super::label::LabelReading;
use crate::error::ExtractError;

/// Left and top margins dropped before decoding, as fractions of the image.
const CROP_LEFT: f64 = 0.2;
const CROP_TOP: f64 = 0.1;
/// Contrast stretch around mid-grey.
const CONTRAST_FACTOR: f32 = 2.5;
/// 3x3 sharpening kernel; `filter3x3` divides by the kernel sum (16).
const SHARPEN: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Barcode symbol decoding is done outside this crate.
pub trait BarcodeDecoder {
    /// Payloads in the order the decoder found them.
    fn decode(&self, image: &DynamicImage) -> Result<Vec<String>, ExtractError>;
}

impl<F> BarcodeDecoder for F
where
    F: Fn(&DynamicImage) -> Result<Vec<String>, ExtractError>,
{
    fn decode(&self, image: &DynamicImage) -> Result<Vec<String>, ExtractError> {
        self(image)
    }
}

pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Crop to the barcode region, then boost contrast and sharpen.
pub fn preprocess(image: &DynamicImage) -> Result<DynamicImage, ExtractError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExtractError::Image(format!("empty image ({width}x{height})")));
    }

    let x = (f64::from(width) * CROP_LEFT) as u32;
    let y = (f64::from(height) * CROP_TOP) as u32;
    let cropped = image.crop_imm(x, y, width - x, height - y);

    // `adjust_contrast` scales by ((100 + c) / 100)^2
    let percent = (CONTRAST_FACTOR.sqrt() - 1.0) * 100.0;
    Ok(cropped.adjust_contrast(percent).filter3x3(&SHARPEN))
}

/// First barcode is the serial, second the expiry date.
pub fn electrodes_from_barcodes(payloads: &[String]) -> LabelReading {
    match payloads {
        [serial, date, ..] => LabelReading::new(Some(serial.clone()), Some(date.clone())),
        [] => {
            log::warn!("no barcode found on the electrodes image");
            LabelReading::default()
        }
        found => {
            log::warn!("unexpected barcode count on the electrodes image: {} (expected at least 2)", found.len());
            LabelReading::default()
        }
    }
}

/// Never fails: decode problems are logged and yield an empty reading.
pub fn extract_electrodes(image: &DynamicImage, decoder: &dyn BarcodeDecoder) -> LabelReading {
    let prepared = match preprocess(image) {
        Ok(prepared) => prepared,
        Err(e) => {
            log::warn!("electrodes image skipped: {e}");
            return LabelReading::default();
        }
    };
    match decoder.decode(&prepared) {
        Ok(payloads) => electrodes_from_barcodes(&payloads),
        Err(e) => {
            log::warn!("electrodes image skipped: {e}");
            LabelReading::default()
        }
    }
}
