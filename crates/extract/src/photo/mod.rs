//! Equipment photographs: OCR label heuristics and electrode barcodes.

mod electrodes;
mod label;

pub use electrodes::{electrodes_from_barcodes, extract_electrodes, load_image, preprocess, BarcodeDecoder};
pub use label::{extract_battery, extract_defibrillator_g3, extract_defibrillator_g5, LabelReading};

use defibcheck_core::{DeviceGeneration, EquipmentClass, ImageRecord, OcrToken};

/// Building an [`ImageRecord`] from OCR output.
pub trait FromOcr: Sized {
    fn from_ocr(class: EquipmentClass, generation: DeviceGeneration, tokens: &[OcrToken]) -> Self;
}

impl FromOcr for ImageRecord {
    /// Electrode serials are barcodes, not text; OCR tokens for them give an
    /// empty record.
    fn from_ocr(class: EquipmentClass, generation: DeviceGeneration, tokens: &[OcrToken]) -> Self {
        let reading = match (class, generation) {
            (EquipmentClass::Defibrillator, DeviceGeneration::G3) => extract_defibrillator_g3(tokens),
            (EquipmentClass::Defibrillator, DeviceGeneration::G5) => extract_defibrillator_g5(tokens),
            (EquipmentClass::Battery, _) => extract_battery(tokens),
            (EquipmentClass::Electrodes, _) => {
                log::warn!("electrodes are read from barcodes, ignoring {} OCR tokens", tokens.len());
                LabelReading::default()
            }
        };
        reading.into_record(class)
    }
}

impl LabelReading {
    pub fn into_record(self, class: EquipmentClass) -> ImageRecord {
        ImageRecord::new(class, self.serial, self.date)
    }
}
