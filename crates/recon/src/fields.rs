//! Which document field feeds each logical field.
//!
//! The inspection form has separate fields for parts fitted during the
//! visit, so the form side depends on the part's change flag. The device
//! report side depends on the hardware generation.

use defibcheck_core::fields::{aed_g3, aed_g5, rvd};
use defibcheck_core::{DeviceGeneration, EquipmentClass};

use crate::config::ChangeFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    DefibSerial,
    DefibFabricationDate,
    ReportDate,
    BatterySerial,
    BatteryFabricationDate,
    BatteryInstallDate,
    BatteryLevel,
    AdultSerial,
    AdultExpiry,
    PediatricSerial,
    PediatricExpiry,
}

/// How values of a field are normalized and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Serial,
    Date,
    /// Percentage with a tolerance.
    Level,
}

/// Which part of a photographed label holds the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAttr {
    Serial,
    Date,
}

pub const DEFIBRILLATOR_FIELDS: [LogicalField; 3] = [
    LogicalField::DefibSerial,
    LogicalField::DefibFabricationDate,
    LogicalField::ReportDate,
];

pub const BATTERY_FIELDS: [LogicalField; 4] = [
    LogicalField::BatterySerial,
    LogicalField::BatteryFabricationDate,
    LogicalField::BatteryInstallDate,
    LogicalField::BatteryLevel,
];

pub const ADULT_ELECTRODE_FIELDS: [LogicalField; 2] = [LogicalField::AdultSerial, LogicalField::AdultExpiry];

pub const PEDIATRIC_ELECTRODE_FIELDS: [LogicalField; 2] =
    [LogicalField::PediatricSerial, LogicalField::PediatricExpiry];

impl LogicalField {
    pub const ALL: [LogicalField; 11] = [
        Self::DefibSerial,
        Self::DefibFabricationDate,
        Self::ReportDate,
        Self::BatterySerial,
        Self::BatteryFabricationDate,
        Self::BatteryInstallDate,
        Self::BatteryLevel,
        Self::AdultSerial,
        Self::AdultExpiry,
        Self::PediatricSerial,
        Self::PediatricExpiry,
    ];

    /// Key of the field within its section of the report.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DefibSerial | Self::BatterySerial | Self::AdultSerial | Self::PediatricSerial => {
                "Numéro de série"
            }
            Self::DefibFabricationDate | Self::BatteryFabricationDate => "Date de fabrication",
            Self::ReportDate => "Date de rapport",
            Self::BatteryInstallDate => "Date d'installation",
            Self::BatteryLevel => "battery_level",
            Self::AdultExpiry | Self::PediatricExpiry => "Date de péremption",
        }
    }

    pub fn shape(&self) -> FieldShape {
        match self {
            Self::DefibSerial | Self::BatterySerial | Self::AdultSerial | Self::PediatricSerial => {
                FieldShape::Serial
            }
            Self::BatteryLevel => FieldShape::Level,
            _ => FieldShape::Date,
        }
    }

    /// The change flag that redirects this field to the "new part" fields.
    pub fn changed(&self, flags: &ChangeFlags) -> bool {
        match self {
            Self::DefibSerial | Self::DefibFabricationDate | Self::ReportDate => false,
            Self::BatterySerial
            | Self::BatteryFabricationDate
            | Self::BatteryInstallDate
            | Self::BatteryLevel => flags.battery,
            Self::AdultSerial | Self::AdultExpiry => flags.adult_electrodes,
            Self::PediatricSerial | Self::PediatricExpiry => flags.pediatric_electrodes,
        }
    }
}

/// Form fields for one logical field: the printed value and, where the form
/// has one, the value the technician read off the equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RvdFields {
    pub original: &'static str,
    pub releve: Option<&'static str>,
}

const fn fields(original: &'static str, releve: Option<&'static str>) -> RvdFields {
    RvdFields { original, releve }
}

/// New parts have no separate "relevé" field on the form.
pub fn rvd_fields(field: LogicalField, changed: bool) -> RvdFields {
    use LogicalField::*;
    match (field, changed) {
        (DefibSerial, _) => fields(rvd::DEFIB_SERIAL, Some(rvd::DEFIB_SERIAL_RELEVE)),
        (DefibFabricationDate, _) => fields(rvd::DEFIB_FAB_DATE, Some(rvd::DEFIB_FAB_DATE_RELEVE)),
        (ReportDate, _) => fields(rvd::REPORT_DATE, None),

        (BatterySerial, false) => fields(rvd::BATTERY_SERIAL, Some(rvd::BATTERY_SERIAL_RELEVE)),
        (BatterySerial, true) => fields(rvd::NEW_BATTERY_SERIAL, None),
        (BatteryFabricationDate, false) => fields(rvd::BATTERY_FAB_DATE, Some(rvd::BATTERY_FAB_DATE_RELEVE)),
        (BatteryFabricationDate, true) => fields(rvd::NEW_BATTERY_FAB_DATE, None),
        (BatteryInstallDate, false) => fields(rvd::BATTERY_INSTALL_DATE, Some(rvd::BATTERY_INSTALL_DATE_RELEVE)),
        (BatteryInstallDate, true) => fields(rvd::NEW_BATTERY_INSTALL_DATE, None),
        (BatteryLevel, false) => fields(rvd::BATTERY_LEVEL, None),
        (BatteryLevel, true) => fields(rvd::NEW_BATTERY_LEVEL, None),

        (AdultSerial, false) => fields(rvd::ADULT_SERIAL, Some(rvd::ADULT_SERIAL_RELEVE)),
        (AdultSerial, true) => fields(rvd::NEW_ADULT_SERIAL, None),
        (AdultExpiry, false) => fields(rvd::ADULT_EXPIRY, Some(rvd::ADULT_EXPIRY_RELEVE)),
        (AdultExpiry, true) => fields(rvd::NEW_ADULT_EXPIRY, None),

        (PediatricSerial, false) => fields(rvd::PEDIATRIC_SERIAL, Some(rvd::PEDIATRIC_SERIAL_RELEVE)),
        (PediatricSerial, true) => fields(rvd::NEW_PEDIATRIC_SERIAL, None),
        (PediatricExpiry, false) => fields(rvd::PEDIATRIC_EXPIRY, Some(rvd::PEDIATRIC_EXPIRY_RELEVE)),
        (PediatricExpiry, true) => fields(rvd::NEW_PEDIATRIC_EXPIRY, None),
    }
}

/// Device report fields, in preference order. Empty when the report does
/// not carry the value.
pub fn aed_fields(field: LogicalField, generation: DeviceGeneration) -> &'static [&'static str] {
    use DeviceGeneration::{G3, G5};
    use LogicalField::*;
    match (field, generation) {
        (DefibSerial, G5) => &[aed_g5::SERIAL],
        (DefibSerial, G3) => &[aed_g3::SERIAL],
        (ReportDate, G5) => &[aed_g5::REPORT_DATE],
        (ReportDate, G3) => &[aed_g3::INSTALL_DATE, aed_g3::COMMISSIONING_DATE],
        (BatterySerial, G5) => &[aed_g5::BATTERY_SERIAL],
        (BatterySerial, G3) => &[aed_g3::LOT_NUMBER],
        (BatteryInstallDate, G5) => &[aed_g5::INSTALL_DATE],
        (BatteryInstallDate, G3) => &[aed_g3::COMMISSIONING_DATE],
        (BatteryLevel, G5) => &[aed_g5::BATTERY_REMAINING],
        (BatteryLevel, G3) => &[aed_g3::BATTERY_PERCENT],
        (DefibFabricationDate | BatteryFabricationDate, _) => &[],
        (AdultSerial | AdultExpiry | PediatricSerial | PediatricExpiry, _) => &[],
    }
}

/// The photograph, and the part of its label, that carries the field.
pub fn image_field(field: LogicalField) -> Option<(EquipmentClass, ImageAttr)> {
    use LogicalField::*;
    match field {
        DefibSerial => Some((EquipmentClass::Defibrillator, ImageAttr::Serial)),
        DefibFabricationDate => Some((EquipmentClass::Defibrillator, ImageAttr::Date)),
        BatterySerial => Some((EquipmentClass::Battery, ImageAttr::Serial)),
        BatteryFabricationDate => Some((EquipmentClass::Battery, ImageAttr::Date)),
        AdultSerial | PediatricSerial => Some((EquipmentClass::Electrodes, ImageAttr::Serial)),
        AdultExpiry | PediatricExpiry => Some((EquipmentClass::Electrodes, ImageAttr::Date)),
        ReportDate | BatteryInstallDate | BatteryLevel => None,
    }
}
