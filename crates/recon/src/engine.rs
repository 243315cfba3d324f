use defibcheck_core::{is_not_applicable, DeviceGeneration, EquipmentClass, ExtractedDocument, ImageRecord};

use crate::config::{ChangeFlags, ToleranceConfig};
use crate::fields::{
    aed_fields, image_field, rvd_fields, FieldShape, ImageAttr, LogicalField, ADULT_ELECTRODE_FIELDS,
    BATTERY_FIELDS, DEFIBRILLATOR_FIELDS, PEDIATRIC_ELECTRODE_FIELDS,
};
use crate::matcher::{compare_battery_level, compare_dates, compare_serials};
use crate::model::{
    ComparisonRun, ElectrodesResult, FieldComparison, ReconInput, RunFailure, RunMeta, SectionResult, Source,
};

/// Compare every logical field across the form, the device report and the
/// photographs.
///
/// Pure: the same input always gives the same run. Only a missing form
/// stops the run; every other problem is recorded in the output.
pub fn reconcile(input: &ReconInput<'_>, tolerance: &ToleranceConfig) -> ComparisonRun {
    let mut meta = RunMeta {
        generation: input.generation,
        changes: input.changes,
        battery_tolerance_percent: tolerance.battery_percent,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        warnings: Vec::new(),
    };

    let Some(rvd) = input.rvd else {
        log::warn!("no inspection form, nothing to reconcile");
        return ComparisonRun {
            meta,
            failure: Some(RunFailure::MissingSource { role: "RVD".into() }),
            defibrillateur: SectionResult::new(),
            batterie: SectionResult::new(),
            electrodes: ElectrodesResult::default(),
        };
    };

    let aed = usable_report(input.aed, input.generation, &mut meta.warnings);
    let ctx = Context {
        rvd,
        aed,
        images: input.images,
        generation: input.generation,
        changes: input.changes,
        tolerance: tolerance.battery_percent,
    };

    let pediatriques = if input.changes.pediatric_electrodes {
        ctx.electrodes(&PEDIATRIC_ELECTRODE_FIELDS)
    } else {
        SectionResult::new()
    };

    ComparisonRun {
        meta,
        failure: None,
        defibrillateur: ctx.section(&DEFIBRILLATOR_FIELDS),
        batterie: ctx.section(&BATTERY_FIELDS),
        electrodes: ElectrodesResult {
            adultes: ctx.electrodes(&ADULT_ELECTRODE_FIELDS),
            pediatriques,
        },
    }
}

/// The device report, unless its parser gave up on it.
fn usable_report<'a>(
    aed: Option<&'a ExtractedDocument>,
    generation: DeviceGeneration,
    warnings: &mut Vec<String>,
) -> Option<&'a ExtractedDocument> {
    let Some(doc) = aed else {
        warnings.push("no device report; device values are N/A".into());
        return None;
    };
    if let Some(failure) = &doc.failure {
        log::warn!("device report unusable: {failure}");
        warnings.push(format!("device report could not be parsed: {failure}"));
        return None;
    }
    if doc.role.generation() != Some(generation) {
        warnings.push(format!("device report is {}, run is configured for {generation}", doc.role));
    }
    Some(doc)
}

struct Context<'a> {
    rvd: &'a ExtractedDocument,
    aed: Option<&'a ExtractedDocument>,
    images: &'a [ImageRecord],
    generation: DeviceGeneration,
    changes: ChangeFlags,
    tolerance: f64,
}

impl<'a> Context<'a> {
    fn section(&self, fields: &[LogicalField]) -> SectionResult {
        fields
            .iter()
            .map(|field| (field.key().to_string(), Some(self.compare(*field))))
            .collect()
    }

    /// The first field is the serial. When the form says that kind of pad
    /// is not fitted, every field of the section is suppressed.
    fn electrodes(&self, fields: &[LogicalField; 2]) -> SectionResult {
        let serial = fields[0];
        let variant = rvd_fields(serial, serial.changed(&self.changes));
        if self.rvd.get(variant.original).is_some_and(is_not_applicable) {
            log::debug!("{serial:?}: not fitted, comparison suppressed");
            return fields.iter().map(|f| (f.key().to_string(), None)).collect();
        }
        self.section(fields)
    }

    fn compare(&self, field: LogicalField) -> FieldComparison {
        match field.shape() {
            FieldShape::Level => {
                let variant = rvd_fields(field, field.changed(&self.changes));
                compare_battery_level(self.rvd.get(variant.original), self.aed_value(field), self.tolerance)
            }
            FieldShape::Serial => compare_serials(&self.gather(field)),
            FieldShape::Date => compare_dates(&self.gather(field)),
        }
    }

    /// Candidate values in source order. Sources that never carry the field
    /// are left out entirely.
    fn gather(&self, field: LogicalField) -> Vec<(Source, Option<&'a str>)> {
        let variant = rvd_fields(field, field.changed(&self.changes));
        let mut values = vec![(Source::Rvd, self.rvd.get(variant.original))];
        if let Some(releve) = variant.releve {
            values.push((Source::RvdReleve, self.rvd.get(releve)));
        }
        if !aed_fields(field, self.generation).is_empty() {
            values.push((Source::Aed, self.aed_value(field)));
        }
        if let Some((class, attr)) = image_field(field) {
            values.push((Source::Image, self.image_value(class, attr)));
        }
        values
    }

    fn aed_value(&self, field: LogicalField) -> Option<&'a str> {
        let doc = self.aed?;
        aed_fields(field, self.generation).iter().find_map(|name| doc.present(name))
    }

    /// First photograph of the class wins.
    fn image_value(&self, class: EquipmentClass, attr: ImageAttr) -> Option<&'a str> {
        let image = self.images.iter().find(|img| img.class == class)?;
        match attr {
            ImageAttr::Serial => image.serial.as_deref(),
            ImageAttr::Date => image.date.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
