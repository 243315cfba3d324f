//! Field names shared by the extractors and the reconciliation engine.
//!
//! These are the labels exactly as they are printed on the source documents;
//! extracted documents are keyed by them.

/// Inspection form (RVD) labels.
pub mod rvd {
    pub const COMMENT: &str = "Commentaire fin d'intervention et recommandations";
    pub const REPORT_DATE: &str = "Date-Heure rapport vérification défibrillateur";
    pub const SITE_CODE: &str = "Code du site";

    pub const DEFIB_SERIAL: &str = "Numéro de série DEFIBRILLATEUR";
    pub const DEFIB_SERIAL_RELEVE: &str = "Numéro de série relevé";
    pub const DEFIB_FAB_DATE: &str = "Date fabrication DEFIBRILLATEUR";
    pub const DEFIB_FAB_DATE_RELEVE: &str = "Date fabrication relevée";

    pub const BATTERY_SERIAL: &str = "Numéro de série Batterie";
    pub const BATTERY_SERIAL_RELEVE: &str = "Numéro de série relevé 2";
    pub const BATTERY_FAB_DATE: &str = "Date fabrication BATTERIE";
    pub const BATTERY_FAB_DATE_RELEVE: &str = "Date fabrication BATTERIE relevée";
    pub const BATTERY_INSTALL_DATE: &str = "Date mise en service BATTERIE";
    pub const BATTERY_INSTALL_DATE_RELEVE: &str = "Date mise en service BATTERIE relevée";
    pub const BATTERY_LEVEL: &str = "Niveau de charge de la batterie en %";
    pub const BATTERY_CHANGED: &str = "Changement batterie";
    pub const NEW_BATTERY_SERIAL: &str = "N° série nouvelle batterie";
    pub const NEW_BATTERY_INSTALL_DATE: &str = "Date mise en service";
    pub const NEW_BATTERY_FAB_DATE: &str = "Date fabrication nouvelle batterie";
    pub const NEW_BATTERY_LEVEL: &str = "Niveau de charge nouvelle batterie";

    pub const ADULT_SERIAL: &str = "Numéro de série ELECTRODES ADULTES";
    pub const ADULT_SERIAL_RELEVE: &str = "Numéro de série ELECTRODES ADULTES relevé";
    pub const ADULT_EXPIRY: &str = "Date de péremption ELECTRODES ADULTES";
    pub const ADULT_EXPIRY_RELEVE: &str = "Date de péremption ELECTRODES ADULTES relevée";
    pub const ADULT_CHANGED: &str = "Changement électrodes adultes";
    pub const NEW_ADULT_SERIAL: &str = "N° série nouvelles électrodes";
    pub const NEW_ADULT_EXPIRY: &str = "Date péremption des nouvelles éléctrodes";

    pub const PEDIATRIC_SERIAL: &str = "Numéro de série ELECTRODES PEDIATRIQUES";
    pub const PEDIATRIC_SERIAL_RELEVE: &str = "Numéro de série ELECTRODES PEDIATRIQUES relevé";
    pub const PEDIATRIC_EXPIRY: &str = "Date de péremption ELECTRODES PEDIATRIQUES";
    pub const PEDIATRIC_EXPIRY_RELEVE: &str = "Date de péremption ELECTRODES PEDIATRIQUES relevée";
    pub const PEDIATRIC_CHANGED: &str = "Changement électrodes pédiatriques";
    pub const NEW_PEDIATRIC_SERIAL: &str = "N° série nouvelles électrodes pédiatriques";
    pub const NEW_PEDIATRIC_EXPIRY: &str = "Date péremption des nouvelles éléctrodes pédiatriques";
}

/// G5 device report labels.
pub mod aed_g5 {
    pub const SERIAL: &str = "N° série DAE";
    pub const BATTERY_SERIAL: &str = "N° série batterie";
    pub const BATTERY_REMAINING: &str = "Capacité restante de la batterie";
    pub const INSTALL_DATE: &str = "Date d'installation :";
    pub const ACTIVE_ERRORS: &str = "Rapport DAE - Erreurs en cours";
    pub const REPORT_DATE: &str = "Date / Heure:";
}

/// G3 device report labels, plus the two fields the parser derives.
pub mod aed_g3 {
    pub const SERIAL: &str = "Série DSA";
    pub const LAST_FAILURE: &str = "Dernier échec de DSA";
    pub const LOT_NUMBER: &str = "Numéro de lot";
    pub const COMMISSIONING_DATE: &str = "Date de mise en service";
    pub const BATTERY_INITIAL: &str = "Capacité initiale de la batterie 12V";
    pub const BATTERY_REMAINING: &str = "Capacité restante de la batterie 12V";
    pub const SELF_TEST: &str = "Autotest";

    /// Derived: remaining / initial capacity, two decimals.
    pub const BATTERY_PERCENT: &str = "Pourcentage de la batterie";
    /// Derived: timestamp of the last battery installation entry.
    pub const INSTALL_DATE: &str = "Date installation";
}

/// RVD values meaning "this equipment is not fitted", which suppress a
/// comparison instead of failing it.
pub const NOT_APPLICABLE_MARKERS: &[&str] = &[
    "électrodes rcp ?",
    "electrodes rcp ?",
    "non applicable",
    "sans objet",
    "non équipé",
    "non equipe",
];

pub fn is_not_applicable(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    NOT_APPLICABLE_MARKERS.iter().any(|m| lower == *m)
}

/// Form answers for the `Changement …` yes/no fields.
pub fn is_yes(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "oui" | "yes" | "o" | "x")
}
