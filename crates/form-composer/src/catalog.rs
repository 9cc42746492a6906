//! Enumerated field catalog
//!
//! Every field the composer renders is declared here with its rendering
//! class and, for absolute-position fields, its coordinates. The positions
//! are a compatibility contract with the printed template grid; they are
//! design constants, not configuration.

/// How one field is rendered onto the template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    /// Filled through the named AcroForm field.
    Text,
    /// One bordered cell per digit, as many cells as digits.
    BoxRun { x: f32, y: f32 },
    /// Always exactly seven cells, left-aligned, trailing cells blank.
    BoxFixed7 { x: f32, y: f32 },
    /// Six digits as two groups of three around a slash.
    BoxSlashPair { x: f32, y: f32 },
    /// `YYYY-MM-DD` as 4 + 2 + 2 cells with slashes between groups.
    BoxDate { x: f32, y: f32 },
    /// Shaped Arabic text drawn at an absolute position.
    Arabic {
        x: f32,
        y: f32,
        size: f32,
        duplicate_on_page_two: bool,
    },
}

/// A template field name and its rendering class.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding {
    pub name: &'static str,
    pub binding: Binding,
}

/// Historical alias for the company insurance number field. It is honored
/// when skipping form fill, but the value renders only once.
pub const COMPANY_INSURANCE_ALIAS: &str = "CompanyInsuranceNumber";

pub const CATALOG: &[FieldBinding] = &[
    FieldBinding {
        name: "Title",
        binding: Binding::Text,
    },
    FieldBinding {
        name: "address",
        binding: Binding::Text,
    },
    FieldBinding {
        name: "endDate",
        binding: Binding::Text,
    },
    FieldBinding {
        name: "nationalId",
        binding: Binding::BoxRun { x: 275.0, y: 550.0 },
    },
    FieldBinding {
        name: "insuranceNumber",
        binding: Binding::BoxRun { x: 365.0, y: 575.0 },
    },
    FieldBinding {
        name: "companyInsuranceNumber",
        binding: Binding::BoxRun { x: 400.0, y: 665.0 },
    },
    FieldBinding {
        name: "basicSalaryInEnglish",
        binding: Binding::BoxFixed7 { x: 5.0, y: 387.0 },
    },
    FieldBinding {
        name: "ContributionSalary",
        binding: Binding::BoxFixed7 { x: 191.5, y: 387.5 },
    },
    FieldBinding {
        name: "TitleCode",
        binding: Binding::BoxSlashPair { x: 246.0, y: 492.0 },
    },
    FieldBinding {
        name: "startDate",
        binding: Binding::BoxDate { x: 300.0, y: 462.0 },
    },
    FieldBinding {
        name: "companyNameInArabic",
        binding: Binding::Arabic {
            x: 480.0,
            y: 650.0,
            size: 14.0,
            duplicate_on_page_two: true,
        },
    },
    FieldBinding {
        name: "employeeNameInArabic",
        binding: Binding::Arabic {
            x: 410.0,
            y: 525.0,
            size: 14.0,
            duplicate_on_page_two: false,
        },
    },
    FieldBinding {
        name: "titleInArabic",
        binding: Binding::Arabic {
            x: 80.0,
            y: 495.0,
            size: 12.0,
            duplicate_on_page_two: false,
        },
    },
    FieldBinding {
        name: "educationInArabic",
        binding: Binding::Arabic {
            x: 485.0,
            y: 495.0,
            size: 13.0,
            duplicate_on_page_two: false,
        },
    },
    FieldBinding {
        name: "addressInArabic",
        binding: Binding::Arabic {
            x: 100.0,
            y: 620.0,
            size: 12.0,
            duplicate_on_page_two: false,
        },
    },
    FieldBinding {
        name: "companyTaxNumber",
        binding: Binding::Arabic {
            x: 60.0,
            y: 650.0,
            size: 11.0,
            duplicate_on_page_two: true,
        },
    },
];

/// Whether a field must never be filled through the form because a box
/// layout renders it instead.
pub fn is_box_rendered(name: &str) -> bool {
    if name == COMPANY_INSURANCE_ALIAS {
        return true;
    }
    CATALOG.iter().any(|f| {
        f.name == name
            && matches!(
                f.binding,
                Binding::BoxRun { .. }
                    | Binding::BoxFixed7 { .. }
                    | Binding::BoxSlashPair { .. }
                    | Binding::BoxDate { .. }
            )
    })
}

/// Structured result of checking the catalog against a template's
/// declared field names.
#[derive(Debug, Default, Clone)]
pub struct CatalogDiagnostics {
    /// Catalog entries the template does not declare.
    pub missing_in_template: Vec<&'static str>,
    /// Template fields no catalog entry binds.
    pub unbound_in_template: Vec<String>,
}

impl CatalogDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.missing_in_template.is_empty() && self.unbound_in_template.is_empty()
    }
}

/// Check the catalog against the template's declared fields.
///
/// Arabic bindings are drawn at absolute positions, not through form
/// fields, so they are not expected in the template. The legacy casing
/// alias counts as bound.
pub fn validate(template_fields: &[String]) -> CatalogDiagnostics {
    let mut diag = CatalogDiagnostics::default();

    for entry in CATALOG {
        if matches!(entry.binding, Binding::Arabic { .. }) {
            continue;
        }
        if !template_fields.iter().any(|f| f == entry.name) {
            diag.missing_in_template.push(entry.name);
        }
    }

    for field in template_fields {
        let bound = field == COMPANY_INSURANCE_ALIAS
            || CATALOG.iter().any(|entry| entry.name == field);
        if !bound {
            diag.unbound_in_template.push(field.clone());
        }
    }

    diag
}
