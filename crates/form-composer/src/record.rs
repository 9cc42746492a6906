//! Employee record input type

use serde::{Deserialize, Serialize};

/// One employee record, deserialized from the legacy camelCase wire format.
///
/// Every field is optional; composition skips what is absent. The legacy
/// payload spells several Latin fields with an `InEnglish` suffix and the
/// job code as `jobTitleCode`; those spellings are accepted alongside the
/// short names. Some legacy fields (`employeeName`, `education`) are
/// accepted for compatibility but only their Arabic counterparts are
/// rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeRecord {
    #[serde(alias = "titleInEnglish")]
    pub title: Option<String>,
    #[serde(alias = "addressInEnglish")]
    pub address: Option<String>,
    pub end_date: Option<String>,

    pub national_id: Option<String>,
    pub insurance_number: Option<String>,
    pub company_insurance_number: Option<String>,
    pub basic_salary_in_english: Option<String>,
    pub contribution_salary: Option<String>,
    #[serde(rename = "jobTitleCode", alias = "titleCode")]
    pub title_code: Option<String>,
    pub start_date: Option<String>,

    pub company_name_in_arabic: Option<String>,
    pub employee_name_in_arabic: Option<String>,
    pub title_in_arabic: Option<String>,
    pub education_in_arabic: Option<String>,
    pub address_in_arabic: Option<String>,
    pub company_tax_number: Option<String>,

    #[serde(alias = "employeeNameInEnglish")]
    pub employee_name: Option<String>,
    #[serde(alias = "educationInEnglish")]
    pub education: Option<String>,
}

impl EmployeeRecord {
    /// Value for a template field name, or None when absent or blank.
    ///
    /// Field names follow the template's casing, which differs from the
    /// record's wire casing for a few legacy fields.
    pub fn value(&self, field: &str) -> Option<&str> {
        let slot = match field {
            "Title" => &self.title,
            "address" => &self.address,
            "endDate" => &self.end_date,
            "nationalId" => &self.national_id,
            "insuranceNumber" => &self.insurance_number,
            "companyInsuranceNumber" | "CompanyInsuranceNumber" => {
                &self.company_insurance_number
            }
            "basicSalaryInEnglish" => &self.basic_salary_in_english,
            "ContributionSalary" => &self.contribution_salary,
            "TitleCode" => &self.title_code,
            "startDate" => &self.start_date,
            "companyNameInArabic" => &self.company_name_in_arabic,
            "employeeNameInArabic" => &self.employee_name_in_arabic,
            "titleInArabic" => &self.title_in_arabic,
            "educationInArabic" => &self.education_in_arabic,
            "addressInArabic" => &self.address_in_arabic,
            "companyTaxNumber" => &self.company_tax_number,
            _ => return None,
        };
        slot.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "nationalId": "12345678901234",
            "companyInsuranceNumber": "987654",
            "basicSalaryInEnglish": "3500",
            "startDate": "2023-06-01",
            "companyNameInArabic": "شركة النور"
        }"#;

        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.national_id.as_deref(), Some("12345678901234"));
        assert_eq!(record.company_insurance_number.as_deref(), Some("987654"));
        assert_eq!(record.value("startDate"), Some("2023-06-01"));
    }

    #[test]
    fn test_legacy_wire_names() {
        let json = r#"{
            "jobTitleCode": "123456",
            "titleInEnglish": "Engineer",
            "addressInEnglish": "12 Nile St",
            "employeeNameInEnglish": "Mona",
            "educationInEnglish": "BSc"
        }"#;

        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value("TitleCode"), Some("123456"));
        assert_eq!(record.value("Title"), Some("Engineer"));
        assert_eq!(record.value("address"), Some("12 Nile St"));
        assert_eq!(record.employee_name.as_deref(), Some("Mona"));
        assert_eq!(record.education.as_deref(), Some("BSc"));
    }

    #[test]
    fn test_short_wire_names_still_accepted() {
        let json = r#"{"titleCode": "42", "title": "Clerk"}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value("TitleCode"), Some("42"));
        assert_eq!(record.value("Title"), Some("Clerk"));
    }

    #[test]
    fn test_unknown_json_fields_ignored() {
        let json = r#"{"title": "Engineer", "salaryTaxBracket": 3}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value("Title"), Some("Engineer"));
    }

    #[test]
    fn test_value_template_casing() {
        let record = EmployeeRecord {
            title_code: Some("12".into()),
            contribution_salary: Some("2000".into()),
            company_insurance_number: Some("42".into()),
            ..Default::default()
        };
        assert_eq!(record.value("TitleCode"), Some("12"));
        assert_eq!(record.value("ContributionSalary"), Some("2000"));
        // both historical casings resolve to the same value
        assert_eq!(record.value("companyInsuranceNumber"), Some("42"));
        assert_eq!(record.value("CompanyInsuranceNumber"), Some("42"));
    }

    #[test]
    fn test_blank_values_are_absent() {
        let record = EmployeeRecord {
            title: Some("   ".into()),
            address: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(record.value("Title"), None);
        assert_eq!(record.value("address"), None);
        assert_eq!(record.value("noSuchField"), None);
    }
}
