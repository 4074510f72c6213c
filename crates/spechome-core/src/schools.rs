//! Property details and school-district lookup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

const ELEMENTARY_LEVEL: &str = "Elementary";
const UNKNOWN_DISTRICT: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct School {
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub name: Option<String>,
    /// Grade band as reported upstream, e.g. `"Elementary"` or `"High"`.
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_opt")]
    pub district: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub rating: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl School {
    fn district_or_name(&self) -> String {
        self.district
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
            .to_owned()
    }
}

/// Detail record for a single property. Only `schools` is interpreted; the
/// rest of the payload is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(default, deserialize_with = "lenient::vec_of")]
    pub schools: Vec<School>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolDistrict {
    pub district_name: String,
    pub elementary: Option<String>,
    pub rating: Option<f64>,
}

/// Schools near one property together with its resolved district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchools {
    pub zpid: String,
    pub schools: Vec<School>,
    pub school_district: SchoolDistrict,
}

impl PropertySchools {
    #[must_use]
    pub fn from_details(zpid: impl Into<String>, details: PropertyDetails) -> Self {
        let school_district = extract_school_district(&details);
        Self {
            zpid: zpid.into(),
            schools: details.schools,
            school_district,
        }
    }
}

/// Pick the school district for a property.
///
/// The first elementary school wins. Without one, the first listed school
/// supplies the district and rating but `elementary` stays empty. With no
/// schools at all the district is `"Unknown"`.
#[must_use]
pub fn extract_school_district(details: &PropertyDetails) -> SchoolDistrict {
    if let Some(school) = details
        .schools
        .iter()
        .find(|s| s.level.as_deref() == Some(ELEMENTARY_LEVEL))
    {
        return SchoolDistrict {
            district_name: school.district_or_name(),
            elementary: school.name.clone(),
            rating: school.rating,
        };
    }

    match details.schools.first() {
        Some(school) => SchoolDistrict {
            district_name: school.district_or_name(),
            elementary: None,
            rating: school.rating,
        },
        None => SchoolDistrict {
            district_name: UNKNOWN_DISTRICT.to_owned(),
            elementary: None,
            rating: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(value: serde_json::Value) -> PropertyDetails {
        serde_json::from_value(value).expect("details")
    }

    #[test]
    fn elementary_school_district_is_preferred() {
        let d = details(json!({
            "schools": [
                { "name": "Hinsdale Central", "level": "High", "district": "HCHS 86", "rating": 9 },
                { "name": "Monroe Elementary", "level": "Elementary", "district": "District 181", "rating": "8" }
            ]
        }));
        let district = extract_school_district(&d);
        assert_eq!(district.district_name, "District 181");
        assert_eq!(district.elementary.as_deref(), Some("Monroe Elementary"));
        assert_eq!(district.rating, Some(8.0));
    }

    #[test]
    fn elementary_without_district_falls_back_to_school_name() {
        let d = details(json!({
            "schools": [{ "name": "Prospect", "level": "Elementary", "district": "" }]
        }));
        let district = extract_school_district(&d);
        assert_eq!(district.district_name, "Prospect");
        assert_eq!(district.elementary.as_deref(), Some("Prospect"));
        assert_eq!(district.rating, None);
    }

    #[test]
    fn first_school_used_when_no_elementary() {
        let d = details(json!({
            "schools": [
                { "name": "Herrick Middle", "level": "Middle", "district": "District 58", "rating": 7 },
                { "name": "North High", "level": "High", "district": "District 99" }
            ]
        }));
        let district = extract_school_district(&d);
        assert_eq!(district.district_name, "District 58");
        assert_eq!(district.elementary, None);
        assert_eq!(district.rating, Some(7.0));
    }

    #[test]
    fn level_match_is_exact() {
        let d = details(json!({
            "schools": [{ "name": "Lowercase", "level": "elementary", "district": "D1" }]
        }));
        let district = extract_school_district(&d);
        assert_eq!(district.district_name, "D1");
        assert_eq!(district.elementary, None);
    }

    #[test]
    fn no_schools_is_unknown() {
        let district = extract_school_district(&details(json!({ "zpid": 123 })));
        assert_eq!(
            district,
            SchoolDistrict {
                district_name: "Unknown".to_owned(),
                elementary: None,
                rating: None,
            }
        );
    }

    #[test]
    fn unexpected_schools_shape_reads_as_no_schools() {
        let d = details(json!({ "schools": "n/a", "bedrooms": 4 }));
        assert!(d.schools.is_empty());
        assert_eq!(d.extra.get("bedrooms"), Some(&json!(4)));
        assert_eq!(extract_school_district(&d).district_name, "Unknown");
    }
}
