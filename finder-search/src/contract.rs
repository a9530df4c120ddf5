//! The request/response contract with the extraction service.
//!
//! Builds the natural-language prompt and the declared response schema
//! for one [`SearchItem`], and turns the service's JSON text into a
//! [`CollegeRecord`] with explicit per-field defaulting.
//!
//! Parsing is strict about shape (the reply must contain a JSON object)
//! and lenient about field contents: absent, blank, or wrongly typed
//! string fields become [`NOT_AVAILABLE`], a missing or malformed
//! confidence score becomes 0.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::SearchError;
use crate::types::{Citation, CollegeRecord, SearchItem, NOT_AVAILABLE};

/// Every field the service is asked to return, in prompt order.
pub const FIELD_NAMES: [&str; 21] = [
    "collegeName",
    "state",
    "district",
    "universityAffiliation",
    "collegeType",
    "coursesOffered",
    "principalName",
    "principalContact",
    "principalEmail",
    "tpoName",
    "tpoContact",
    "tpoEmail",
    "officialWebsite",
    "aisheCode",
    "yearOfEstablishment",
    "accreditationDetails",
    "studentStrength",
    "facultyStrength",
    "address",
    "pinCode",
    "confidenceScore",
];

/// Fields the declared schema marks as required.
pub const REQUIRED_FIELDS: [&str; 3] = ["collegeName", "state", "confidenceScore"];

/// Title given to citations the service left untitled.
const DEFAULT_CITATION_TITLE: &str = "Source";

/// Build the extraction prompt for one item.
pub fn build_prompt(item: &SearchItem) -> String {
    let location = match item.district.as_deref() {
        Some(district) => format!("{}, {}, {}", item.name, district, item.state),
        None => format!("{}, {}", item.name, item.state),
    };
    let fields = FIELD_NAMES
        .iter()
        .map(|field| match *field {
            "coursesOffered" => "coursesOffered (array of strings)".to_owned(),
            "confidenceScore" => "confidenceScore (0-100)".to_owned(),
            other => other.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Find details for the Indian higher-education institution: {location}.\n\
         Provide a JSON object with these fields: {fields}.\n\
         Report only facts you found in published sources. Do not infer or guess any value.\n\
         Use \"{NOT_AVAILABLE}\" for every field you cannot verify.\n\
         Set confidenceScore to how certain you are that the record describes this institution."
    )
}

/// Declared response schema, in the service's OpenAPI-subset dialect.
pub fn response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    for field in FIELD_NAMES {
        let schema = match field {
            "coursesOffered" => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
            "confidenceScore" => json!({ "type": "NUMBER" }),
            _ => json!({ "type": "STRING" }),
        };
        properties.insert(field.to_owned(), schema);
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": REQUIRED_FIELDS,
    })
}

/// The reply as it arrives: every field optional and loosely typed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawCollegeRecord {
    college_name: Option<Value>,
    state: Option<Value>,
    district: Option<Value>,
    university_affiliation: Option<Value>,
    college_type: Option<Value>,
    courses_offered: Option<Value>,
    principal_name: Option<Value>,
    principal_contact: Option<Value>,
    principal_email: Option<Value>,
    tpo_name: Option<Value>,
    tpo_contact: Option<Value>,
    tpo_email: Option<Value>,
    official_website: Option<Value>,
    aishe_code: Option<Value>,
    year_of_establishment: Option<Value>,
    accreditation_details: Option<Value>,
    student_strength: Option<Value>,
    faculty_strength: Option<Value>,
    address: Option<Value>,
    pin_code: Option<Value>,
    confidence_score: Option<Value>,
}

impl RawCollegeRecord {
    fn into_record(self, item: &SearchItem) -> CollegeRecord {
        CollegeRecord {
            college_name: text_or(self.college_name, &item.name),
            state: text_or(self.state, &item.state),
            district: text_or(self.district, item.district_or_empty()),
            university_affiliation: text(self.university_affiliation),
            college_type: text(self.college_type),
            courses_offered: courses(self.courses_offered),
            principal_name: text(self.principal_name),
            principal_contact: text(self.principal_contact),
            principal_email: text(self.principal_email),
            tpo_name: text(self.tpo_name),
            tpo_contact: text(self.tpo_contact),
            tpo_email: text(self.tpo_email),
            official_website: text(self.official_website),
            aishe_code: text(self.aishe_code),
            year_of_establishment: text(self.year_of_establishment),
            accreditation_details: text(self.accreditation_details),
            student_strength: text(self.student_strength),
            faculty_strength: text(self.faculty_strength),
            address: text(self.address),
            pin_code: text(self.pin_code),
            confidence_score: confidence(self.confidence_score),
            sources: Vec::new(),
            error: None,
        }
    }
}

/// Parse the service's JSON text into a record for `item`.
///
/// Surrounding markdown fences or prose are tolerated. Citations are left
/// empty; the caller attaches them from grounding metadata.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the text holds no JSON object or the
/// object is not valid JSON.
pub fn parse_record(text: &str, item: &SearchItem) -> Result<CollegeRecord, SearchError> {
    let object = json_object_slice(text)
        .ok_or_else(|| SearchError::Parse("reply contains no JSON object".into()))?;
    let raw: RawCollegeRecord = serde_json::from_str(object)
        .map_err(|e| SearchError::Parse(format!("invalid record JSON: {e}")))?;
    Ok(raw.into_record(item))
}

/// Map raw (title, uri) pairs to citations.
///
/// Pairs whose URI is missing or not an absolute http(s) URL are dropped,
/// as are repeats of a URI already seen.
pub fn collect_citations<'a, I>(pairs: I) -> Vec<Citation>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter_map(|(title, uri)| {
            let uri = uri?.trim();
            let parsed = url::Url::parse(uri).ok()?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return None;
            }
            if !seen.insert(uri.to_owned()) {
                return None;
            }
            let title = title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_CITATION_TITLE);
            Some(Citation {
                title: title.to_owned(),
                uri: uri.to_owned(),
            })
        })
        .collect()
}

/// Locate the JSON object inside the reply text.
fn json_object_slice(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

fn text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn text_or(value: Option<Value>, fallback: &str) -> String {
    let value = text(value);
    if value == NOT_AVAILABLE && !fallback.trim().is_empty() {
        fallback.trim().to_owned()
    } else {
        value
    }
}

fn courses(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() && s.trim() != NOT_AVAILABLE => {
                    Some(s.trim().to_owned())
                }
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != NOT_AVAILABLE)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn confidence(value: Option<Value>) -> u8 {
    let Some(score) = value.as_ref().and_then(Value::as_f64) else {
        return 0;
    };
    if !score.is_finite() {
        return 0;
    }
    // Clamped to 0..=100 first, so the cast cannot truncate.
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> SearchItem {
        SearchItem::new("1", "IIT Delhi", "Delhi", Some("South Delhi".into()))
    }

    #[test]
    fn prompt_embeds_item_and_fields() {
        let prompt = build_prompt(&item());
        assert!(prompt.contains("IIT Delhi, South Delhi, Delhi"));
        for field in FIELD_NAMES {
            assert!(prompt.contains(field), "prompt missing {field}");
        }
        assert!(prompt.contains("Do not infer"));
        assert!(prompt.contains("\"Not Available\""));
    }

    #[test]
    fn prompt_omits_absent_district() {
        let item = SearchItem::new("1", "IIT Delhi", "Delhi", None);
        let prompt = build_prompt(&item);
        assert!(prompt.contains("IIT Delhi, Delhi."));
    }

    #[test]
    fn schema_declares_all_fields() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        let props = schema["properties"].as_object().expect("properties");
        assert_eq!(props.len(), FIELD_NAMES.len());
        assert_eq!(props["coursesOffered"]["type"], "ARRAY");
        assert_eq!(props["confidenceScore"]["type"], "NUMBER");
        assert_eq!(props["pinCode"]["type"], "STRING");
        assert_eq!(schema["required"], json!(["collegeName", "state", "confidenceScore"]));
    }

    #[test]
    fn parses_complete_record() {
        let text = r#"{
            "collegeName": "Indian Institute of Technology Delhi",
            "state": "Delhi",
            "district": "South Delhi",
            "collegeType": "Public",
            "coursesOffered": ["B.Tech", "M.Tech", "PhD"],
            "aisheCode": "U-0001",
            "pinCode": "110016",
            "confidenceScore": 92
        }"#;
        let record = parse_record(text, &item()).expect("parse");
        assert_eq!(record.college_name, "Indian Institute of Technology Delhi");
        assert_eq!(record.college_type, "Public");
        assert_eq!(record.courses_offered, vec!["B.Tech", "M.Tech", "PhD"]);
        assert_eq!(record.confidence_score, 92);
        assert_eq!(record.principal_name, NOT_AVAILABLE);
        assert!(record.error.is_none());
    }

    #[test]
    fn missing_and_malformed_fields_default() {
        let text = r#"{"collegeName": "", "tpoName": 42, "address": ["x"], "confidenceScore": "high"}"#;
        let record = parse_record(text, &item()).expect("parse");
        assert_eq!(record.college_name, "IIT Delhi");
        assert_eq!(record.state, "Delhi");
        assert_eq!(record.district, "South Delhi");
        assert_eq!(record.tpo_name, "42");
        assert_eq!(record.address, NOT_AVAILABLE);
        assert_eq!(record.confidence_score, 0);
        assert!(record.courses_offered.is_empty());
    }

    #[test]
    fn confidence_rounded_and_clamped() {
        let parse = |score: &str| {
            let text = format!(r#"{{"confidenceScore": {score}}}"#);
            parse_record(&text, &item()).expect("parse").confidence_score
        };
        assert_eq!(parse("87.6"), 88);
        assert_eq!(parse("140"), 100);
        assert_eq!(parse("-5"), 0);
    }

    #[test]
    fn fenced_json_is_accepted() {
        let text = "```json\n{\"collegeName\": \"IIT Delhi\", \"confidenceScore\": 75}\n```";
        let record = parse_record(text, &item()).expect("parse");
        assert_eq!(record.confidence_score, 75);
    }

    #[test]
    fn comma_separated_courses_are_split() {
        let text = r#"{"coursesOffered": "B.Sc, B.Com ,, Not Available"}"#;
        let record = parse_record(text, &item()).expect("parse");
        assert_eq!(record.courses_offered, vec!["B.Sc", "B.Com"]);
    }

    #[test]
    fn non_object_reply_is_parse_error() {
        let err = parse_record("I could not find that college.", &item()).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
        let err = parse_record("{not json}", &item()).unwrap_err();
        assert!(err.to_string().contains("invalid record JSON"));
    }

    #[test]
    fn citations_filter_unusable_uris() {
        let citations = collect_citations(vec![
            (Some("IIT Delhi"), Some("https://home.iitd.ac.in")),
            (None, Some("https://www.nirfindia.org/")),
            (Some("No uri"), None),
            (Some("Relative"), Some("#")),
            (Some("Mail"), Some("mailto:office@iitd.ac.in")),
            (Some("Repeat"), Some("https://home.iitd.ac.in")),
        ]);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "IIT Delhi");
        assert_eq!(citations[1].title, "Source");
        assert_eq!(citations[1].uri, "https://www.nirfindia.org/");
    }
}
