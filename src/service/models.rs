use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ServiceError;

pub const DEFAULT_DEADLINE_DAYS: u32 = 14;
pub const MIN_DEADLINE_DAYS: u32 = 1;
pub const MAX_DEADLINE_DAYS: u32 = 90;

fn default_deadline_days() -> u32 {
    DEFAULT_DEADLINE_DAYS
}

/// Case details posted to the letter generation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandLetterRequest {
    pub client_name: String,
    pub opposing_party: String,
    pub legal_matter: String,
    pub date_of_incident: String,
    pub nature_of_dispute: String,
    pub damages_suffered: String,
    pub desired_resolution: String,
    #[serde(default = "default_deadline_days")]
    pub deadline_days: u32,
}

impl Default for DemandLetterRequest {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            opposing_party: String::new(),
            legal_matter: String::new(),
            date_of_incident: String::new(),
            nature_of_dispute: String::new(),
            damages_suffered: String::new(),
            desired_resolution: String::new(),
            deadline_days: DEFAULT_DEADLINE_DAYS,
        }
    }
}

impl DemandLetterRequest {
    /// Checks required fields and clamps the deadline into the accepted range.
    pub fn validated(mut self) -> Result<Self, ServiceError> {
        let required = [
            ("client_name", &self.client_name),
            ("opposing_party", &self.opposing_party),
            ("legal_matter", &self.legal_matter),
            ("date_of_incident", &self.date_of_incident),
            ("nature_of_dispute", &self.nature_of_dispute),
            ("damages_suffered", &self.damages_suffered),
            ("desired_resolution", &self.desired_resolution),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::InvalidRequest(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        self.deadline_days = self
            .deadline_days
            .clamp(MIN_DEADLINE_DAYS, MAX_DEADLINE_DAYS);
        Ok(self)
    }
}

/// Display-only details returned alongside a generated letter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterMetadata {
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub opposing_party: String,
    #[serde(default)]
    pub deadline_date: String,
    #[serde(default)]
    pub generated_at: String,
}

impl LetterMetadata {
    /// Parses `generated_at`, accepting RFC 3339 or a naive ISO timestamp
    /// (taken as UTC).
    pub fn generated_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.generated_at.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed);
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LetterMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    /// Splits a response into the letter and its metadata, turning failures
    /// into errors.
    pub fn into_letter(self) -> Result<(String, Option<LetterMetadata>), ServiceError> {
        if !self.success {
            return Err(ServiceError::Rejected(
                self.error
                    .unwrap_or_else(|| "generation service reported a failure".to_string()),
            ));
        }
        let letter = self.demand_letter.ok_or(ServiceError::MissingLetter)?;
        Ok((letter, self.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn complete_request() -> DemandLetterRequest {
        DemandLetterRequest {
            client_name: "ABC Corporation".into(),
            opposing_party: "XYZ Company".into(),
            legal_matter: "breach of contract".into(),
            date_of_incident: "2024-05-01".into(),
            nature_of_dispute: "Goods were never delivered.".into(),
            damages_suffered: "$50,000 in lost revenue".into(),
            desired_resolution: "Payment of $50,000".into(),
            deadline_days: 14,
        }
    }

    #[test]
    fn deadline_defaults_to_fourteen_days() {
        let json = r#"{
            "client_name": "a", "opposing_party": "b", "legal_matter": "c",
            "date_of_incident": "d", "nature_of_dispute": "e",
            "damages_suffered": "f", "desired_resolution": "g"
        }"#;
        let request: DemandLetterRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.deadline_days, 14);
        assert_eq!(DemandLetterRequest::default().deadline_days, 14);
    }

    #[test]
    fn validation_clamps_deadline() {
        let long = DemandLetterRequest {
            deadline_days: 365,
            ..complete_request()
        };
        let zero = DemandLetterRequest {
            deadline_days: 0,
            ..complete_request()
        };

        assert_eq!(long.validated().unwrap().deadline_days, 90);
        assert_eq!(zero.validated().unwrap().deadline_days, 1);
    }

    #[test]
    fn validation_lists_blank_required_fields() {
        let request = DemandLetterRequest {
            client_name: "  ".into(),
            legal_matter: String::new(),
            ..complete_request()
        };

        match request.validated() {
            Err(ServiceError::InvalidRequest(message)) => {
                assert!(message.contains("client_name"));
                assert!(message.contains("legal_matter"));
                assert!(!message.contains("opposing_party"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parses_successful_response() {
        let json = r#"{
            "success": true,
            "demand_letter": "Dear XYZ,\n\nPay up.",
            "metadata": {
                "client": "ABC",
                "opposing_party": "XYZ",
                "deadline_date": "2024-06-01",
                "generated_at": "2024-05-18T10:30:00.123456"
            }
        }"#;
        let response: GenerationResponse = serde_json::from_str(json).unwrap();
        let (letter, metadata) = response.into_letter().unwrap();
        let metadata = metadata.expect("metadata");

        assert_eq!(letter, "Dear XYZ,\n\nPay up.");
        let generated = metadata.generated_at().expect("timestamp");
        assert_eq!((generated.year(), generated.month(), generated.day()), (2024, 5, 18));
        assert_eq!(generated.hour(), 10);
    }

    #[test]
    fn accepts_rfc3339_timestamps() {
        let metadata = LetterMetadata {
            generated_at: "2024-05-18T10:30:00+02:00".into(),
            ..LetterMetadata::default()
        };

        assert_eq!(
            metadata.generated_at().map(|t| t.offset().local_minus_utc()),
            Some(7200)
        );
        assert!(LetterMetadata::default().generated_at().is_none());
    }

    #[test]
    fn failed_response_carries_service_error() {
        let response: GenerationResponse =
            serde_json::from_str(r#"{"success": false, "error": "model overloaded"}"#).unwrap();

        match response.into_letter() {
            Err(ServiceError::Rejected(message)) => assert_eq!(message, "model overloaded"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_without_letter_is_an_error() {
        let response = GenerationResponse {
            success: true,
            ..GenerationResponse::default()
        };

        assert!(matches!(
            response.into_letter(),
            Err(ServiceError::MissingLetter)
        ));
    }
}
