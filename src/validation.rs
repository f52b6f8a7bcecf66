//! Request validation shared by the session routes.

use crate::constants::{MAX_SESSION_MINUTES, MIN_SESSION_MINUTES};
use crate::pose::types::BodyPart;
use crate::response::AppError;

/// Parses body-part names, keeping first-seen order and dropping duplicates.
/// Unknown names are rejected as a whole.
pub fn parse_body_parts(raw: &[String]) -> Result<Vec<BodyPart>, AppError> {
    let mut parts = Vec::with_capacity(raw.len());
    for name in raw {
        let part: BodyPart = name
            .parse()
            .map_err(|e: crate::pose::types::UnknownBodyPart| {
                AppError::bad_request("UNKNOWN_BODY_PART", &e.to_string())
            })?;
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    Ok(parts)
}

pub fn validate_duration_minutes(minutes: f64) -> Result<f64, AppError> {
    if !minutes.is_finite() || !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&minutes) {
        return Err(AppError::bad_request(
            "INVALID_DURATION",
            "durationMinutes must be a number between 10 and 90",
        ));
    }
    Ok(minutes)
}

/// Session ids are uuid v4 strings; anything else can never match.
pub fn is_valid_session_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn body_parts_accept_aliases_and_dedupe() {
        let parts = parse_body_parts(&strings(&["knee", "Knees", "lower-back", "hamstring"])).unwrap();
        assert_eq!(
            parts,
            vec![BodyPart::Knees, BodyPart::LowerBack, BodyPart::Hamstrings]
        );
    }

    #[test]
    fn unknown_body_part_is_rejected() {
        let err = parse_body_parts(&strings(&["neck", "elbow"])).unwrap_err();
        assert_eq!(err.code, "UNKNOWN_BODY_PART");
        assert!(err.message.contains("elbow"));
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(validate_duration_minutes(10.0).is_ok());
        assert!(validate_duration_minutes(90.0).is_ok());
        assert!(validate_duration_minutes(9.99).is_err());
        assert!(validate_duration_minutes(90.5).is_err());
        assert_eq!(
            validate_duration_minutes(f64::NAN).unwrap_err().code,
            "INVALID_DURATION"
        );
    }

    #[test]
    fn session_ids_must_be_uuids() {
        assert!(is_valid_session_id("6f1c2a4e-3b7d-4c1e-9a2f-0d8e5b6c7a91"));
        assert!(!is_valid_session_id("created:00000000000000000001:x"));
        assert!(!is_valid_session_id(""));
    }
}
