use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::birth_date::{normalize_birth_date, BirthDateInput};
use crate::auth::CompanyId;
use crate::storage::PhotoRef;

/// Identifier wrapper for roster entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuideId(pub String);

/// Roster entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideType {
    Guide,
    TourConductor,
}

impl GuideType {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "guide" => Some(Self::Guide),
            "tour_conductor" => Some(Self::TourConductor),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Guide => "guide",
            Self::TourConductor => "tour_conductor",
        }
    }

    pub const fn korean_label(self) -> &'static str {
        match self {
            Self::Guide => "가이드",
            Self::TourConductor => "인솔자",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub const fn korean_label(self) -> &'static str {
        match self {
            Self::Male => "남성",
            Self::Female => "여성",
        }
    }
}

/// Messenger services guides can be reached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessengerKind {
    Kakao,
    Line,
    Whatsapp,
    Telegram,
    Wechat,
}

impl MessengerKind {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "kakao" => Some(Self::Kakao),
            "line" => Some(Self::Line),
            "whatsapp" => Some(Self::Whatsapp),
            "telegram" => Some(Self::Telegram),
            "wechat" => Some(Self::Wechat),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
            Self::Line => "line",
            Self::Whatsapp => "whatsapp",
            Self::Telegram => "telegram",
            Self::Wechat => "wechat",
        }
    }
}

/// Raw single-entry submission as received from the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideSubmission {
    #[serde(rename = "type")]
    pub guide_type: String,
    pub name_ko: String,
    pub name_en_last: String,
    pub name_en_first: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub messenger_type: Option<String>,
    #[serde(default)]
    pub messenger_id: Option<String>,
}

/// A validated roster entry ready to persist.
///
/// Required fields are trimmed and non-empty; absent optionals are `None`,
/// never an empty string. `birth_date` is the canonical `YYYY-MM-DD` string.
/// The bulk import path only shape-checks it, so a stored value is not
/// guaranteed to name a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideDraft {
    pub guide_type: GuideType,
    pub name_ko: String,
    pub name_en_last: String,
    pub name_en_first: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub messenger_type: Option<MessengerKind>,
    pub messenger_id: Option<String>,
    pub photo: Option<PhotoRef>,
    pub is_active: bool,
}

impl GuideDraft {
    /// Validate a single-entry submission into a draft.
    ///
    /// Unlike the bulk path this runs the full birth date normalization, so a
    /// half-typed date is rejected here instead of being persisted.
    pub fn from_submission(submission: GuideSubmission) -> Result<Self, GuideValidationError> {
        let guide_type = required(&submission.guide_type, "구분")?;
        let guide_type =
            GuideType::from_label(&guide_type).ok_or(GuideValidationError::TypeInvalid)?;

        let name_ko = required(&submission.name_ko, "한글명")?;
        let name_en_last = required(&submission.name_en_last, "영문성")?.to_uppercase();
        let name_en_first = required(&submission.name_en_first, "영문명")?.to_uppercase();

        let gender = match optional(submission.gender.as_deref()) {
            Some(raw) => {
                Some(Gender::from_label(&raw).ok_or(GuideValidationError::GenderInvalid)?)
            }
            None => None,
        };

        let birth_date = match optional(submission.birth_date.as_deref()) {
            Some(raw) => match normalize_birth_date(&raw) {
                Ok(BirthDateInput::Normalized(date)) => Some(super::birth_date::from_calendar(date)),
                Ok(BirthDateInput::Pending(_)) => {
                    return Err(GuideValidationError::BirthDateIncomplete)
                }
                Err(err) => return Err(GuideValidationError::BirthDate(err.to_string())),
            },
            None => None,
        };

        let email = match optional(submission.email.as_deref()) {
            Some(raw) => {
                if is_valid_email(&raw) {
                    Some(raw)
                } else {
                    return Err(GuideValidationError::EmailInvalid);
                }
            }
            None => None,
        };

        let messenger_type = match optional(submission.messenger_type.as_deref()) {
            Some(raw) => Some(
                MessengerKind::from_label(&raw).ok_or(GuideValidationError::MessengerInvalid)?,
            ),
            None => None,
        };

        Ok(Self {
            guide_type,
            name_ko,
            name_en_last,
            name_en_first,
            gender,
            birth_date,
            email,
            messenger_type,
            messenger_id: optional(submission.messenger_id.as_deref()),
            photo: None,
            is_active: true,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, GuideValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GuideValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
        .is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuideValidationError {
    #[error("{0}은(는) 필수 항목입니다")]
    Required(&'static str),
    #[error("구분은 guide 또는 tour_conductor만 가능합니다")]
    TypeInvalid,
    #[error("성별은 male 또는 female만 가능합니다")]
    GenderInvalid,
    #[error("생년월일 형식을 확인해주세요")]
    BirthDateIncomplete,
    #[error("{0}")]
    BirthDate(String),
    #[error("올바른 이메일 형식이 아닙니다")]
    EmailInvalid,
    #[error("메신저유형은 kakao, line, whatsapp, telegram, wechat 중 하나여야 합니다")]
    MessengerInvalid,
}

/// Persisted roster row. Mutated only through the owning company's actions;
/// removal is a hard delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideRecord {
    pub id: GuideId,
    pub owner: CompanyId,
    pub guide: GuideDraft,
    pub created_at: NaiveDateTime,
}

/// Read-model for listings: the opaque photo reference is resolved into a
/// time-limited URL (or nothing, if resolution fails) at view time.
#[derive(Debug, Clone, Serialize)]
pub struct GuideView {
    pub id: String,
    #[serde(rename = "type")]
    pub guide_type: &'static str,
    pub name_ko: String,
    pub name_en_last: String,
    pub name_en_first: String,
    pub gender: Option<&'static str>,
    pub birth_date: Option<String>,
    pub email: Option<String>,
    pub messenger_type: Option<&'static str>,
    pub messenger_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub is_active: bool,
}

impl GuideView {
    pub fn from_record(record: &GuideRecord, photo_url: Option<String>) -> Self {
        Self {
            id: record.id.0.clone(),
            guide_type: record.guide.guide_type.label(),
            name_ko: record.guide.name_ko.clone(),
            name_en_last: record.guide.name_en_last.clone(),
            name_en_first: record.guide.name_en_first.clone(),
            gender: record.guide.gender.map(Gender::label),
            birth_date: record.guide.birth_date.clone(),
            email: record.guide.email.clone(),
            messenger_type: record.guide.messenger_type.map(MessengerKind::label),
            messenger_id: record.guide.messenger_id.clone(),
            photo_url,
            is_active: record.guide.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> GuideSubmission {
        GuideSubmission {
            guide_type: "guide".to_string(),
            name_ko: "홍길동".to_string(),
            name_en_last: "hong".to_string(),
            name_en_first: "gildong".to_string(),
            gender: Some("male".to_string()),
            birth_date: Some("19900101".to_string()),
            email: Some("hong@example.com".to_string()),
            messenger_type: Some("kakao".to_string()),
            messenger_id: Some("hong123".to_string()),
        }
    }

    #[test]
    fn submission_normalizes_names_and_birth_date() {
        let draft = GuideDraft::from_submission(submission()).expect("valid submission");
        assert_eq!(draft.guide_type, GuideType::Guide);
        assert_eq!(draft.name_en_last, "HONG");
        assert_eq!(draft.name_en_first, "GILDONG");
        assert_eq!(draft.birth_date.as_deref(), Some("1990-01-01"));
        assert!(draft.is_active);
        assert!(draft.photo.is_none());
    }

    #[test]
    fn blank_optionals_become_none_not_empty_strings() {
        let mut raw = submission();
        raw.gender = Some("  ".to_string());
        raw.email = Some(String::new());
        raw.messenger_type = None;
        raw.messenger_id = Some(" ".to_string());
        raw.birth_date = None;

        let draft = GuideDraft::from_submission(raw).expect("valid submission");
        assert_eq!(draft.gender, None);
        assert_eq!(draft.email, None);
        assert_eq!(draft.messenger_type, None);
        assert_eq!(draft.messenger_id, None);
        assert_eq!(draft.birth_date, None);
    }

    #[test]
    fn missing_required_fields_are_reported_by_label() {
        let mut raw = submission();
        raw.name_ko = "   ".to_string();
        let error = GuideDraft::from_submission(raw).expect_err("name required");
        assert_eq!(error, GuideValidationError::Required("한글명"));
    }

    #[test]
    fn half_typed_birth_date_is_rejected_at_submit() {
        let mut raw = submission();
        raw.birth_date = Some("19900".to_string());
        let error = GuideDraft::from_submission(raw).expect_err("incomplete date");
        assert_eq!(error, GuideValidationError::BirthDateIncomplete);
    }

    #[test]
    fn unknown_enumeration_values_are_rejected() {
        let mut raw = submission();
        raw.guide_type = "driver".to_string();
        assert_eq!(
            GuideDraft::from_submission(raw).expect_err("bad type"),
            GuideValidationError::TypeInvalid
        );

        let mut raw = submission();
        raw.messenger_type = Some("signal".to_string());
        assert_eq!(
            GuideDraft::from_submission(raw).expect_err("bad messenger"),
            GuideValidationError::MessengerInvalid
        );
    }
}
