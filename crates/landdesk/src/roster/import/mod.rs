//! Bulk roster import: row filtering, per-field validation, and the
//! all-or-nothing gate. A single bad cell anywhere blocks the whole batch.

pub mod parser;
pub mod sample;

use std::io::Read;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain::{is_valid_email, Gender, GuideDraft, GuideType, MessengerKind};

pub use parser::parse_rows;
pub use sample::template_csv;

/// Rows whose first column starts with this marker carry instructional text
/// from the sample sheet and are never data.
pub const INSTRUCTION_MARKER: char = '※';

/// Reported row numbers are offset by one for the header row: the first data
/// row of the uploaded table is row 2.
const HEADER_ROW_OFFSET: u32 = 1;

/// One uploaded row, keyed by the sheet's column labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGuideRow {
    #[serde(rename = "구분", default)]
    pub guide_type: String,
    #[serde(rename = "한글명", default)]
    pub name_ko: String,
    #[serde(rename = "영문성", default)]
    pub name_en_last: String,
    #[serde(rename = "영문명", default)]
    pub name_en_first: String,
    #[serde(rename = "성별", default)]
    pub gender: String,
    #[serde(rename = "생년월일", default)]
    pub birth_date: String,
    #[serde(rename = "이메일", default)]
    pub email: String,
    #[serde(rename = "메신저유형", default)]
    pub messenger_type: String,
    #[serde(rename = "메신저ID", default)]
    pub messenger_id: String,
}

impl RawGuideRow {
    pub fn is_instruction(&self) -> bool {
        self.guide_type.trim_start().starts_with(INSTRUCTION_MARKER)
    }

    pub fn is_blank(&self) -> bool {
        self.columns().iter().all(|column| column.trim().is_empty())
    }

    fn columns(&self) -> [&str; 9] {
        [
            &self.guide_type,
            &self.name_ko,
            &self.name_en_last,
            &self.name_en_first,
            &self.gender,
            &self.birth_date,
            &self.email,
            &self.messenger_type,
            &self.messenger_id,
        ]
    }
}

/// A field-level validation failure. `row` is 0 for file-level problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowValidationError {
    pub row: u32,
    pub field: String,
    pub message: String,
}

impl RowValidationError {
    fn at(row: u32, field: &str, message: &str) -> Self {
        Self {
            row,
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn file_level(message: &str) -> Self {
        Self::at(0, "파일", message)
    }
}

/// Raised when the uploaded bytes cannot be parsed as a sheet at all.
#[derive(Debug, thiserror::Error)]
pub enum ImportFileError {
    #[error("파일을 읽을 수 없습니다")]
    Unreadable(#[from] csv::Error),
}

/// Validate uploaded rows into persistable drafts.
///
/// Instruction and all-blank rows are dropped first and count toward neither
/// errors nor output; the numbering of the remaining rows stays anchored to
/// their position in the uploaded table. Every field of every surviving row
/// is checked independently, so one row can report several errors. Any error
/// at all means no drafts are produced.
pub fn validate_rows(rows: &[RawGuideRow]) -> Result<Vec<GuideDraft>, Vec<RowValidationError>> {
    let mut errors: Vec<RowValidationError> = Vec::new();
    let mut drafts: Vec<GuideDraft> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_instruction() || row.is_blank() {
            continue;
        }

        let row_number = index as u32 + 1 + HEADER_ROW_OFFSET;
        match validate_row(row, row_number) {
            Ok(draft) => drafts.push(draft),
            Err(mut row_errors) => errors.append(&mut row_errors),
        }
    }

    if errors.is_empty() {
        Ok(drafts)
    } else {
        Err(errors)
    }
}

/// Parse and validate in one step, reporting unreadable input as a single
/// file-level error.
pub fn validate_sheet<R: Read>(reader: R) -> Result<Vec<GuideDraft>, Vec<RowValidationError>> {
    let rows = match parse_rows(reader) {
        Ok(rows) => rows,
        Err(err) => {
            let message = ImportFileError::from(err).to_string();
            return Err(vec![RowValidationError::file_level(&message)]);
        }
    };

    validate_rows(&rows)
}

fn validate_row(row: &RawGuideRow, row_number: u32) -> Result<GuideDraft, Vec<RowValidationError>> {
    let mut errors = Vec::new();

    let guide_type = row.guide_type.trim();
    let parsed_type = if guide_type.is_empty() {
        errors.push(RowValidationError::at(row_number, "구분", "필수 항목입니다"));
        None
    } else {
        match GuideType::from_label(guide_type) {
            Some(parsed) => Some(parsed),
            None => {
                errors.push(RowValidationError::at(
                    row_number,
                    "구분",
                    "guide 또는 tour_conductor만 가능합니다",
                ));
                None
            }
        }
    };

    for (field, value) in [
        ("한글명", &row.name_ko),
        ("영문성", &row.name_en_last),
        ("영문명", &row.name_en_first),
    ] {
        if value.trim().is_empty() {
            errors.push(RowValidationError::at(row_number, field, "필수 항목입니다"));
        }
    }

    let gender = row.gender.trim();
    let parsed_gender = if gender.is_empty() {
        None
    } else {
        match Gender::from_label(gender) {
            Some(parsed) => Some(parsed),
            None => {
                errors.push(RowValidationError::at(
                    row_number,
                    "성별",
                    "male 또는 female만 가능합니다",
                ));
                None
            }
        }
    };

    // Shape check only. The single-entry path runs full calendar validation,
    // the bulk path never has; a row like 1990-13-45 passes here.
    let birth_date = row.birth_date.trim();
    if !birth_date.is_empty() && !date_shape_pattern().is_match(birth_date) {
        errors.push(RowValidationError::at(
            row_number,
            "생년월일",
            "YYYY-MM-DD 형식이어야 합니다",
        ));
    }

    let email = row.email.trim();
    if !email.is_empty() && !is_valid_email(email) {
        errors.push(RowValidationError::at(
            row_number,
            "이메일",
            "올바른 이메일 형식이 아닙니다",
        ));
    }

    let messenger_type = row.messenger_type.trim();
    let parsed_messenger = if messenger_type.is_empty() {
        None
    } else {
        match MessengerKind::from_label(messenger_type) {
            Some(parsed) => Some(parsed),
            None => {
                errors.push(RowValidationError::at(
                    row_number,
                    "메신저유형",
                    "kakao, line, whatsapp, telegram, wechat 중 하나여야 합니다",
                ));
                None
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let guide_type = match parsed_type {
        Some(parsed) => parsed,
        None => return Err(errors),
    };

    Ok(GuideDraft {
        guide_type,
        name_ko: row.name_ko.trim().to_string(),
        name_en_last: row.name_en_last.trim().to_uppercase(),
        name_en_first: row.name_en_first.trim().to_uppercase(),
        gender: parsed_gender,
        birth_date: non_blank(birth_date),
        email: non_blank(email),
        messenger_type: parsed_messenger,
        messenger_id: non_blank(row.messenger_id.trim()),
        photo: None,
        is_active: true,
    })
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn date_shape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}
