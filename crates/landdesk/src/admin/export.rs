use chrono::NaiveDate;
use serde::Serialize;

use super::service::CompanyDetail;
use crate::roster::{Gender, MessengerKind};

/// The three tabs of the original workbook, exported as separate CSV sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSheet {
    Guides,
    Companies,
    Summary,
}

impl ExportSheet {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "guides" => Some(Self::Guides),
            "companies" => Some(Self::Companies),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Guides => "guides",
            Self::Companies => "companies",
            Self::Summary => "summary",
        }
    }
}

#[derive(Debug, Serialize)]
struct GuideSheetRow {
    #[serde(rename = "번호")]
    number: usize,
    #[serde(rename = "랜드사명")]
    company_name: String,
    #[serde(rename = "사업자번호")]
    business_number: String,
    #[serde(rename = "구분")]
    guide_type: &'static str,
    #[serde(rename = "한글명")]
    name_ko: String,
    #[serde(rename = "영문성")]
    name_en_last: String,
    #[serde(rename = "영문명")]
    name_en_first: String,
    #[serde(rename = "성별")]
    gender: String,
    #[serde(rename = "생년월일")]
    birth_date: String,
    #[serde(rename = "이메일")]
    email: String,
    #[serde(rename = "메신저유형")]
    messenger_type: String,
    #[serde(rename = "메신저ID")]
    messenger_id: String,
    #[serde(rename = "상태")]
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct CompanySheetRow {
    #[serde(rename = "번호")]
    number: usize,
    #[serde(rename = "랜드사명")]
    company_name: String,
    #[serde(rename = "사업자번호")]
    business_number: String,
    #[serde(rename = "이메일")]
    email: String,
    #[serde(rename = "가이드 수")]
    guide_count: String,
}

#[derive(Debug, Serialize)]
struct SummarySheetRow {
    #[serde(rename = "항목")]
    item: &'static str,
    #[serde(rename = "값")]
    value: String,
}

/// Fully rendered export, one CSV document per sheet.
#[derive(Debug, Clone)]
pub struct RosterExport {
    guides_sheet: String,
    companies_sheet: String,
    summary_sheet: String,
    pub guide_rows: usize,
    pub company_rows: usize,
}

impl RosterExport {
    pub fn build(details: &[CompanyDetail]) -> Self {
        let mut guide_rows = Vec::new();
        for detail in details {
            let company_name = display(detail.profile.company_name.as_deref());
            let business_number = display(
                detail
                    .profile
                    .business_number
                    .as_ref()
                    .map(|number| number.as_str()),
            );

            for record in &detail.guides {
                guide_rows.push(GuideSheetRow {
                    number: guide_rows.len() + 1,
                    company_name: company_name.clone(),
                    business_number: business_number.clone(),
                    guide_type: record.guide.guide_type.korean_label(),
                    name_ko: record.guide.name_ko.clone(),
                    name_en_last: record.guide.name_en_last.clone(),
                    name_en_first: record.guide.name_en_first.clone(),
                    gender: display(record.guide.gender.map(Gender::korean_label)),
                    birth_date: display(record.guide.birth_date.as_deref()),
                    email: display(record.guide.email.as_deref()),
                    messenger_type: display(
                        record.guide.messenger_type.map(MessengerKind::label),
                    ),
                    messenger_id: display(record.guide.messenger_id.as_deref()),
                    status: if record.guide.is_active {
                        "활성"
                    } else {
                        "비활성"
                    },
                });
            }
        }

        let company_rows: Vec<CompanySheetRow> = details
            .iter()
            .enumerate()
            .map(|(index, detail)| CompanySheetRow {
                number: index + 1,
                company_name: display(detail.profile.company_name.as_deref()),
                business_number: display(
                    detail
                        .profile
                        .business_number
                        .as_ref()
                        .map(|number| number.as_str()),
                ),
                email: display(Some(detail.profile.email.as_str())),
                guide_count: format!("{}명", detail.guides.len()),
            })
            .collect();

        let total_guides: usize = details.iter().map(|detail| detail.guides.len()).sum();
        let average = if details.is_empty() {
            0
        } else {
            (total_guides as f64 / details.len() as f64).round() as usize
        };
        let summary_rows = [
            SummarySheetRow {
                item: "총 랜드사 수",
                value: format!("{}개", details.len()),
            },
            SummarySheetRow {
                item: "총 가이드 수",
                value: format!("{total_guides}명"),
            },
            SummarySheetRow {
                item: "평균 가이드 수",
                value: format!("{average}명"),
            },
        ];

        Self {
            guides_sheet: to_csv(&guide_rows),
            companies_sheet: to_csv(&company_rows),
            summary_sheet: to_csv(&summary_rows),
            guide_rows: guide_rows.len(),
            company_rows: company_rows.len(),
        }
    }

    pub fn sheet_csv(&self, sheet: ExportSheet) -> &str {
        match sheet {
            ExportSheet::Guides => &self.guides_sheet,
            ExportSheet::Companies => &self.companies_sheet,
            ExportSheet::Summary => &self.summary_sheet,
        }
    }

    /// Dated download name, e.g. `가이드_관리_20250807_guides.csv`.
    pub fn file_name(sheet: ExportSheet, today: NaiveDate) -> String {
        format!("가이드_관리_{}_{}.csv", today.format("%Y%m%d"), sheet.label())
    }
}

fn display(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "-".to_string(),
    }
}

fn to_csv<T: Serialize>(rows: &[T]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).expect("serialize export row");
    }

    let bytes = writer.into_inner().expect("flush export rows");
    String::from_utf8(bytes).expect("export is utf-8")
}
