use super::RawGuideRow;

/// File name offered for the downloadable starter sheet.
pub const TEMPLATE_FILE_NAME: &str = "guide_sample.csv";

/// Build the starter sheet: header, an instruction row, a spacer row, and two
/// example entries. The instruction row starts with the reserved marker so a
/// re-upload of the unedited template filters it back out.
pub fn template_csv() -> String {
    let rows = [
        RawGuideRow {
            guide_type: "※ 아래 샘플 데이터는 예시입니다. 실제 사용 시 이 행과 샘플 데이터를 모두 삭제하고 본인의 데이터를 입력하세요.".to_string(),
            ..RawGuideRow::default()
        },
        RawGuideRow::default(),
        RawGuideRow {
            guide_type: "guide".to_string(),
            name_ko: "홍길동".to_string(),
            name_en_last: "HONG".to_string(),
            name_en_first: "GILDONG".to_string(),
            gender: "male".to_string(),
            birth_date: "1990-01-01".to_string(),
            email: "hong@example.com".to_string(),
            messenger_type: "kakao".to_string(),
            messenger_id: "hong123".to_string(),
        },
        RawGuideRow {
            guide_type: "tour_conductor".to_string(),
            name_ko: "김영희".to_string(),
            name_en_last: "KIM".to_string(),
            name_en_first: "YOUNGHEE".to_string(),
            gender: "female".to_string(),
            birth_date: "1992-05-15".to_string(),
            email: "kim@example.com".to_string(),
            messenger_type: "line".to_string(),
            messenger_id: "kim_line".to_string(),
        },
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &rows {
        writer.serialize(row).expect("serialize template row");
    }

    let bytes = writer.into_inner().expect("flush template rows");
    String::from_utf8(bytes).expect("template is utf-8")
}
