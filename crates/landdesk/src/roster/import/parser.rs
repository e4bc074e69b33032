use std::io::Read;

use super::RawGuideRow;

/// Deserialize an uploaded sheet into label-keyed rows.
///
/// Cells are trimmed, and short rows are tolerated so a sheet edited by hand
/// (trailing blank columns removed) still parses. Row order and position are
/// preserved for error reporting; filtering happens in the validator.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawGuideRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawGuideRow>() {
        rows.push(record?);
    }

    Ok(rows)
}
