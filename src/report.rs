use std::fs;
use std::path::Path;

use crate::domain::pull_request::PrRecord;
use crate::error::AppResult;

const HEADER: [&str; 5] = [
    "PR #",
    "Original PR Title",
    "Generated PR Title",
    "Original PR Summary",
    "Generated PR Summary",
];

/// Write one CSV row per record, truncating any previous output file.
pub fn write_report(path: &Path, records: &[PrRecord]) -> AppResult<()> {
    fs::write(path, build_csv(records))?;
    Ok(())
}

fn build_csv(records: &[PrRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.join(","));

    for record in records {
        let row = [
            record.number.to_string(),
            csv_escape(&record.original_title),
            csv_escape(&record.generated.title),
            csv_escape(&record.original_body),
            csv_escape(&record.generated.summary),
        ];
        lines.push(row.join(","));
    }

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
