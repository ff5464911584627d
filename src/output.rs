use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::errors::Result;
use crate::pipeline::ScreeningResult;

/// Write the multi-section text report as `<filename>.txt`
pub fn write_text_report<P: AsRef<Path>>(
    result: &ScreeningResult,
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(format!("{}.txt", filename));
    create_parent(&output_path)?;

    fs::write(&output_path, &result.text_report)?;

    Ok(output_path)
}

/// Write the report and trend as pretty JSON to `<filename>.json`
pub fn write_json_report<P: AsRef<Path>>(
    result: &ScreeningResult,
    output_dir: P,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(format!("{}.json", filename));
    create_parent(&output_path)?;

    let json = serde_json::to_string_pretty(result)?;
    fs::write(&output_path, json)?;

    Ok(output_path)
}

/// Outcome of one image in a batch
pub struct BatchEntry<'a> {
    pub filename: &'a str,
    pub outcome: &'a Result<ScreeningResult>,
}

/// Write one row per image, successes and rejections alike, to `summary.csv`
pub fn write_summary_csv<P: AsRef<Path>>(entries: &[BatchEntry], output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join("summary.csv");
    create_parent(&output_path)?;

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "File",
        "Status",
        "Format",
        "Resolution",
        "Quality",
        "Redness_Score",
        "Red_Dominant_Perc",
        "Smoothness",
        "Edge_Density",
        "Texture_Type",
        "Findings",
        "Severity_Score",
        "Severity_Level",
        "Urgency",
        "Overall_Confidence",
        "Trend",
        "Message",
    ])?;

    for entry in entries {
        match entry.outcome {
            Ok(result) => {
                let report = &result.report;
                let findings = report
                    .detection
                    .findings
                    .iter()
                    .map(|f| f.condition.as_str())
                    .collect::<Vec<_>>()
                    .join(";");
                let trend = result
                    .trend
                    .as_ref()
                    .map(|t| t.comparison.trend.as_str())
                    .unwrap_or("");

                writer.write_record([
                    entry.filename.to_string(),
                    "ok".to_string(),
                    report.metadata.format.as_str().to_string(),
                    report.resolution.clone(),
                    report.image_quality.as_str().to_string(),
                    format!("{:.6}", report.color.redness_score),
                    format!("{:.6}", report.color.inflammation.red_dominant_percentage),
                    format!("{:.6}", report.texture.smoothness),
                    format!("{:.6}", report.texture.edge_density),
                    report.texture.texture_type.as_str().to_string(),
                    findings,
                    report.severity.score.to_string(),
                    report.severity.level.as_str().to_string(),
                    report.severity.urgency.as_str().to_string(),
                    report.confidence_label.clone(),
                    trend.to_string(),
                    String::new(),
                ])?;
            }
            Err(err) => {
                let mut record = vec![entry.filename.to_string(), "rejected".to_string()];
                record.extend(std::iter::repeat(String::new()).take(14));
                record.push(err.user_message());
                writer.write_record(&record)?;
            }
        }
    }

    writer.flush()?;

    Ok(output_path)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScreeningError;

    #[test]
    fn rejected_rows_keep_column_count() {
        let dir = std::env::temp_dir().join(format!("derma_screen_csv_{}", std::process::id()));
        let outcome: Result<ScreeningResult> = Err(ScreeningError::InputTooSmall { size: 10, min: 1024 });
        let entries = [BatchEntry {
            filename: "tiny",
            outcome: &outcome,
        }];

        let path = write_summary_csv(&entries, &dir).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().len();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), headers);
        assert_eq!(&rows[0][1], "rejected");
        assert!(rows[0][16].starts_with("Image too small"));

        fs::remove_dir_all(&dir).ok();
    }
}
