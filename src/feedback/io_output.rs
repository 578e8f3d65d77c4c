// Writing the results: CSV tables and JSON summaries.

use std::fs;

use log::info;
use serde_json::json;
use serde_json::Value as JSValue;

use feedback_pipeline::demographics::DemographicSummary;
use feedback_pipeline::ClassificationResult;

use crate::feedback::*;

pub const RESULT_COLUMNS: [&str; 5] = [
    "Original",
    "Translated",
    "Department",
    "Primary Sentiment",
    "Confidence",
];

/// The table of results, in the order of the input.
pub fn results_to_csv(results: &[ClassificationResult]) -> BFbResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(RESULT_COLUMNS).context(CsvWriteSnafu {})?;
    for r in results.iter() {
        let confidence = r.confidence().to_string();
        wtr.write_record([
            r.original.as_str(),
            r.translated.as_str(),
            r.department.as_str(),
            r.sentiment_label(),
            confidence.as_str(),
        ])
        .context(CsvWriteSnafu {})?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(WritingOutputSnafu { path: "<memory>" })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes to the given file, or to the standard output for `stdout` or an empty path.
pub fn write_output(path: Option<&str>, contents: &str) -> BFbResult<()> {
    match path {
        None | Some("") | Some("stdout") => {
            println!("{}", contents.trim_end());
        }
        Some(p) => {
            fs::write(p, contents).context(WritingOutputSnafu { path: p })?;
            info!("Wrote {}", p);
        }
    }
    Ok(())
}

pub fn demographics_to_json(summary: &DemographicSummary) -> JSValue {
    let stats = &summary.age_stats;
    let distribution: Vec<JSValue> = summary
        .age_distribution
        .iter()
        .map(|(age, count)| json!({"age": age, "count": count}))
        .collect();
    let groups: Vec<JSValue> = summary
        .groups
        .iter()
        .map(|g| {
            json!({
                "nationality": g.nationality,
                "gender": g.gender,
                "rows": g.rows,
                "withAge": g.with_age,
                "meanAge": g.mean_age,
            })
        })
        .collect();
    json!({
        "totalRecords": summary.total_records,
        "filteredRecords": summary.filtered_records,
        "ageStats": {
            "count": stats.count,
            "min": stats.min,
            "max": stats.max,
            "mean": stats.mean,
            "q1": stats.q1,
            "median": stats.median,
            "q3": stats.q3,
            "std": stats.std,
            "mode": stats.mode,
        },
        "ageDistribution": distribution,
        "groups": groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_pipeline::{Confidence, SentimentLabel, SentimentScore};

    #[test]
    fn result_table() {
        let rows = vec![
            ClassificationResult {
                original: "الحافلة متأخرة".to_string(),
                translated: "The bus, late".to_string(),
                department: "Transport & Travel".to_string(),
                sentiment: Some(SentimentScore {
                    label: SentimentLabel::Negative,
                    confidence: Confidence::new(0.9).unwrap(),
                }),
            },
            ClassificationResult {
                original: "x".to_string(),
                translated: "x".to_string(),
                department: "General Services".to_string(),
                sentiment: None,
            },
        ];
        let table = results_to_csv(&rows).unwrap();
        let expected = "Original,Translated,Department,Primary Sentiment,Confidence\n\
                        الحافلة متأخرة,\"The bus, late\",Transport & Travel,NEGATIVE,0.90\n\
                        x,x,General Services,ERROR,0.00\n";
        assert_eq!(table, expected);
    }

    #[test]
    fn empty_table_has_a_header() {
        let table = results_to_csv(&[]).unwrap();
        assert_eq!(
            table,
            "Original,Translated,Department,Primary Sentiment,Confidence\n"
        );
    }
}
