use log::{debug, info, warn};

use feedback_pipeline::builder::Builder;
use feedback_pipeline::demographics::*;
use feedback_pipeline::taxonomy::Taxonomy;
use feedback_pipeline::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Read;
use std::time::Duration;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{ClassifyArgs, DemographicsArgs};
use crate::feedback::config_reader::*;

mod io_common;
mod io_csv;
mod io_excel;
mod io_json;
mod io_output;
mod io_text;
mod services;

pub mod config_reader;

pub use io_common::{extract_comments, CommentChunks};

#[derive(Debug, Snafu)]
pub enum FeedbackError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening spreadsheet {path}: {source}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no worksheet or no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening JSON file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file: {source}"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error parsing CSV line: {source}"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error writing CSV: {source}"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the standard input: {source}"))]
    ReadingStdin { source: std::io::Error },
    #[snafu(display("No comments to process: pass --input or --text"))]
    NoInput {},
    #[snafu(display("No table to read: pass --input or --url"))]
    NoTable {},
    #[snafu(display("Error fetching {url}: {source}"))]
    Fetching {
        #[snafu(source(from(ureq::Error, Box::new)))]
        source: Box<ureq::Error>,
        url: String,
    },
    #[snafu(display("Error reading the reply of {url}: {source}"))]
    ReadingReply {
        source: std::io::Error,
        url: String,
    },
    #[snafu(display("The {service} service requires an endpoint"))]
    MissingEndpoint { service: String },
    #[snafu(display("Invalid date {value}, expected YYYY-MM-DD: {source}"))]
    InvalidDate {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("{source}"))]
    Extraction { source: ExtractError },
    #[snafu(display("Processing stopped: {source}"))]
    Pipeline { source: PipelineError },
    #[snafu(display("{source}"))]
    Demographic { source: DemographicError },
    #[snafu(display("The results differ from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type FbResult<T> = Result<T, FeedbackError>;
pub type BFbResult<T> = Result<T, Box<FeedbackError>>;

impl FeedbackError {
    /// True when nothing was left after filtering the demographic records. This is not a
    /// failure of the program.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            FeedbackError::Demographic {
                source: DemographicError::EmptyResult
            }
        )
    }
}

/// Where the comments come from.
enum CommentSource {
    File(String),
    Stdin,
    Text(String),
}

fn comment_source(args: &ClassifyArgs) -> BFbResult<CommentSource> {
    match (args.input.as_deref(), args.text.as_deref()) {
        (Some("-"), _) => Ok(CommentSource::Stdin),
        (Some(path), _) => Ok(CommentSource::File(path.to_string())),
        (None, Some(text)) => Ok(CommentSource::Text(text.to_string())),
        (None, None) => NoInputSnafu {}.fail().map_err(Box::new),
    }
}

/// Where the table of participants comes from.
#[derive(Debug, PartialEq, Eq)]
enum TableSource {
    File(String),
    Stdin,
    Url(String),
}

fn table_source(args: &DemographicsArgs) -> BFbResult<TableSource> {
    match (args.input.as_deref(), args.url.as_deref()) {
        (Some("-"), _) => Ok(TableSource::Stdin),
        (Some(path), _) => Ok(TableSource::File(path.to_string())),
        (None, Some(url)) => Ok(TableSource::Url(url.to_string())),
        (None, None) => NoTableSnafu {}.fail().map_err(Box::new),
    }
}

fn manual_chunks(text: &str, rules: &PipelineRules) -> CommentChunks {
    let mut builder = Builder::new(rules);
    builder.add_lines(text);
    debug!("manual_chunks: {} comments entered", builder.len());
    Box::new(std::iter::once(Ok(builder.chunk())))
}

fn progress_logger(p: Progress) {
    info!(
        "Processed {} rows... ({:.1}%)",
        p.rows_processed,
        100.0 * p.fraction
    );
}

fn build_summary_js(source_name: &str, report: &RunReport, taxonomy: &Taxonomy) -> JSValue {
    let mut by_department: Vec<JSValue> = Vec::new();
    for label in taxonomy.labels() {
        let rows: Vec<&ClassificationResult> = report
            .results
            .iter()
            .filter(|r| r.department == label)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let positive = rows
            .iter()
            .filter(|r| r.sentiment.map(|s| s.label) == Some(SentimentLabel::Positive))
            .count();
        let negative = rows
            .iter()
            .filter(|r| r.sentiment.map(|s| s.label) == Some(SentimentLabel::Negative))
            .count();
        by_department.push(json!({
            "department": label,
            "comments": rows.len(),
            "positive": positive,
            "negative": negative,
        }));
    }
    let translation_errors = report
        .results
        .iter()
        .filter(|r| r.translation_failed())
        .count();
    json!({
        "source": source_name,
        "rowsProcessed": report.rows_processed,
        "skippedChunks": report.skipped_chunks,
        "translationErrors": translation_errors,
        "cachedTranslations": report.cache_entries,
        "cacheHits": report.cache_hits,
        "complete": report.is_complete(),
        "halted": report.halted.as_ref().map(|e| e.to_string()),
        "departments": by_department,
    })
}

/// Compares the results with a reference table and prints the differences.
fn check_reference(ref_path: &str, produced: &str) -> BFbResult<()> {
    let expected = fs::read_to_string(ref_path).context(OpeningFileSnafu { path: ref_path })?;
    let expected = expected.replace("\r\n", "\n");
    if expected.trim_end() != produced.trim_end() {
        warn!("Found differences with the reference table {}", ref_path);
        print_diff(expected.as_str(), produced, "\n");
        return ReferenceMismatchSnafu { path: ref_path }
            .fail()
            .map_err(Box::new);
    }
    info!("The results match the reference table {}", ref_path);
    Ok(())
}

fn preview(report: &RunReport, n: usize) {
    for r in report.results.iter().take(n) {
        info!(
            "preview: {:?} -> {:?} | {} | {} {}",
            r.original,
            r.translated,
            r.department,
            r.sentiment_label(),
            r.confidence()
        );
    }
}

/// Translates and classifies the comments, then writes the table of results.
///
/// When the processing stops early, the rows already classified are still written out before
/// the error is returned.
pub fn run_classification(args: &ClassifyArgs, config_path: Option<&str>) -> BFbResult<()> {
    let config = match config_path {
        Some(p) => read_config(p)?,
        None => FeedbackConfig::default(),
    };
    let settings = resolve_classify(&config, args)?;
    debug!("run_classification: settings: {:?}", settings.rules);

    let translator = services::make_translator(&settings.translation)?;
    let model = services::make_sentiment_model(&settings.sentiment)?;

    let source = comment_source(args)?;
    let (source_name, chunks): (String, CommentChunks) = match source {
        CommentSource::File(path) => {
            info!("Reading comments from {}", path);
            let name = io_common::simplify_file_name(&path);
            (name, extract_comments(&path, settings.rules.chunk_size))
        }
        CommentSource::Stdin => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context(ReadingStdinSnafu {})?;
            ("stdin".to_string(), manual_chunks(&text, &settings.rules))
        }
        CommentSource::Text(text) => ("text".to_string(), manual_chunks(&text, &settings.rules)),
    };

    let mut pipeline = Pipeline::new(
        &settings.rules,
        &settings.taxonomy,
        translator.as_ref(),
        model.as_ref(),
    );
    let mut report = pipeline.run(chunks, &mut |p| progress_logger(p));
    if let Some(n) = args.preview {
        preview(&report, n);
    }

    let table = io_output::results_to_csv(&report.results)?;
    let empty = report.results.is_empty();
    if empty {
        warn!("No usable comments left after filtering, no table is written");
    } else {
        io_output::write_output(args.out.as_deref(), &table)?;
    }

    let summary_js = build_summary_js(&source_name, &report, &settings.taxonomy);
    info!("summary: {}", summary_js);
    if let Some(summary_path) = args.summary.as_deref() {
        let pretty = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        io_output::write_output(Some(summary_path), &pretty)?;
    }

    if let Some(e) = report.halted.take() {
        return Err(Box::new(FeedbackError::Pipeline { source: e }));
    }

    match args.reference.as_deref() {
        Some(ref_path) if !empty => check_reference(ref_path, &table),
        _ => Ok(()),
    }
}

/// Reads a table of participants and writes the demographic summary as JSON.
pub fn run_demographics(args: &DemographicsArgs, config_path: Option<&str>) -> BFbResult<()> {
    if let Some(p) = config_path {
        // No setting applies to this command, the file is only validated.
        let _ = read_config(p)?;
    }
    let date_filter = DateFilter::from_args(args.from.as_deref(), args.to.as_deref())?;
    let (source_name, table) = match table_source(args)? {
        TableSource::File(path) => {
            let table = io_excel::read_table(&path)?;
            (path, table)
        }
        TableSource::Stdin => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context(ReadingStdinSnafu {})?;
            ("stdin".to_string(), io_excel::table_from_csv_text(&text)?)
        }
        TableSource::Url(url) => {
            let text = services::fetch_text(&url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
            let table = io_excel::table_from_csv_text(&text)?;
            (url, table)
        }
    };
    info!(
        "run_demographics: {} rows read from {}",
        table.rows.len(),
        source_name
    );

    let columns = validate_columns(&table.header).context(DemographicSnafu {})?;
    let date_col = table
        .header
        .iter()
        .position(|h| h.to_lowercase().contains("date"));
    if date_filter.is_active() && date_col.is_none() {
        warn!("run_demographics: no date column, the date filter is ignored");
    }

    let mut records: Vec<DemographicRecord> = Vec::new();
    for row in table.rows.iter() {
        if let (Some(idx), true) = (date_col, date_filter.is_active()) {
            let cell = row.get(idx).and_then(|c| c.as_deref());
            if !date_filter.accepts(cell) {
                continue;
            }
        }
        records.push(record_from_row(row, &columns));
    }
    debug!(
        "run_demographics: {} records after the date filter",
        records.len()
    );

    let filter = DemographicFilter {
        genders: args.gender.clone(),
        nationalities: args.nationality.clone(),
    };
    let summary = summarize(&records, &filter).context(DemographicSnafu {})?;
    let js = io_output::demographics_to_json(&summary);
    let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    io_output::write_output(args.out.as_deref(), &pretty)?;
    Ok(())
}

fn record_from_row(row: &[Option<String>], columns: &ColumnIndexes) -> DemographicRecord {
    let text = |idx: usize| -> Option<String> {
        row.get(idx)
            .and_then(|c| c.as_deref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    DemographicRecord {
        age: text(columns.age).and_then(|s| s.parse::<f64>().ok()),
        nationality: text(columns.nationality),
        gender: text(columns.gender),
    }
}

/// An inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateFilter {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

impl DateFilter {
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> BFbResult<DateFilter> {
        let parse = |s: &str| -> BFbResult<chrono::NaiveDate> {
            let d = chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .context(InvalidDateSnafu { value: s })?;
            Ok(d)
        };
        Ok(DateFilter {
            from: from.map(parse).transpose()?,
            to: to.map(parse).transpose()?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Cells that cannot be read as a date are rejected when a bound is set.
    pub fn accepts(&self, cell: Option<&str>) -> bool {
        if !self.is_active() {
            return true;
        }
        let day = match cell.and_then(parse_day) {
            Some(d) => d,
            None => return false,
        };
        self.from.map_or(true, |f| day >= f) && self.to.map_or(true, |t| day <= t)
    }
}

/// Reads the day of a cell. Spreadsheet dates arrive as serial numbers.
fn parse_day(cell: &str) -> Option<chrono::NaiveDate> {
    let s = cell.trim();
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    let serial = s.parse::<f64>().ok().filter(|x| *x > 0.0)?;
    chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}
