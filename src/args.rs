use clap::{Parser, Subcommand};

/// Classifies pilgrim feedback by department and sentiment, and summarizes the demographics
/// of the participants.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// (file path, optional) A JSON configuration file. See the manual for the format.
    /// Command line arguments override the values of the configuration file.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Translates the comments, then classifies them by department and sentiment.
    Classify(ClassifyArgs),
    /// Computes the demographic aggregates of a table of participants.
    Demographics(DemographicsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// (file path or '-') The file containing the comments. The format is inferred from the
    /// suffix (csv, tsv, xlsx, xls, ods, json, txt, pdf). With '-', the comments are read from
    /// the standard input, one per line.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (text) Comments entered by hand, one per line. Ignored if --input is provided.
    #[clap(long, value_parser)]
    pub text: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the CSV table of results.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference CSV table. If provided, the results are compared to it and any
    /// difference is reported as an error.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, optional) Writes a JSON summary of the run to the given location.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (default 10000) The maximum number of comments processed at once.
    #[clap(long, value_parser)]
    pub chunk_size: Option<usize>,

    /// (default auto) The language of the comments.
    #[clap(long, value_parser)]
    pub source_lang: Option<String>,

    /// (default en) The language the comments are translated to before classification.
    #[clap(long, value_parser)]
    pub target_lang: Option<String>,

    /// (none or http) The translation service. Overrides the configuration file.
    #[clap(long, value_parser)]
    pub translator: Option<String>,

    /// (lexicon or http) The sentiment model. Overrides the configuration file.
    #[clap(long, value_parser)]
    pub sentiment: Option<String>,

    /// (abort or mark) What to do with a comment when the sentiment model fails.
    #[clap(long, value_parser)]
    pub on_sentiment_error: Option<String>,

    /// (number, optional) Logs the first rows of the results.
    #[clap(long, value_parser)]
    pub preview: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct DemographicsArgs {
    /// (file path or '-') The table of participants (csv, tsv, txt, xlsx, xls, ods). Text files
    /// are read as CSV. With '-', a CSV table is read from the standard input.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (URL) Downloads the table of participants, as CSV. Ignored if --input is provided.
    #[clap(long, value_parser)]
    pub url: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (repeatable) Only keep the participants with this gender, as written in the table.
    #[clap(long, value_parser)]
    pub gender: Vec<String>,

    /// (repeatable) Only keep the participants with this nationality.
    #[clap(long, value_parser)]
    pub nationality: Vec<String>,

    /// (YYYY-MM-DD) Only keep the rows dated on or after this day.
    #[clap(long, value_parser)]
    pub from: Option<String>,

    /// (YYYY-MM-DD) Only keep the rows dated on or before this day.
    #[clap(long, value_parser)]
    pub to: Option<String>,
}
