/*!

This is the long-form manual for `feedback_pipeline` and `pilgrimfb`.

## Input formats

The format of an input is inferred from the suffix of its file name:
* `.csv`, `.tsv` Delimited text with a header row
* `.xlsx`, `.xls`, `.ods` Spreadsheets (only the first worksheet is read)
* `.json` A list of records
* `.txt` Plain text, one comment per line
* `.pdf` Documents with extractable text, one comment per line

Any other suffix is rejected with an `Unsupported file format` error.

### Tabular inputs (`csv`, `tsv`, spreadsheets, `json`)

The comments must be in a column named `Comments`. The names of the columns are trimmed
before the lookup, but the comparison is case-sensitive. All the other columns are ignored.

Large inputs are read in chunks of 10,000 rows by default (see `--chunk-size`). If a chunk
does not have a `Comments` column, this chunk is skipped with a warning and the processing
continues with the next one. For delimited text and spreadsheets, the header is shared by all
the chunks, so a missing column skips the whole file. For JSON inputs, each chunk is checked
on its own: a chunk in which no record has a `Comments` field is skipped.

```json
[
  {"Comments": "The bus was late", "Date": "2024-06-14"},
  {"Comments": "الطعام كان لذيذا"}
]
```

### Line-oriented inputs (`txt`, `pdf`)

The whole document is read at once. Each non-blank line is a comment.

### Manual input

Comments can also be passed on the command line with `--text`, or read from the standard
input with `--input -`. One comment per line.

## Processing

Each comment goes through the following steps:
1. translation (to English by default). The translations are cached for the duration of the run,
   so repeated comments are only translated once. When the translation service fails, the
   translated value is `Error: <message>` and the processing continues.
2. department classification of the translated text, by keyword matching (see below)
3. sentiment scoring of the translated text

### Departments

A comment belongs to the first department, in the order of declaration, that shares at least
one word with the comment. The words are the whitespace-separated tokens of the lowercased
comment. There is no stemming and punctuation is not removed: `late.` does not match `late`.
Keywords made of several words (`air conditioning`) never match.
When no department matches, the comment goes to `General Services`.

The default departments come from a thematic analysis of pilgrim feedback:
* Transport & Travel
* Accommodation & Facilities
* Hotel Room Conditions & Cleanliness
* Staff Attitude & Support
* Service Efficiency & Time Management
* Food Quality & Dining
* Event & Program Organization

They can be replaced in the configuration file.

### Sentiment

The sentiment model is binary: the label is `POSITIVE` or `NEGATIVE`, with a confidence between
0.00 and 1.00. When the model fails, the run stops by default (`onError: "abort"`) and the rows
already processed are written out. With `onError: "mark"`, the row is kept with the label `ERROR`
and a confidence of 0.00.

## Output

A CSV table with the columns `Original`, `Translated`, `Department`, `Primary Sentiment` and
`Confidence`, in the same order as the input.

## Configuration file

All the fields are optional. Command line arguments take precedence.

```json
{
  "inputSettings": { "chunkSize": 10000, "totalRowsEstimate": 1000000 },
  "translation": {
    "provider": "http",
    "endpoint": "http://localhost:5000/translate",
    "sourceLang": "auto",
    "targetLang": "en",
    "timeoutSecs": 30
  },
  "sentiment": {
    "provider": "http",
    "endpoint": "http://localhost:8080/predict",
    "onError": "mark"
  },
  "departments": [
    { "name": "Transport", "keywords": ["bus", "driver"] }
  ],
  "catchAll": "Other"
}
```

The translation providers are `none` (the comments are already in the target language) and
`http` (a LibreTranslate compatible service). The sentiment providers are `lexicon` (an offline
word list) and `http` (a service answering in the Hugging Face inference format).

Note: the translation cache is keyed on the original text only. Changing the target language in
the middle of a run has no effect on the comments already translated.

## Demographics

The `demographics` command reads a table with the columns `العمر Age`, `الجنسية Nationality` and
`الجنس Gender`, and writes a JSON summary: age statistics, the age distribution, and counts and
mean age by nationality and gender. Gender values are labeled in both languages (`ذكر: Male`,
`أنثى : Female`). Rows with any other gender value count in the age statistics but are left out
of the nationality and gender groups.

The table can come from:
- a file with `--input` (`csv`, `tsv`, `txt` or spreadsheet; text files are read as CSV)
- the standard input with `--input -`, as CSV
- a URL with `--url`, returning CSV

The rows can be filtered by gender (`--gender`), nationality (`--nationality`) and, when the table
has a column with `date` in its name, by date (`--from`, `--to`). The date filter only applies
when one of the bounds is given. Without bounds, every row is kept, including the rows with a
date that cannot be read. With a bound, those rows are dropped.

*/
