//! Raw upload decoding.
//!
//! This module turns an uploaded byte blob into a `RawTable`:
//!
//! - charset detection (BOM, then UTF-8 validity, then statistical guess)
//! - delimiter discovery by trying a fixed, ordered candidate list
//! - permissive row parsing: short rows are padded with empty cells, overlong
//!   or unparseable lines are skipped and counted, not fatal
//!
//! No column semantics live here; that is the classifier's job.

use chardetng::EncodingDetector;
use csv::StringRecord;
use encoding_rs::{Encoding, UTF_8};

use crate::domain::RawTable;
use crate::error::PipelineError;

/// Candidate delimiters, tried in order. The first one producing at least two
/// columns wins.
pub const DELIMITERS: [u8; 6] = [b',', b';', b'\t', b'|', b' ', b':'];

/// Decoder output: the table plus what was discovered about the file.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub table: RawTable,
    pub encoding: &'static str,
    pub delimiter: u8,
    /// Lines dropped because they could not be parsed or had too many fields.
    pub skipped_lines: usize,
    pub diagnostic: String,
}

#[derive(Debug)]
struct Parsed {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    skipped: usize,
}

/// Decode raw bytes into a table, discovering charset and delimiter.
pub fn decode(bytes: &[u8]) -> Result<DecodedTable, PipelineError> {
    let (text, encoding) = decode_text(bytes)?;

    for &delimiter in DELIMITERS.iter() {
        let parsed = match parse_with_delimiter(&text, delimiter) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(delimiter = %delimiter_label(delimiter), "delimiter rejected: {e}");
                continue;
            }
        };

        if parsed.headers.len() < 2 {
            tracing::debug!(
                delimiter = %delimiter_label(delimiter),
                columns = parsed.headers.len(),
                "delimiter rejected: fewer than 2 columns"
            );
            continue;
        }

        if parsed.skipped > 0 {
            tracing::warn!(
                "Skipped {} malformed line(s) while parsing with delimiter {}",
                parsed.skipped,
                delimiter_label(delimiter)
            );
        }

        let diagnostic = format!(
            "Decoded {} row(s) x {} column(s) using {} encoding and {} delimiter{}",
            parsed.rows.len(),
            parsed.headers.len(),
            encoding.name(),
            delimiter_label(delimiter),
            if parsed.skipped > 0 {
                format!(" ({} malformed line(s) skipped)", parsed.skipped)
            } else {
                String::new()
            }
        );
        tracing::info!("{diagnostic}");

        return Ok(DecodedTable {
            table: RawTable::new(parsed.headers, parsed.rows),
            encoding: encoding.name(),
            delimiter,
            skipped_lines: parsed.skipped,
            diagnostic,
        });
    }

    Err(PipelineError::Decode(
        "no supported delimiter (comma, semicolon, tab, pipe, space, colon) produced at least 2 columns"
            .to_string(),
    ))
}

/// Human-readable name of a delimiter byte.
pub fn delimiter_label(delimiter: u8) -> &'static str {
    match delimiter {
        b',' => "comma",
        b';' => "semicolon",
        b'\t' => "tab",
        b'|' => "pipe",
        b' ' => "space",
        b':' => "colon",
        _ => "custom",
    }
}

/// Pick the charset for `bytes`.
///
/// A BOM is authoritative. Valid UTF-8 (including pure ASCII and empty input)
/// is treated as UTF-8; only otherwise do we ask the statistical detector.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn decode_text(bytes: &[u8]) -> Result<(String, &'static Encoding), PipelineError> {
    let encoding = detect_encoding(bytes);
    // `decode` removes a BOM if present and reports the encoding it implied.
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PipelineError::Decode(format!(
            "bytes are not valid {} text",
            actual.name()
        )));
    }
    tracing::debug!(encoding = actual.name(), "charset detected");
    Ok((text.into_owned(), actual))
}

fn parse_with_delimiter(text: &str, delimiter: u8) -> Result<Parsed, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header_name).collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) if record.len() <= headers.len() => rows.push(record_to_row(&record, headers.len())),
            Ok(_) | Err(_) => skipped += 1,
        }
    }

    Ok(Parsed {
        headers,
        rows,
        skipped,
    })
}

/// Missing trailing fields become empty (missing) cells.
fn record_to_row(record: &StringRecord, width: usize) -> Vec<String> {
    let mut row: Vec<String> = record.iter().map(str::to_string).collect();
    row.resize(width, String::new());
    row
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes leave a BOM glued to the first header even
    // after charset decoding (e.g. a BOM inside a re-encoded file).
    name.trim().trim_start_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_comma_for_comma_separated() {
        let decoded = decode(b"a,b,c\n1,2,3\n4,5,6").unwrap();
        assert_eq!(decoded.delimiter, b',');
        assert_eq!(decoded.table.columns, vec!["a", "b", "c"]);
        assert_eq!(decoded.table.row_count(), 2);
        assert_eq!(decoded.table.rows[1], vec!["4", "5", "6"]);
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn picks_semicolon_when_comma_gives_one_column() {
        let decoded = decode(b"a;b\n1;2").unwrap();
        assert_eq!(decoded.delimiter, b';');
        assert_eq!(decoded.table.column_count(), 2);
        assert_eq!(decoded.table.cell(0, "b"), Some("2"));
    }

    #[test]
    fn picks_tab_and_pipe() {
        assert_eq!(decode(b"ds\ty\n2020-01-01\t5").unwrap().delimiter, b'\t');
        assert_eq!(decode(b"ds|y\n2020-01-01|5").unwrap().delimiter, b'|');
    }

    #[test]
    fn skips_malformed_lines() {
        let decoded = decode(b"ds,y\n2020-01-01,1\n2020-02-01,2,extra\n2020-03-01,3\n").unwrap();
        assert_eq!(decoded.table.row_count(), 2);
        assert_eq!(decoded.skipped_lines, 1);
        assert!(decoded.diagnostic.contains("1 malformed line(s) skipped"));
    }

    #[test]
    fn short_rows_are_padded() {
        let decoded = decode(b"date,sales,note\n2021-01-01,5\n2021-04-01,6,promo\n2021-07-01,7\n").unwrap();
        assert_eq!(decoded.skipped_lines, 0);
        assert_eq!(decoded.table.row_count(), 3);
        assert_eq!(decoded.table.rows[0], vec!["2021-01-01", "5", ""]);
        assert_eq!(decoded.table.cell(1, "note"), Some("promo"));
        assert_eq!(decoded.table.cell(2, "sales"), Some("7"));
    }

    #[test]
    fn picks_space_and_colon() {
        let decoded = decode(b"ds y\n2020-01-01 5\n2020-02-01 6\n").unwrap();
        assert_eq!(decoded.delimiter, b' ');
        assert_eq!(decoded.table.cell(1, "y"), Some("6"));

        let decoded = decode(b"period:units\n202001:5\n202002:6\n").unwrap();
        assert_eq!(decoded.delimiter, b':');
        assert_eq!(delimiter_label(decoded.delimiter), "colon");
        assert_eq!(decoded.table.cell(0, "period"), Some("202001"));
    }

    #[test]
    fn undecodable_bytes_are_a_decode_failure() {
        // UTF-16LE BOM, "a,b\n", then a dangling odd byte.
        let mut bytes = vec![0xff, 0xfe];
        for ch in "a,b\n1,2\n".encode_utf16() {
            bytes.extend_from_slice(&ch.to_le_bytes());
        }
        bytes.push(b'x');
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(ref m) if m.contains("UTF-16LE")));
    }

    #[test]
    fn single_column_is_a_decode_failure() {
        let err = decode(b"value\n1\n2\n").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn empty_input_is_a_decode_failure() {
        assert!(matches!(decode(b"").unwrap_err(), PipelineError::Decode(_)));
    }

    #[test]
    fn strips_utf8_bom() {
        let decoded = decode(b"\xef\xbb\xbfdate,sales\n2021-01-01,10\n").unwrap();
        assert_eq!(decoded.table.columns[0], "date");
    }

    #[test]
    fn non_utf8_bytes_go_through_detector() {
        let bytes = b"city;value\nM\xfcnchen;1\nK\xf6ln;2\nD\xfcsseldorf;3\n";
        assert!(std::str::from_utf8(bytes).is_err());
        let decoded = decode(bytes).unwrap();
        assert_ne!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.delimiter, b';');
        assert_eq!(decoded.table.row_count(), 3);
        assert_eq!(decoded.table.cell(2, "value"), Some("3"));
    }
}
