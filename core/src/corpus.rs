//! Segmenting a gzip stream of `<DOC>` records and pulling out their fields.

use crate::{DocDate, Error, Result};
use flate2::read::MultiGzDecoder;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const DOC_CLOSE: &str = "</DOC>";

lazy_static! {
    static ref DOCNO_RE: Regex = Regex::new(r"<DOCNO>(.+?)</DOCNO>").expect("valid regex");
    static ref HEADLINE_P_RE: Regex = Regex::new(r"(?s)<HEADLINE>\s*<P>(.*?)</P>").expect("valid regex");
    static ref TEXT_BLOCK_RES: [Regex; 3] = [
        Regex::new(r"(?s)<HEADLINE>(.*?)</HEADLINE>").expect("valid regex"),
        Regex::new(r"(?s)<TEXT>(.*?)</TEXT>").expect("valid regex"),
        Regex::new(r"(?s)<GRAPHIC>(.*?)</GRAPHIC>").expect("valid regex"),
    ];
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("valid regex");
}

/// One well-formed record, ready for tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDoc {
    pub docno: String,
    pub date: DocDate,
    pub headline: String,
    /// Searchable text: headline, body and graphic caption with tags stripped.
    pub text: String,
}

/// Lazily splits a line stream into raw records, each ending on the line
/// that contains `</DOC>`. Non-blank input left after the last `</DOC>` is
/// yielded as a final record; [`parse_record`] rejects it as malformed.
pub struct Records<R> {
    reader: R,
    line: Vec<u8>,
    done: bool,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: Vec::new(), done: false }
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut record = String::new();
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.done = true;
                    if record.trim().is_empty() {
                        return None;
                    }
                    tracing::warn!(bytes = record.len(), "input ends inside a record");
                    return Some(Ok(record));
                }
                Ok(_) => {
                    let text = String::from_utf8_lossy(&self.line);
                    let text = text.trim_end_matches(['\n', '\r']);
                    record.push_str(text);
                    record.push('\n');
                    if text.contains(DOC_CLOSE) {
                        return Some(Ok(record));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

pub type GzRecords = Records<BufReader<MultiGzDecoder<File>>>;

/// Open a gzip-compressed corpus for record-by-record reading.
pub fn open_corpus(path: &Path) -> Result<GzRecords> {
    let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
    Ok(Records::new(BufReader::new(MultiGzDecoder::new(file))))
}

/// Extract the fields of one raw record.
pub fn parse_record(raw: &str) -> Result<ParsedDoc> {
    if !raw.contains(DOC_CLOSE) {
        return Err(Error::MalformedRecord("record is not closed by </DOC>".into()));
    }
    let flat = raw.replace('\n', "");

    let docno_raw = DOCNO_RE
        .captures(&flat)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::MalformedRecord("no <DOCNO> element".into()))?;
    let docno = docno_raw.trim().to_string();
    let date = date_from_docno(docno_raw)
        .ok_or_else(|| Error::MalformedRecord(format!("cannot derive a date from docno {docno:?}")))?;

    let headline = HEADLINE_P_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let mut text = String::new();
    for re in TEXT_BLOCK_RES.iter() {
        if let Some(m) = re.captures(&flat).and_then(|c| c.get(1)) {
            text.push(' ');
            text.push_str(m.as_str());
        }
    }
    let text = TAG_RE.replace_all(&text, "").into_owned();

    Ok(ParsedDoc { docno, date, headline, text })
}

/// Month, day and two-digit year sit at character offsets 3..5, 5..7 and 7..9
/// of the docno capture, which includes the space after `<DOCNO>`.
fn date_from_docno(docno: &str) -> Option<DocDate> {
    let chars: Vec<char> = docno.chars().collect();
    let field = |from: usize| -> Option<u16> {
        let digits = chars.get(from..from + 2)?;
        if !digits.iter().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.iter().collect::<String>().parse().ok()
    };
    let month = field(3)?;
    let day = field(5)?;
    let year = field(7)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(DocDate { month: month as u8, day: day as u8, year: 1900 + year })
}
