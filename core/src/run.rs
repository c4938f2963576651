//! Run-file lines: `<topic> Q0 <docno> <rank> <score> <tag>`.

use crate::{Error, Result};
use std::fmt;
use std::io::Write;

pub const BM25_RUN_TAG: &str = "trecBM25";
pub const AND_RUN_TAG: &str = "trecAND";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunScore {
    Relevance(f64),
    /// Boolean runs carry the number of documents ranked below the entry.
    Remaining(usize),
}

impl fmt::Display for RunScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunScore::Relevance(s) => write!(f, "{s}"),
            RunScore::Remaining(n) => write!(f, "{n}"),
        }
    }
}

impl RunScore {
    pub fn value(&self) -> f64 {
        match *self {
            RunScore::Relevance(s) => s,
            RunScore::Remaining(n) => n as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub topic: u32,
    pub docno: String,
    pub rank: usize,
    pub score: RunScore,
    pub tag: String,
}

/// Borrowed view of one run line; the only place the line layout is written.
struct RunLine<'a> {
    topic: u32,
    docno: &'a str,
    rank: usize,
    score: RunScore,
    tag: &'a str,
}

impl fmt::Display for RunLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q0 {} {} {} {}", self.topic, self.docno, self.rank, self.score, self.tag)
    }
}

impl fmt::Display for RunEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        RunLine { topic: self.topic, docno: &self.docno, rank: self.rank, score: self.score, tag: &self.tag }.fmt(f)
    }
}

impl RunEntry {
    /// Parse one line. `line_no` is only used for the error message.
    pub fn parse(line_no: usize, line: &str) -> Result<Self> {
        let bad = |reason: String| Error::MalformedRunLine { line: line_no, reason };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(bad(format!("expected 6 fields, found {}", fields.len())));
        }
        let topic = fields[0].parse().map_err(|_| bad(format!("topic {:?} is not an integer", fields[0])))?;
        let rank = fields[3].parse().map_err(|_| bad(format!("rank {:?} is not an integer", fields[3])))?;
        let score: f64 = fields[4].parse().map_err(|_| bad(format!("score {:?} is not a number", fields[4])))?;
        Ok(Self {
            topic,
            docno: fields[2].to_string(),
            rank,
            score: RunScore::Relevance(score),
            tag: fields[5].to_string(),
        })
    }
}

/// Writes run lines for one topic at a time, numbering ranks from 1.
pub struct RunWriter<W: Write> {
    out: W,
    tag: String,
    lines: usize,
}

impl<W: Write> RunWriter<W> {
    pub fn new(out: W, tag: impl Into<String>) -> Self {
        Self { out, tag: tag.into(), lines: 0 }
    }

    pub fn write_topic<'d, I>(&mut self, topic: u32, ranked: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'d str, RunScore)>,
    {
        let mut rank = 0;
        for (docno, score) in ranked {
            rank += 1;
            writeln!(self.out, "{}", RunLine { topic, docno, rank, score, tag: &self.tag })?;
        }
        self.lines += rank;
        Ok(rank)
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_contiguous_ranks() {
        let mut w = RunWriter::new(Vec::new(), "tag");
        w.write_topic(401, [("LA1", RunScore::Relevance(2.5)), ("LA2", RunScore::Relevance(1.25))]).unwrap();
        w.write_topic(402, [("LA3", RunScore::Remaining(0))]).unwrap();
        assert_eq!(w.lines(), 3);
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(text, "401 Q0 LA1 1 2.5 tag\n401 Q0 LA2 2 1.25 tag\n402 Q0 LA3 1 0 tag\n");
    }

    #[test]
    fn parses_what_it_writes() {
        let entry = RunEntry::parse(1, "401 Q0 LA010189-0001 3 -0.75 trecBM25").unwrap();
        assert_eq!(entry.topic, 401);
        assert_eq!(entry.rank, 3);
        assert_eq!(entry.score, RunScore::Relevance(-0.75));
        assert_eq!(entry.to_string(), "401 Q0 LA010189-0001 3 -0.75 trecBM25");
    }

    #[test]
    fn written_lines_read_back_unchanged() {
        let mut w = RunWriter::new(Vec::new(), "trecBM25");
        w.write_topic(7, [("LA010189-0001", RunScore::Relevance(-0.125)), ("LA010289-0002", RunScore::Relevance(3.0))])
            .unwrap();
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        for (i, line) in text.lines().enumerate() {
            assert_eq!(RunEntry::parse(i + 1, line).unwrap().to_string(), line);
        }
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(RunEntry::parse(4, "401 Q0 LA1 1 2.5"), Err(Error::MalformedRunLine { line: 4, .. })));
        assert!(RunEntry::parse(1, "x Q0 LA1 1 2.5 t").is_err());
        assert!(RunEntry::parse(1, "1 Q0 LA1 1 high t").is_err());
    }
}
