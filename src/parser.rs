//! Loader for the plain-text repository format.
//!
//! Each line is one tab-separated record:
//!
//! ```text
//! C  <contig>  <length>  [current|superseded]
//! T  <template>  <silow>  <sihigh>
//! R  <read>  <template>  F|R
//! M  <read>  <contig>  <cstart>  <cfinish>  +|-
//! ```
//!
//! Lines starting with `#` are comments. Contigs are current unless
//! marked as superseded.

pub mod error;

pub use self::error::*;

use std::path::Path;

use bstr::ByteSlice;
use lazy_static::lazy_static;
use log::{debug, info};
use nom::{branch::alt, bytes::complete::tag, combinator::map, IResult};
use regex::bytes::Regex;

use crate::contig::*;
use crate::repository::MemoryRepository;

/// A parsed repository record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Contig { contig: Contig, current: bool },
    Template { id: TemplateId, size: InsertSize },
    Read { read: ReadId, template: TemplateId, strand: Strand },
    Mapping { read: ReadId, mapping: ContigMapping },
    Comment,
}

impl Line {
    /// Store the record in the repository
    pub fn apply(self, repo: &mut MemoryRepository) -> anyhow::Result<()> {
        match self {
            Line::Contig { contig, current } => {
                repo.add_contig(contig.id, contig.length, current)?;
            }
            Line::Template { id, size } => {
                repo.add_template(id, size.low, size.high)?;
            }
            Line::Read {
                read,
                template,
                strand,
            } => repo.add_read(read, template, strand),
            Line::Mapping { read, mapping } => repo.add_mapping(read, mapping),
            Line::Comment => (),
        }
        Ok(())
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct RepoParser {
    tolerance: ParserTolerance,
}

impl RepoParser {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_tolerance(tolerance: ParserTolerance) -> Self {
        RepoParser { tolerance }
    }

    pub fn tolerance(&self) -> ParserTolerance {
        self.tolerance
    }

    /// Parse a single line, without a trailing newline
    pub fn parse_line(&self, line: &[u8]) -> ParseResult<Line> {
        let mut line = line;
        while let Some((b'\n', rest)) | Some((b'\r', rest)) = line.split_last() {
            line = rest;
        }

        if line.is_empty() {
            return Err(ParseError::EmptyLine);
        }
        if line[0] == b'#' {
            return Ok(Line::Comment);
        }

        let mut fields = line.split_str(b"\t");
        let kind = fields.next().ok_or(ParseError::EmptyLine)?;

        let result = match kind {
            b"C" => parse_contig(&mut fields),
            b"T" => parse_template(&mut fields),
            b"R" => parse_read(&mut fields),
            b"M" => parse_mapping(&mut fields),
            _ => return Err(ParseError::UnknownLineType),
        };

        result.map_err(|err| ParseError::invalid_line(err, 0, line))
    }

    /// Load every record from an iterator over lines. Line numbers in
    /// errors start from 1.
    pub fn parse_lines<'a, I>(&self, lines: I) -> ParseResult<MemoryRepository>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut repo = MemoryRepository::new();
        let mut skipped = 0;

        for (ix, line) in lines.into_iter().enumerate() {
            let num = ix + 1;
            let parsed = self.parse_line(line).and_then(|record| {
                record.apply(&mut repo).map_err(|_| {
                    ParseError::invalid_line(
                        ParseFieldError::InvalidField("record"),
                        num,
                        line,
                    )
                })
            });

            match parsed {
                Ok(()) => (),
                Err(ParseError::InvalidLine(err, _, text)) => {
                    let err = ParseError::InvalidLine(err, num, text);
                    if !err.can_safely_continue(&self.tolerance) {
                        return Err(err);
                    }
                    debug!("Skipping line: {}", err);
                    skipped += 1;
                }
                Err(err) => {
                    if !err.can_safely_continue(&self.tolerance) {
                        return Err(err);
                    }
                    skipped += 1;
                }
            }
        }

        info!(
            "Loaded {} contigs and {} reads, skipped {} lines",
            repo.contig_count(),
            repo.read_count(),
            skipped
        );

        Ok(repo)
    }

    /// Load a repository file by memory-mapping it
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> ParseResult<MemoryRepository> {
        let file = std::fs::File::open(path.as_ref())?;
        let metadata = file.metadata()?;
        if metadata.len() == 0 {
            return self.parse_lines(std::iter::empty());
        }

        let mmap = unsafe { memmap::Mmap::map(&file)? };
        let bytes: &[u8] = mmap.as_ref();
        self.parse_lines(bytes.lines())
    }
}

fn next_field<'a, I>(fields: &mut I) -> FieldResult<&'a [u8]>
where
    I: Iterator<Item = &'a [u8]>,
{
    fields.next().ok_or(ParseFieldError::MissingFields)
}

fn parse_int(input: &[u8], name: &'static str) -> FieldResult<i64> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[-+]?[0-9]+$").unwrap();
    }
    if !RE.is_match(input) {
        return Err(ParseFieldError::InvalidField(name));
    }
    Ok(input.to_str()?.parse()?)
}

fn parse_id(input: &[u8]) -> FieldResult<u32> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
    }
    if !RE.is_match(input) {
        return Err(ParseFieldError::UintIdError);
    }
    input
        .to_str()?
        .parse()
        .map_err(|_| ParseFieldError::UintIdError)
}

fn parse_current(input: &[u8]) -> FieldResult<bool> {
    let current = map(tag("current"), |_| true);
    let superseded = map(tag("superseded"), |_| false);
    let result: IResult<_, _> = alt((current, superseded))(input);
    match result {
        Ok((rest, c)) if rest.is_empty() => Ok(c),
        _ => Err(ParseFieldError::InvalidField("status")),
    }
}

fn parse_strand(input: &[u8]) -> FieldResult<Strand> {
    let fwd = map(tag("F"), |_| Strand::Forward);
    let rev = map(tag("R"), |_| Strand::Reverse);
    let result: IResult<_, _> = alt((fwd, rev))(input);
    match result {
        Ok((rest, s)) if rest.is_empty() => Ok(s),
        _ => Err(ParseFieldError::InvalidField("strand")),
    }
}

fn parse_contig<'a, I>(fields: &mut I) -> FieldResult<Line>
where
    I: Iterator<Item = &'a [u8]>,
{
    let id = parse_id(next_field(fields)?)?;
    let length = parse_int(next_field(fields)?, "length")?;
    let current = match fields.next() {
        Some(status) => parse_current(status)?,
        None => true,
    };
    let contig =
        Contig::new(id, length).ok_or(ParseFieldError::InvalidField("length"))?;
    Ok(Line::Contig { contig, current })
}

fn parse_template<'a, I>(fields: &mut I) -> FieldResult<Line>
where
    I: Iterator<Item = &'a [u8]>,
{
    let id = parse_id(next_field(fields)?)?;
    let low = parse_int(next_field(fields)?, "silow")?;
    let high = parse_int(next_field(fields)?, "sihigh")?;
    let size = InsertSize::new(low, high)
        .ok_or(ParseFieldError::InvalidField("insert size"))?;
    Ok(Line::Template { id, size })
}

fn parse_read<'a, I>(fields: &mut I) -> FieldResult<Line>
where
    I: Iterator<Item = &'a [u8]>,
{
    let read = parse_id(next_field(fields)?)?;
    let template = parse_id(next_field(fields)?)?;
    let strand = parse_strand(next_field(fields)?)?;
    Ok(Line::Read {
        read,
        template,
        strand,
    })
}

fn parse_mapping<'a, I>(fields: &mut I) -> FieldResult<Line>
where
    I: Iterator<Item = &'a [u8]>,
{
    let read = parse_id(next_field(fields)?)?;
    let contig = parse_id(next_field(fields)?)?;
    let start = parse_int(next_field(fields)?, "cstart")?;
    let finish = parse_int(next_field(fields)?, "cfinish")?;
    let orientation = Orientation::parse_error(Orientation::from_bytes_plus_minus(
        next_field(fields)?,
    ))?;
    Ok(Line::Mapping {
        read,
        mapping: ContigMapping {
            contig,
            start,
            finish,
            orientation,
        },
    })
}
