use std::io::{BufRead, Lines};

use adtree_dn::DistinguishedName;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use super::{LdifError, ReaderOptions};
use crate::models::{AttributeValue, LdifRecord};

const DN: &str = "dn";
const OBJECT_GUID: &str = "objectGUID";
const VERSION: &str = "version";

/// Where a read currently is. Each reader owns its own context, so
/// concurrent reads never share line numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadContext {
    line: usize,
    records: usize,
}

impl ReadContext {
    /// Number of physical lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of records produced so far.
    pub fn records(&self) -> usize {
        self.records
    }
}

/// An unfolded line, tagged with the physical line it started on.
struct LogicalLine {
    line: usize,
    text: String,
}

enum RawValue<'a> {
    Text(&'a str),
    Base64(&'a str),
    Url(&'a str),
}

/// Streams [`LdifRecord`]s out of any buffered reader.
///
/// Reading stops at the first error; the failing record is never produced.
pub struct LdifReader<R> {
    lines: Lines<R>,
    options: ReaderOptions,
    context: ReadContext,
    at_start: bool,
    finished: bool,
}

impl<R: BufRead> LdifReader<R> {
    pub fn new(input: R, options: ReaderOptions) -> Self {
        Self {
            lines: input.lines(),
            options,
            context: ReadContext::default(),
            at_start: true,
            finished: false,
        }
    }

    pub fn context(&self) -> ReadContext {
        self.context
    }

    fn read_record(&mut self) -> Result<Option<LdifRecord>, LdifError> {
        loop {
            let mut chunk = self.next_chunk()?;
            if chunk.is_empty() {
                return Ok(None);
            }

            if self.at_start {
                self.at_start = false;
                if is_version_line(&chunk[0].text) {
                    chunk.remove(0);
                    if chunk.is_empty() {
                        continue;
                    }
                }
            }

            return self.build_record(&chunk).map(Some);
        }
    }

    /// Collects the unfolded lines of the next record. Empty only at end of input.
    fn next_chunk(&mut self) -> Result<Vec<LogicalLine>, LdifError> {
        let mut chunk: Vec<LogicalLine> = Vec::new();
        let mut in_comment = false;

        for line in self.lines.by_ref() {
            let line = line?;
            self.context.line += 1;
            let text = line.strip_suffix('\r').unwrap_or(&line);

            if text.is_empty() {
                if chunk.is_empty() {
                    in_comment = false;
                    continue;
                }
                break;
            }

            if let Some(folded) = text.strip_prefix(' ') {
                if in_comment {
                    continue;
                }
                match chunk.last_mut() {
                    Some(last) => last.text.push_str(folded),
                    None => {
                        return Err(LdifError::InvalidLine {
                            line: self.context.line,
                        });
                    }
                }
                continue;
            }

            in_comment = text.starts_with('#');
            if !in_comment {
                chunk.push(LogicalLine {
                    line: self.context.line,
                    text: text.to_string(),
                });
            }
        }

        Ok(chunk)
    }

    fn build_record(&mut self, chunk: &[LogicalLine]) -> Result<LdifRecord, LdifError> {
        let (first, rest) = chunk.split_first().ok_or(LdifError::MissingDn {
            line: self.context.line,
        })?;

        let (name, raw) = split_attribute(first)?;
        if !name.eq_ignore_ascii_case(DN) {
            return Err(LdifError::MissingDn { line: first.line });
        }
        let dn_text = match raw {
            RawValue::Text(text) => text.to_string(),
            RawValue::Url(_) => return Err(LdifError::DnUrl { line: first.line }),
            RawValue::Base64(encoded) => {
                let bytes = decode_base64(first.line, name, encoded)?;
                String::from_utf8(bytes)
                    .map_err(|_| LdifError::DnEncoding { line: first.line })?
            }
        };
        let dn = DistinguishedName::try_from(dn_text).map_err(|source| LdifError::InvalidDn {
            line: first.line,
            source,
        })?;

        let mut record = LdifRecord::new(dn);
        for line in rest {
            let (name, raw) = split_attribute(line)?;
            let value = self.decode_value(line.line, name, raw)?;
            record.push(name, value, self.options.scalar);
        }

        self.context.records += 1;
        log::debug!(
            "Read record {} at line {}: {} ({} attributes)",
            self.context.records,
            first.line,
            record.dn(),
            record.attributes().len()
        );
        Ok(record)
    }

    fn decode_value(
        &self,
        line: usize,
        name: &str,
        raw: RawValue<'_>,
    ) -> Result<AttributeValue, LdifError> {
        match raw {
            RawValue::Text(text) | RawValue::Url(text) => {
                Ok(AttributeValue::Text(text.to_string()))
            }
            RawValue::Base64(encoded) if name.eq_ignore_ascii_case(OBJECT_GUID) => {
                if self.options.raw_guid {
                    return Ok(AttributeValue::Text(encoded.to_string()));
                }
                let bytes = decode_base64(line, name, encoded)?;
                let le_bytes = <[u8; 16]>::try_from(bytes.as_slice())
                    .map_err(|_| LdifError::InvalidGuid {
                        line,
                        len: bytes.len(),
                    })?;
                // AD stores the first three GUID fields little-endian
                Ok(AttributeValue::Guid(Uuid::from_bytes_le(le_bytes)))
            }
            RawValue::Base64(encoded) => {
                let bytes = decode_base64(line, name, encoded)?;
                Ok(match String::from_utf8(bytes) {
                    Ok(text) => AttributeValue::Text(text),
                    Err(err) => AttributeValue::Binary(err.into_bytes()),
                })
            }
        }
    }
}

impl<R: BufRead> Iterator for LdifReader<R> {
    type Item = Result<LdifRecord, LdifError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                log::warn!("Stopped reading LDIF at line {}: {err}", self.context.line);
                Some(Err(err))
            }
        }
    }
}

/// Reads every record from in-memory LDIF text.
pub fn parse_ldif(text: &str, options: ReaderOptions) -> Result<Vec<LdifRecord>, LdifError> {
    LdifReader::new(text.as_bytes(), options).collect()
}

fn split_attribute(line: &LogicalLine) -> Result<(&str, RawValue<'_>), LdifError> {
    let invalid = || LdifError::InvalidLine { line: line.line };
    let (name, rest) = line.text.split_once(':').ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }

    let raw = if let Some(encoded) = rest.strip_prefix(':') {
        RawValue::Base64(encoded.trim())
    } else if let Some(url) = rest.strip_prefix('<') {
        RawValue::Url(url.trim())
    } else {
        RawValue::Text(rest.trim_start_matches(' '))
    };
    Ok((name, raw))
}

fn decode_base64(line: usize, attribute: &str, encoded: &str) -> Result<Vec<u8>, LdifError> {
    STANDARD
        .decode(encoded)
        .map_err(|source| LdifError::Base64 {
            line,
            attribute: attribute.to_string(),
            source,
        })
}

fn is_version_line(text: &str) -> bool {
    text.split_once(':')
        .is_some_and(|(name, _)| name.eq_ignore_ascii_case(VERSION))
}
