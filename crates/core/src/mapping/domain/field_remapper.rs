use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use super::field_selector::FieldSelector;
use super::mapping_error::MappingError;

/// Table-driven substitution over whitespace-delimited records.
#[derive(Debug, Clone, Default)]
pub struct FieldRemapper {
    table: HashMap<String, String>,
    blank_missing: bool,
}

impl FieldRemapper {
    /// Build from `(key, value)` pairs; `flip` swaps their roles. Later pairs
    /// win on duplicate keys.
    pub fn from_pairs<I, K, V>(pairs: I, flip: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = pairs
            .into_iter()
            .map(|(k, v)| {
                let (k, v) = (k.into(), v.into());
                if flip {
                    (v, k)
                } else {
                    (k, v)
                }
            })
            .collect();
        Self {
            table,
            blank_missing: false,
        }
    }

    /// Table format: `key value` per line. Blank lines are ignored.
    pub fn from_reader<R: BufRead>(reader: R, flip: bool) -> Result<Self, MappingError> {
        let mut pairs = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [] => continue,
                [key, value] => pairs.push((key.to_string(), value.to_string())),
                _ => {
                    return Err(MappingError::MalformedTableLine {
                        line_number: i + 1,
                        line,
                    })
                }
            }
        }
        Ok(Self::from_pairs(pairs, flip))
    }

    pub fn load(path: &Path, flip: bool) -> Result<Self, MappingError> {
        let file = File::open(path).map_err(|e| MappingError::File {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(BufReader::new(file), flip)
    }

    /// Replace unmapped fields with an empty string instead of failing.
    pub fn with_blank_missing(mut self, blank_missing: bool) -> Self {
        self.blank_missing = blank_missing;
        self
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.table.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rewrite the selected fields of one record, re-joined with single spaces.
    pub fn remap_record(&self, record: &str, selector: &FieldSelector) -> Result<String, MappingError> {
        let mut tokens: Vec<&str> = record.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(String::new());
        }
        for index in selector.resolve(tokens.len())? {
            tokens[index] = match self.lookup(tokens[index]) {
                Some(value) => value,
                None if self.blank_missing => "",
                None => {
                    return Err(MappingError::LookupMiss {
                        key: tokens[index].to_string(),
                    })
                }
            };
        }
        Ok(tokens.join(" "))
    }

    /// Lazily remap a sequence of lines, preserving their order.
    pub fn remap_lines<'a, I>(
        &'a self,
        lines: I,
        selector: &'a FieldSelector,
    ) -> impl Iterator<Item = Result<String, MappingError>> + 'a
    where
        I: IntoIterator<Item = io::Result<String>>,
        I::IntoIter: 'a,
    {
        lines.into_iter().enumerate().map(move |(i, line)| -> Result<String, MappingError> {
            let line = line?;
            self.remap_record(&line, selector)
                .map_err(|e| MappingError::Record {
                    line: i + 1,
                    source: Box::new(e),
                })
        })
    }

    /// Remap `reader` into `writer` one line at a time; returns the record count.
    pub fn remap_stream<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
        selector: &FieldSelector,
    ) -> Result<usize, MappingError> {
        let mut count = 0;
        for record in self.remap_lines(reader.lines(), selector) {
            writeln!(writer, "{}", record?)?;
            count += 1;
        }
        writer.flush()?;
        Ok(count)
    }
}
