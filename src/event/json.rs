// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::errors::SourceError;
use crate::event::{Event, EventSource};
use crate::store::Value;

/// Reads one JSON object per line. `null` fields are treated as absent.
pub struct JsonLinesSource<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn parse(&self, text: &str) -> Result<Event, SourceError> {
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| SourceError::Parse {
                line: self.line,
                reason: e.to_string(),
            })?;
        if !parsed.is_object() {
            return Err(SourceError::NotAnObject { line: self.line });
        }
        let fields: HashMap<String, Option<Value>> =
            serde_json::from_value(parsed).map_err(|e| SourceError::Parse {
                line: self.line,
                reason: e.to_string(),
            })?;
        Ok(fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect())
    }
}

impl<R: BufRead + Send> EventSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Option<Result<Event, SourceError>> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(SourceError::Io(e))),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return Some(self.parse(&text));
        }
    }
}
