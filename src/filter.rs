// nrcq - CLI for the NagRestConf REST API
// Copyright (C) 2014  Mark Clarkson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Client side `option:regex[,option:regex]...` filtering.

use crate::error::{NrcqError, Result};
use crate::handler::Record;
use crate::registry::ResourceSchema;
use regex::Regex;
use tracing::debug;

#[derive(Debug)]
struct Clause {
    field: &'static str,
    pattern: Regex,
}

/// All clauses must match for a record to be kept.
#[derive(Debug, Default)]
pub struct FilterSpec {
    clauses: Vec<Clause>,
}

impl FilterSpec {
    /// Parse a filter string against a table schema. An empty string
    /// yields a filter that keeps everything.
    pub fn parse(expr: &str, schema: &ResourceSchema) -> Result<Self> {
        if expr.is_empty() {
            return Ok(Self::default());
        }

        let clauses = expr
            .split(',')
            .map(|clause| -> Result<Clause> {
                let invalid = |reason: String| NrcqError::InvalidFilter {
                    clause: clause.to_string(),
                    reason,
                };
                let (name, pattern) = clause
                    .split_once(':')
                    .ok_or_else(|| invalid("expected option:regex".into()))?;
                let field = schema
                    .fields
                    .iter()
                    .find(|f| **f == name)
                    .copied()
                    .ok_or_else(|| {
                        invalid(format!("`{name}` is not an option of {}", schema.name))
                    })?;
                let pattern = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
                Ok(Clause { field, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(clauses = clauses.len(), "compiled filter");
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| {
            record
                .get(clause.field)
                .is_some_and(|value| clause.pattern.is_match(value))
        })
    }

    /// Keep matching records, preserving their order.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
