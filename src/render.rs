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

//! Plain text and JSON output. Every function returns the text without a
//! trailing newline; the caller prints it.

use crate::handler::Record;
use crate::registry::FieldDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};

const LINE_WIDTH: usize = 79;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderOpts {
    pub mode: OutputMode,
    /// Also show options whose value is empty.
    pub complete: bool,
    /// Strip whitespace from JSON output.
    pub packed: bool,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            mode: OutputMode::Plain,
            complete: false,
            packed: false,
        }
    }
}

pub fn render_records(records: &[Record], opts: &RenderOpts) -> String {
    let visible = |value: &str| opts.complete || !value.is_empty();

    match opts.mode {
        OutputMode::Json => {
            let rows: Vec<Value> = records
                .iter()
                .map(|record| {
                    let row: Map<String, Value> = record
                        .iter()
                        .filter(|&(_, value)| visible(value))
                        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                        .collect();
                    Value::Object(row)
                })
                .collect();
            to_json(&rows, opts.packed)
        }
        OutputMode::Plain => {
            records
                .iter()
                .map(|record| {
                    wrap_tokens(
                        record
                            .iter()
                            .filter(|&(_, value)| visible(value))
                            .map(|(name, value)| format!("{name}:{}", quote(value))),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    }
}

/// Options of a table; required ones are starred in plain mode.
pub fn render_fields(
    fields: &[&'static str],
    required: &[&'static str],
    opts: &RenderOpts,
) -> String {
    match opts.mode {
        OutputMode::Json => {
            let descriptors: Vec<FieldDescriptor> = fields
                .iter()
                .map(|&name| FieldDescriptor {
                    name,
                    required: required.contains(&name),
                })
                .collect();
            to_json(&descriptors, opts.packed)
        }
        OutputMode::Plain => {
            let tokens = fields.iter().map(|field| {
                let marker = if required.contains(field) { "*" } else { "" };
                (marker, field.to_string())
            });
            format!("\n{}\n", wrap_marked(tokens))
        }
    }
}

pub fn render_endpoints(endpoints: &[String], opts: &RenderOpts) -> String {
    match opts.mode {
        OutputMode::Json => to_json(endpoints, opts.packed),
        OutputMode::Plain => format!("\n{}\n", wrap_tokens(endpoints.iter().cloned())),
    }
}

pub fn render_lines(lines: &[String], opts: &RenderOpts) -> String {
    match opts.mode {
        OutputMode::Json => to_json(lines, opts.packed),
        OutputMode::Plain => lines.join("\n"),
    }
}

/// Lay tokens out two spaces apart, breaking before a line would pass
/// column 79.
pub fn wrap_tokens(tokens: impl IntoIterator<Item = String>) -> String {
    wrap_marked(tokens.into_iter().map(|token| ("", token)))
}

// A marker counts toward the line it is placed on but is not carried into
// the column count of a fresh line.
fn wrap_marked<'a>(tokens: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut out = String::new();
    let mut column = 0;
    for (marker, token) in tokens {
        let width = token.chars().count() + 2;
        column += width + marker.chars().count();
        if column > LINE_WIDTH && !out.is_empty() {
            out.push('\n');
            column = width;
        }
        out.push_str("  ");
        out.push_str(marker);
        out.push_str(&token);
    }
    out
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, packed: bool) -> String {
    let rendered = if packed {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Response;
    use crate::registry;

    fn hosts() -> Vec<Record> {
        let handler = registry::lookup("hosts", false).unwrap();
        let raw = r#"[{"name":"server1","alias":"","ipaddress":"10.0.0.1"}]"#;
        match handler.parse_response(raw).unwrap() {
            Response::Records(r) => r,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn json(complete: bool, packed: bool) -> RenderOpts {
        RenderOpts {
            mode: OutputMode::Json,
            complete,
            packed,
        }
    }

    #[test]
    fn json_omits_empty_fields_by_default() {
        let out = render_records(&hosts(), &json(false, true));
        assert_eq!(out, r#"[{"name":"server1","ipaddress":"10.0.0.1"}]"#);
    }

    #[test]
    fn complete_flag_shows_empty_fields() {
        let out = render_records(&hosts(), &json(true, true));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["alias"], "");
        let fields = registry::schema("hosts").unwrap().fields.len();
        assert_eq!(parsed[0].as_object().unwrap().len(), fields);
        assert!(out.starts_with(r#"[{"name":"server1","alias":"","ipaddress""#));
    }

    #[test]
    fn packed_and_pretty_hold_same_data() {
        let packed = render_records(&hosts(), &json(false, true));
        let pretty = render_records(&hosts(), &json(false, false));
        assert!(!packed.contains('\n'));
        assert!(pretty.contains('\n'));
        let a: Value = serde_json::from_str(&packed).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn plain_lists_non_empty_fields() {
        let out = render_records(&hosts(), &RenderOpts::default());
        assert_eq!(out, "  name:server1  ipaddress:10.0.0.1");

        let opts = RenderOpts {
            complete: true,
            ..RenderOpts::default()
        };
        let out = render_records(&hosts(), &opts);
        assert!(out.starts_with("  name:server1  alias:\"\"  ipaddress:10.0.0.1"));
    }

    #[test]
    fn plain_quotes_values_with_spaces() {
        assert_eq!(quote("web one"), "\"web one\"");
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote("plain"), "plain");
    }

    #[test]
    fn empty_result_in_each_mode() {
        assert_eq!(render_records(&[], &RenderOpts::default()), "");
        assert_eq!(render_records(&[], &json(false, true)), "[]");
    }

    #[test]
    fn wraps_before_column_79() {
        let tokens: Vec<String> = (0..10).map(|i| format!("token{i:03}")).collect();
        let out = wrap_tokens(tokens);
        let lines: Vec<&str> = out.lines().collect();
        // each token takes 10 columns, so 7 fit in 79
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 70);
        assert!(lines[1].starts_with("  token007"));
        assert!(lines.iter().all(|l| l.len() <= LINE_WIDTH));
    }

    #[test]
    fn plain_records_are_separated_by_a_blank_line() {
        let handler = registry::lookup("hosts", false).unwrap();
        let raw = format!(
            r#"[{{"name":"a","alias":"b"}},{{"name":"server2","alias":"{}","ipaddress":"10.0.0.2"}}]"#,
            "x".repeat(60)
        );
        let records = match handler.parse_response(&raw).unwrap() {
            Response::Records(r) => r,
            other => panic!("unexpected {other:?}"),
        };

        let out = render_records(&records, &RenderOpts::default());

        let expected = format!(
            "  name:a  alias:b\n\n  name:server2\n  alias:{}\n  ipaddress:10.0.0.2",
            "x".repeat(60)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn star_is_not_carried_onto_a_new_line() {
        let first: &'static str = Box::leak("x".repeat(70).into_boxed_str());
        let starred: &'static str = Box::leak("b".repeat(10).into_boxed_str());
        let last: &'static str = Box::leak("c".repeat(65).into_boxed_str());

        let out = render_fields(&[first, starred, last], &[starred], &RenderOpts::default());

        // the second line holds 12 + 67 columns of tokens plus the star
        assert_eq!(out, format!("\n  {first}\n  *{starred}  {last}\n"));
    }

    #[test]
    fn long_token_gets_its_own_line() {
        let out = wrap_tokens(vec!["a".into(), "x".repeat(90), "b".into()]);
        let long = format!("  {}", "x".repeat(90));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["  a", long.as_str(), "  b"]);
    }

    #[test]
    fn field_list_stars_required_fields() {
        let (fields, required) = registry::known_fields("hostgroups").unwrap();
        let out = render_fields(&fields, &required, &RenderOpts::default());
        assert_eq!(out, "\n  *name  *alias  disable\n");

        let out = render_fields(&fields, &required, &json(false, true));
        assert_eq!(
            out,
            r#"[{"name":"name","required":true},{"name":"alias","required":true},{"name":"disable","required":false}]"#
        );
    }

    #[test]
    fn endpoints_and_lines_render_as_json_arrays() {
        let eps = vec!["restart/nagios".to_string()];
        assert_eq!(render_endpoints(&eps, &json(false, true)), r#"["restart/nagios"]"#);
        assert_eq!(
            render_endpoints(&eps, &RenderOpts::default()),
            "\n  restart/nagios\n"
        );
        let lines = vec!["ok".to_string(), "done".to_string()];
        assert_eq!(render_lines(&lines, &RenderOpts::default()), "ok\ndone");
        assert_eq!(render_lines(&lines, &json(false, true)), r#"["ok","done"]"#);
    }
}
