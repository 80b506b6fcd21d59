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

//! Endpoint parsing and the single request/response cycle of an invocation.

use crate::client::{RequestDescriptor, Transport};
use crate::error::{NrcqError, Result};
use crate::filter::FilterSpec;
use crate::handler::{HandlerKind, ResourceHandler, Response};
use crate::registry;
use crate::render::{RenderOpts, render_lines, render_records};
use reqwest::Method;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Show,
    Add,
    Modify,
    Delete,
    Check,
    Apply,
    Restart,
}

impl Verb {
    fn parse(verb: &str) -> Option<Self> {
        match verb {
            "show" => Some(Verb::Show),
            "add" => Some(Verb::Add),
            "modify" => Some(Verb::Modify),
            "delete" => Some(Verb::Delete),
            "check" => Some(Verb::Check),
            "apply" => Some(Verb::Apply),
            "restart" => Some(Verb::Restart),
            _ => None,
        }
    }

    pub fn method(self) -> Method {
        match self {
            Verb::Show | Verb::Check => Method::GET,
            _ => Method::POST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Table { verb: Verb, resource: String },
    CheckConfig,
    ApplyConfig,
    ApplyLastGood,
    RestartNagios,
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Result<Self> {
        match endpoint {
            "check/nagiosconfig" => return Ok(Endpoint::CheckConfig),
            "apply/nagiosconfig" => return Ok(Endpoint::ApplyConfig),
            "apply/nagioslastgoodconfig" => return Ok(Endpoint::ApplyLastGood),
            "restart/nagios" => return Ok(Endpoint::RestartNagios),
            _ => {}
        }

        let malformed = || NrcqError::MalformedEndpoint(endpoint.to_string());
        let (verb, resource) = endpoint.split_once('/').ok_or_else(malformed)?;
        if verb.is_empty() || resource.is_empty() || resource.contains('/') {
            return Err(malformed());
        }

        match Verb::parse(verb).ok_or_else(malformed)? {
            verb @ (Verb::Show | Verb::Add | Verb::Modify | Verb::Delete) => Ok(Endpoint::Table {
                verb,
                resource: resource.to_string(),
            }),
            _ => Err(NrcqError::UnknownResource(endpoint.to_string())),
        }
    }

    pub fn verb(&self) -> Verb {
        match self {
            Endpoint::Table { verb, .. } => *verb,
            Endpoint::CheckConfig => Verb::Check,
            Endpoint::ApplyConfig | Endpoint::ApplyLastGood => Verb::Apply,
            Endpoint::RestartNagios => Verb::Restart,
        }
    }

    pub fn method(&self) -> Method {
        self.verb().method()
    }

    /// Whether the response body is shown. Every other POST only reports
    /// success.
    pub fn renders_output(&self) -> bool {
        matches!(
            self,
            Endpoint::Table {
                verb: Verb::Show,
                ..
            } | Endpoint::CheckConfig
                | Endpoint::ApplyConfig
        )
    }

    fn handler(&self, encode: bool) -> Result<ResourceHandler> {
        let kind = match self {
            Endpoint::Table { resource, .. } => return registry::lookup(resource, encode),
            Endpoint::CheckConfig => HandlerKind::Check,
            Endpoint::ApplyConfig => HandlerKind::ApplyConfig,
            Endpoint::ApplyLastGood => HandlerKind::LastGood,
            Endpoint::RestartNagios => HandlerKind::Restart,
        };
        Ok(ResourceHandler::new(kind, encode))
    }
}

/// Everything one run of the tool needs, resolved from flags and config.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub base_url: String,
    pub endpoint: String,
    pub folder: String,
    pub filter: String,
    pub data: Vec<String>,
    pub render: RenderOpts,
    /// Percent-encode outgoing option values.
    pub encode: bool,
}

/// Run one invocation against `transport` and return the text to print.
/// Nothing reaches the network unless endpoint, data and filter are valid.
pub fn dispatch(invocation: &Invocation, transport: &dyn Transport) -> Result<String> {
    let endpoint = Endpoint::parse(&invocation.endpoint)?;
    let method = endpoint.method();
    let handler = endpoint.handler(invocation.encode)?;

    let data = handler.build_request_body(&invocation.data)?;
    let filter = match handler.schema() {
        Some(schema) => FilterSpec::parse(&invocation.filter, schema)?,
        None => {
            if !invocation.filter.is_empty() {
                warn!(endpoint = %invocation.endpoint, "filter ignored for this endpoint");
            }
            FilterSpec::default()
        }
    };

    let request = RequestDescriptor {
        method,
        base_url: invocation.base_url.clone(),
        endpoint: invocation.endpoint.clone(),
        folder: invocation.folder.clone(),
        data,
    };
    let raw = transport.perform(&request)?;

    if !endpoint.renders_output() {
        return Ok("SUCCESS".into());
    }

    match handler.parse_response(&raw)? {
        Response::Records(records) => {
            let total = records.len();
            let kept = filter.apply(records);
            debug!(total, kept = kept.len(), "filtered records");
            Ok(render_records(&kept, &invocation.render))
        }
        Response::Lines(lines) => Ok(render_lines(&lines, &invocation.render)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OutputMode;
    use serde_json::json;
    use std::cell::RefCell;

    struct FakeTransport {
        reply: std::result::Result<String, String>,
        calls: RefCell<Vec<RequestDescriptor>>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn perform(&self, request: &RequestDescriptor) -> Result<String> {
            self.calls.borrow_mut().push(request.clone());
            self.reply.clone().map_err(NrcqError::Transport)
        }
    }

    fn invocation(endpoint: &str) -> Invocation {
        Invocation {
            base_url: "http://server/rest".into(),
            endpoint: endpoint.into(),
            folder: "local".into(),
            filter: String::new(),
            data: Vec::new(),
            render: RenderOpts {
                mode: OutputMode::Json,
                complete: false,
                packed: true,
            },
            encode: false,
        }
    }

    #[test]
    fn parses_table_endpoints() {
        assert_eq!(
            Endpoint::parse("show/hosts").unwrap(),
            Endpoint::Table {
                verb: Verb::Show,
                resource: "hosts".into()
            }
        );
        assert_eq!(
            Endpoint::parse("delete/services").unwrap().verb(),
            Verb::Delete
        );
    }

    #[test]
    fn parses_fixed_endpoints() {
        assert_eq!(
            Endpoint::parse("check/nagiosconfig").unwrap(),
            Endpoint::CheckConfig
        );
        assert_eq!(
            Endpoint::parse("apply/nagioslastgoodconfig").unwrap(),
            Endpoint::ApplyLastGood
        );
        assert_eq!(
            Endpoint::parse("restart/nagios").unwrap(),
            Endpoint::RestartNagios
        );
    }

    #[test]
    fn rejects_malformed_endpoints() {
        for ep in ["hosts", "show/hosts/x", "frob/hosts", "/hosts", "show/", ""] {
            let err = Endpoint::parse(ep).unwrap_err();
            assert!(matches!(err, NrcqError::MalformedEndpoint(_)), "{ep}");
        }
        let err = Endpoint::parse("check/hosts").unwrap_err();
        assert!(matches!(err, NrcqError::UnknownResource(_)));
    }

    #[test]
    fn only_show_and_check_use_get() {
        assert_eq!(Verb::Show.method(), Method::GET);
        assert_eq!(Verb::Check.method(), Method::GET);
        for verb in [Verb::Add, Verb::Modify, Verb::Delete, Verb::Apply, Verb::Restart] {
            assert_eq!(verb.method(), Method::POST);
        }
    }

    #[test]
    fn show_filters_before_rendering() {
        let transport = FakeTransport::replying(
            &json!([
                {"name": "server1", "alias": "one"},
                {"name": "server2", "alias": "two"}
            ])
            .to_string(),
        );
        let mut inv = invocation("show/hosts");
        inv.filter = "name:^server1$".into();

        let out = dispatch(&inv, &transport).unwrap();

        assert_eq!(out, r#"[{"name":"server1","alias":"one"}]"#);
        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].endpoint, "show/hosts");
        assert_eq!(calls[0].folder, "local");
    }

    #[test]
    fn add_posts_once_and_reports_success() {
        let transport = FakeTransport::replying("");
        let mut inv = invocation("add/hosts");
        inv.data = vec!["name:server1".into(), "alias:server1".into()];

        let out = dispatch(&inv, &transport).unwrap();

        assert_eq!(out, "SUCCESS");
        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].data["name"], "server1");
        assert_eq!(calls[0].data["alias"], "server1");
    }

    #[test]
    fn unknown_resource_never_reaches_transport() {
        let transport = FakeTransport::replying("[]");
        let err = dispatch(&invocation("show/bogus"), &transport).unwrap_err();
        assert!(matches!(err, NrcqError::UnknownResource(ref r) if r == "bogus"));
        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn bad_data_or_filter_never_reaches_transport() {
        let transport = FakeTransport::replying("[]");

        let mut inv = invocation("add/hosts");
        inv.data = vec!["name".into()];
        assert!(matches!(
            dispatch(&inv, &transport),
            Err(NrcqError::MalformedData(_))
        ));

        let mut inv = invocation("show/hosts");
        inv.filter = "nosuchfield:x".into();
        assert!(matches!(
            dispatch(&inv, &transport),
            Err(NrcqError::InvalidFilter { .. })
        ));

        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn transport_failure_is_terminal() {
        let transport = FakeTransport::failing("connection refused");
        let err = dispatch(&invocation("show/hosts"), &transport).unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(transport.calls.borrow().len(), 1);
    }

    #[test]
    fn invalid_response_is_reported() {
        let transport = FakeTransport::replying(r#"{"oops":true}"#);
        let err = dispatch(&invocation("show/hosts"), &transport).unwrap_err();
        assert!(matches!(err, NrcqError::InvalidResponse(_)));
    }

    #[test]
    fn apply_config_renders_its_output() {
        let transport = FakeTransport::replying(r#"["Config OK","Restarted"]"#);
        let mut inv = invocation("apply/nagiosconfig");
        inv.filter = "name:x".into();

        let out = dispatch(&inv, &transport).unwrap();

        assert_eq!(out, r#"["Config OK","Restarted"]"#);
        assert_eq!(transport.calls.borrow()[0].method, Method::POST);
    }

    #[test]
    fn maintenance_posts_report_success() {
        for ep in ["apply/nagioslastgoodconfig", "restart/nagios", "modify/hosts"] {
            let transport = FakeTransport::replying("whatever");
            assert_eq!(dispatch(&invocation(ep), &transport).unwrap(), "SUCCESS");
            assert_eq!(transport.calls.borrow()[0].method, Method::POST);
        }
    }

    #[test]
    fn check_config_uses_get_and_plain_lines() {
        let transport = FakeTransport::replying(r#"["Total Errors: 0"]"#);
        let mut inv = invocation("check/nagiosconfig");
        inv.render = RenderOpts::default();

        let out = dispatch(&inv, &transport).unwrap();

        assert_eq!(out, "Total Errors: 0");
        assert_eq!(transport.calls.borrow()[0].method, Method::GET);
    }

    #[test]
    fn encode_setting_reaches_request_body() {
        let transport = FakeTransport::replying("");
        let mut inv = invocation("add/hosts");
        inv.data = vec!["alias:two words".into()];
        inv.encode = true;

        dispatch(&inv, &transport).unwrap();

        assert_eq!(transport.calls.borrow()[0].data["alias"], "two+words");
    }
}
