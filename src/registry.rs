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

//! Static field schemas for every NagRestConf table.
//!
//! The server is the authority on which options are mandatory; the
//! `required` list here only drives the `--list` display.

use crate::error::{NrcqError, Result};
use crate::handler::{HandlerKind, ResourceHandler};
use serde::Serialize;

/// Schema for one table: ordered option names and the mandatory subset.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
}

impl ResourceSchema {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

/// One entry of the `--list --json` output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub required: bool,
}

/// Endpoints that are not `verb/table` pairs.
pub const FIXED_ENDPOINTS: &[&str] = &[
    "check/nagiosconfig",
    "apply/nagiosconfig",
    "apply/nagioslastgoodconfig",
    "restart/nagios",
];

const CRUD_VERBS: &str = "show|add|modify|delete";

static SCHEMAS: &[ResourceSchema] = &[
    ResourceSchema {
        name: "hosts",
        fields: &[
            "name",
            "alias",
            "ipaddress",
            "template",
            "hostgroup",
            "contact",
            "contactgroups",
            "activechecks",
            "servicesets",
            "disable",
            "displayname",
            "parents",
            "command",
            "initialstate",
            "maxcheckattempts",
            "checkinterval",
            "retryinterval",
            "passivechecks",
            "checkperiod",
            "obsessoverhost",
            "checkfreshness",
            "freshnessthresh",
            "eventhandler",
            "eventhandlerenabled",
            "lowflapthresh",
            "highflapthresh",
            "flapdetectionenabled",
            "flapdetectionoptions",
            "processperfdata",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "notifinterval",
            "firstnotifdelay",
            "notifperiod",
            "notifopts",
            "notifications_enabled",
            "stalkingoptions",
            "notes",
            "notes_url",
            "icon_image",
            "icon_image_alt",
            "vrml_image",
            "statusmap_image",
            "coords2d",
            "coords3d",
            "action_url",
        ],
        required: &["name", "alias", "ipaddress", "template"],
    },
    ResourceSchema {
        name: "services",
        fields: &[
            "name",
            "template",
            "command",
            "svcdesc",
            "svcgroup",
            "contacts",
            "contactgroups",
            "freshnessthresh",
            "activechecks",
            "customvars",
            "disable",
            "displayname",
            "isvolatile",
            "initialstate",
            "maxcheckattempts",
            "checkinterval",
            "retryinterval",
            "passivechecks",
            "checkperiod",
            "obsessoverservice",
            "manfreshnessthresh",
            "checkfreshness",
            "eventhandler",
            "eventhandlerenabled",
            "lowflapthresh",
            "highflapthresh",
            "flapdetectionenabled",
            "flapdetectionoptions",
            "processperfdata",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "notifinterval",
            "firstnotifdelay",
            "notifperiod",
            "notifopts",
            "notifications_enabled",
            "stalkingoptions",
            "notes",
            "notes_url",
            "action_url",
            "icon_image",
            "icon_image_alt",
        ],
        required: &["name", "template", "command", "svcdesc"],
    },
    ResourceSchema {
        name: "servicesets",
        fields: &[
            "name",
            "template",
            "command",
            "svcdesc",
            "svcgroup",
            "contacts",
            "contactgroups",
            "freshnessthresh",
            "activechecks",
            "customvars",
            "disable",
            "displayname",
            "isvolatile",
            "initialstate",
            "maxcheckattempts",
            "checkinterval",
            "retryinterval",
            "passivechecks",
            "checkperiod",
            "obsessoverservice",
            "manfreshnessthresh",
            "checkfreshness",
            "eventhandler",
            "eventhandlerenabled",
            "lowflapthresh",
            "highflapthresh",
            "flapdetectionenabled",
            "flapdetectionoptions",
            "processperfdata",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "notifinterval",
            "firstnotifdelay",
            "notifperiod",
            "notifopts",
            "notifications_enabled",
            "stalkingoptions",
            "notes",
            "notes_url",
            "action_url",
            "icon_image",
            "icon_image_alt",
        ],
        required: &["name", "template", "command", "svcdesc"],
    },
    ResourceSchema {
        name: "hosttemplates",
        fields: &[
            "name",
            "use",
            "contacts",
            "contactgroups",
            "normchecki",
            "checkinterval",
            "retryinterval",
            "notifperiod",
            "notifopts",
            "disable",
            "checkperiod",
            "maxcheckattempts",
            "checkcommand",
            "notifinterval",
            "passivechecks",
            "obsessoverhost",
            "checkfreshness",
            "freshnessthresh",
            "eventhandler",
            "eventhandlerenabled",
            "lowflapthresh",
            "highflapthresh",
            "flapdetectionenabled",
            "flapdetectionoptions",
            "processperfdata",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "firstnotifdelay",
            "notifications_enabled",
            "stalkingoptions",
            "notes",
            "notes_url",
            "icon_image",
            "icon_image_alt",
            "vrml_image",
            "statusmap_image",
            "coords2d",
            "coords3d",
            "action_url",
        ],
        required: &["name"],
    },
    ResourceSchema {
        name: "servicetemplates",
        fields: &[
            "name",
            "use",
            "contacts",
            "contactgroups",
            "notifopts",
            "checkinterval",
            "normchecki",
            "retryinterval",
            "notifinterval",
            "notifperiod",
            "disable",
            "checkperiod",
            "maxcheckattempts",
            "freshnessthresh",
            "activechecks",
            "customvars",
            "isvolatile",
            "initialstate",
            "passivechecks",
            "obsessoverservice",
            "manfreshnessthresh",
            "checkfreshness",
            "eventhandler",
            "eventhandlerenabled",
            "lowflapthresh",
            "highflapthresh",
            "flapdetectionenabled",
            "flapdetectionoptions",
            "processperfdata",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "firstnotifdelay",
            "notifications_enabled",
            "stalkingoptions",
            "notes",
            "notes_url",
            "action_url",
            "icon_image",
            "icon_image_alt",
        ],
        required: &["name"],
    },
    ResourceSchema {
        name: "hostgroups",
        fields: &["name", "alias", "disable"],
        required: &["name", "alias"],
    },
    ResourceSchema {
        name: "servicegroups",
        fields: &["name", "alias", "disable"],
        required: &["name", "alias"],
    },
    ResourceSchema {
        name: "contacts",
        fields: &[
            "name",
            "use",
            "alias",
            "emailaddr",
            "svcnotifperiod",
            "svcnotifopts",
            "svcnotifcmds",
            "hstnotifperiod",
            "hstnotifopts",
            "hstnotifcmds",
            "cansubmitcmds",
            "disable",
            "svcnotifenabled",
            "hstnotifenabled",
            "pager",
            "address1",
            "address2",
            "address3",
            "address4",
            "address5",
            "address6",
            "retainstatusinfo",
            "retainnonstatusinfo",
            "contactgroups",
        ],
        required: &["name"],
    },
    ResourceSchema {
        name: "contactgroups",
        fields: &["name", "alias", "members", "disable"],
        required: &["name", "alias"],
    },
    ResourceSchema {
        name: "timeperiods",
        fields: &["name", "alias", "definition", "exclude", "exception", "disable"],
        required: &["name", "alias"],
    },
    ResourceSchema {
        name: "commands",
        fields: &["name", "command", "disable"],
        required: &["name", "command"],
    },
    ResourceSchema {
        name: "servicedeps",
        fields: &[
            "dephostname",
            "dephostgroupname",
            "depsvcdesc",
            "hostname",
            "hostgroupname",
            "svcdesc",
            "inheritsparent",
            "execfailcriteria",
            "notiffailcriteria",
            "period",
            "disable",
        ],
        required: &["dephostname", "depsvcdesc", "hostname", "svcdesc"],
    },
    ResourceSchema {
        name: "hostdeps",
        fields: &[
            "dephostname",
            "dephostgroupname",
            "hostname",
            "hostgroupname",
            "inheritsparent",
            "execfailcriteria",
            "notiffailcriteria",
            "period",
            "disable",
        ],
        required: &["dephostname", "hostname"],
    },
    ResourceSchema {
        name: "serviceesc",
        fields: &[
            "hostname",
            "hostgroupname",
            "svcdesc",
            "contacts",
            "contactgroups",
            "firstnotif",
            "lastnotif",
            "notifinterval",
            "period",
            "escopts",
            "disable",
        ],
        required: &["hostname", "svcdesc", "firstnotif", "lastnotif", "notifinterval"],
    },
    ResourceSchema {
        name: "hostesc",
        fields: &[
            "hostname",
            "hostgroupname",
            "contacts",
            "contactgroups",
            "firstnotif",
            "lastnotif",
            "notifinterval",
            "period",
            "escopts",
            "disable",
        ],
        required: &["hostname", "firstnotif", "lastnotif", "notifinterval"],
    },
    ResourceSchema {
        name: "serviceextinfo",
        fields: &[
            "hostname",
            "svcdesc",
            "notes",
            "notes_url",
            "action_url",
            "icon_image",
            "icon_image_alt",
            "disable",
        ],
        required: &["hostname", "svcdesc"],
    },
    ResourceSchema {
        name: "hostextinfo",
        fields: &[
            "hostname",
            "notes",
            "notes_url",
            "action_url",
            "icon_image",
            "icon_image_alt",
            "vrml_image",
            "statusmap_image",
            "coords2d",
            "coords3d",
            "disable",
        ],
        required: &["hostname"],
    },
];

pub fn schema(resource: &str) -> Result<&'static ResourceSchema> {
    SCHEMAS
        .iter()
        .find(|s| s.name == resource)
        .ok_or_else(|| NrcqError::UnknownResource(resource.to_string()))
}

/// Resolve a table name to a handler bound to its schema.
pub fn lookup(resource: &str, encode: bool) -> Result<ResourceHandler> {
    let schema = schema(resource)?;
    Ok(ResourceHandler::new(HandlerKind::Table(schema), encode))
}

pub fn known_resources() -> Vec<&'static str> {
    SCHEMAS.iter().map(|s| s.name).collect()
}

/// All option names of a table, and the mandatory ones.
pub fn known_fields(resource: &str) -> Result<(Vec<&'static str>, Vec<&'static str>)> {
    let handler = lookup(resource, false)?;
    Ok((handler.fields().to_vec(), handler.required_fields().to_vec()))
}

pub fn endpoints() -> Vec<String> {
    FIXED_ENDPOINTS
        .iter()
        .map(|e| e.to_string())
        .chain(
            known_resources()
                .into_iter()
                .map(|name| format!("{CRUD_VERBS}/{name}")),
        )
        .collect()
}
