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

use thiserror::Error;

/// Every failure an invocation can end in. None of them are retried.
#[derive(Debug, Error)]
pub enum NrcqError {
    #[error("Malformed endpoint `{0}`, expected VERB/RESOURCE (see `nrcq -L`)")]
    MalformedEndpoint(String),
    #[error("Unknown endpoint or resource `{0}` (see `nrcq -L`)")]
    UnknownResource(String),
    #[error("Malformed data `{0}`, expected option:value")]
    MalformedData(String),
    #[error("Invalid filter `{clause}`: {reason}")]
    InvalidFilter { clause: String, reason: String },
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, NrcqError>;
