// Request line parsing and query-string decoding

use crate::query::QueryParams;
use url::form_urlencoded;

use super::{NetworkError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading '?'
    pub query: String,
}

impl Request {
    /// Parse the head of an HTTP request. Only the request line is used.
    pub fn parse(head: &str) -> Result<Self> {
        let line = head.lines().next().unwrap_or_default();
        let mut parts = line.split_whitespace();

        let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version)) if parts.next().is_none() => {
                (method, target, version)
            }
            _ => {
                return Err(NetworkError::InvalidRequest(format!(
                    "malformed request line '{}'",
                    line
                )))
            }
        };
        if !version.starts_with("HTTP/1.") {
            return Err(NetworkError::InvalidRequest(format!(
                "unsupported protocol '{}'",
                version
            )));
        }

        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            query: query.to_string(),
        })
    }

    /// Decode the query string into report parameters.
    ///
    /// List parameters may repeat and field lists are also split on commas.
    /// `custom` values are kept whole since expressions contain commas.
    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::default();
        for (key, value) in form_urlencoded::parse(self.query.as_bytes()) {
            match key.as_ref() {
                "select" => push_fields(&mut params.select, &value),
                "groupBy" => push_fields(&mut params.group_by, &value),
                "sum" => push_fields(&mut params.sum, &value),
                "avg" => push_fields(&mut params.avg, &value),
                "min" => push_fields(&mut params.min, &value),
                "max" => push_fields(&mut params.max, &value),
                "count" => push_fields(&mut params.count, &value),
                "filter" => params.filter = value.into_owned(),
                "custom" => params.custom.push(value.into_owned()),
                other => log::debug!("Ignoring query parameter '{}'", other),
            }
        }
        params
    }
}

fn push_fields(target: &mut Vec<String>, value: &str) {
    target.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from),
    );
}
