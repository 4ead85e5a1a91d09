//! Request targets: a fixed method and endpoint path plus an encoded query.

use std::fmt;

use crate::{
    error::Result,
    query::{FilterParameters, QueryParameters, encode_filters, encode_query},
};

/// HTTP method of an engine endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to the engine, ready for a [`crate::Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    api_version: Option<String>,
    query: Vec<String>,
}

impl ApiRequest {
    /// A request for `path` (relative to the API root, e.g. `images/create`).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            api_version: None,
            query: Vec::new(),
        }
    }

    /// Prefix the path with `/v<version>`.
    #[must_use]
    pub fn with_api_version(mut self, version: Option<String>) -> Self {
        self.api_version = version;
        self
    }

    /// Append the encoded form of `params` to the query.
    pub fn with_query<T: QueryParameters>(mut self, params: &T) -> Result<Self> {
        let encoded = encode_query(params)?;
        if !encoded.is_empty() {
            self.query.push(encoded);
        }
        Ok(self)
    }

    /// Append `filters=<json>` built from `filter`.
    pub fn with_filters<T: FilterParameters + ?Sized>(mut self, filter: &T) -> Result<Self> {
        self.query.push(encode_filters(filter)?);
        Ok(self)
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Endpoint path without version prefix or query.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The encoded query, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> String {
        self.query.join("&")
    }

    /// Path and query as sent on the request line, e.g.
    /// `/v1.41/images/create?fromImage=alpine&tag=3.19`.
    #[must_use]
    pub fn target(&self) -> String {
        let path = self.path.trim_start_matches('/');
        let mut target = match &self.api_version {
            Some(version) => format!("/v{}/{path}", version.trim_start_matches('v')),
            None => format!("/{path}"),
        };

        if !self.query.is_empty() {
            target.push('?');
            target.push_str(&self.query());
        }

        target
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ImagesCreateParameters, ServiceFilter};

    #[test]
    fn target_joins_version_path_and_query() -> Result<()> {
        let request = ApiRequest::new(Method::Post, "/images/create")
            .with_api_version(Some("1.41".to_string()))
            .with_query(&ImagesCreateParameters::pull("alpine", "3.19"))?;

        assert_eq!(
            request.target(),
            "/v1.41/images/create?fromImage=alpine&tag=3.19"
        );
        assert_eq!(
            request.to_string(),
            "POST /v1.41/images/create?fromImage=alpine&tag=3.19"
        );
        Ok(())
    }

    #[test]
    fn filters_are_appended_as_their_own_parameter() -> Result<()> {
        let filter = ServiceFilter {
            name: "web".to_string(),
            ..ServiceFilter::default()
        };
        let request = ApiRequest::new(Method::Get, "services").with_filters(&filter)?;
        assert_eq!(
            request.target(),
            "/services?filters=%7B%22name%22%3A%7B%22web%22%3Atrue%7D%7D"
        );
        Ok(())
    }
}
