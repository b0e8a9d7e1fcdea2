//! Access to parameters of the request that resumes a suspended flow

use axum::http::{request::Parts, Uri};
use std::collections::HashMap;

/// Named parameters of an incoming HTTP request
pub trait RequestParameters {
    /// First value of the parameter called `name`
    fn parameter(&self, name: &str) -> Option<String>;
}

impl RequestParameters for HashMap<String, String> {
    fn parameter(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl RequestParameters for Uri {
    fn parameter(&self, name: &str) -> Option<String> {
        let query = self.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl RequestParameters for Parts {
    fn parameter(&self, name: &str) -> Option<String> {
        self.uri.parameter(name)
    }
}
