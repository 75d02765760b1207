use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

use crate::errors::PdbError;
use crate::transport::{Method, Transport};
use crate::Result;

/// Transport serving canned responses in order and recording every request
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: RefCell<VecDeque<Result<String>>>,
    requests: RefCell<Vec<(Method, String, Option<Value>)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: impl Into<String>) -> Self {
        self.responses.borrow_mut().push_back(Ok(body.into()));
        self
    }

    pub fn respond_json(self, body: Value) -> Self {
        self.respond(body.to_string())
    }

    pub fn fail(self, err: PdbError) -> Self {
        self.responses.borrow_mut().push_back(Err(err));
        self
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|(_, path, _)| path.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<(Method, String, Option<Value>)> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String> {
        self.requests
            .borrow_mut()
            .push((method, path.to_string(), body.cloned()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", method.as_str(), path))
    }
}

/// Decoded JSON value of query string parameter `key` in `path`
pub(crate) fn query_param(path: &str, key: &str) -> Option<Value> {
    let (_, query) = path.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k != key {
            return None;
        }
        let decoded = urlencoding::decode(v).ok()?;
        Some(serde_json::from_str(&decoded).unwrap_or(Value::String(decoded.into_owned())))
    })
}

/// `count` resource rows of type Class spread over hosts in store order
pub(crate) fn class_rows(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                serde_json::json!({
                    "certname": format!("host{:05}", i / 10),
                    "type": "Class",
                    "title": format!("Class{:02}", i % 10),
                    "exported": false,
                    "parameters": {},
                    "environment": "production"
                })
            })
            .collect(),
    )
}
