//! HTTP response value.

use serde_json::Value;

/// An HTTP response from the backend.
///
/// Holds the status code, the raw body, and the body parsed as JSON when
/// it is valid JSON. Construction never fails: an unparsable body simply
/// leaves [`Response::json`] empty, which is also how bodyless responses
/// (204 on delete) come out.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub data: String,
    json: Option<Value>,
}

impl Response {
    /// Wrap a status code and raw body.
    #[must_use]
    pub fn new(status: u16, data: String) -> Self {
        let json = serde_json::from_str(&data).ok();
        Self { status, data, json }
    }

    /// The body parsed as JSON, or `None` if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Consume the response and take the parsed JSON body.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_body() {
        let resp = Response::new(200, r#"{"access_token": "abc"}"#.to_string());
        assert_eq!(resp.status, 200);
        assert_eq!(resp.json().unwrap()["access_token"], "abc");
    }

    #[test]
    fn test_invalid_json_body_is_none() {
        let resp = Response::new(500, "internal server error".to_string());
        assert!(resp.json().is_none());
        assert_eq!(resp.data, "internal server error");
    }

    #[test]
    fn test_empty_body_is_none() {
        let resp = Response::new(204, String::new());
        assert!(resp.json().is_none());
    }

    #[test]
    fn test_json_array_body() {
        let resp = Response::new(200, "[1, 2, 3]".to_string());
        assert_eq!(resp.json().unwrap().as_array().unwrap().len(), 3);
    }
}
