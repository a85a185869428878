use http::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Query string or form fields.
pub type Params = BTreeMap<String, String>;

/// A file sent as a multipart part, alongside the form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Payload containers of a request. The format (and token) fields are
/// merged into the first present container: `params`, then `data`, then `json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub params: Option<Params>,
    pub data: Option<Params>,
    pub json: Option<Map<String, Value>>,
    pub files: Vec<UploadFile>,
}

impl RequestBody {
    pub fn query(params: Params) -> Self {
        Self { params: Some(params), ..Default::default() }
    }

    pub fn form(data: Params) -> Self {
        Self { data: Some(data), ..Default::default() }
    }

    pub fn json(json: Map<String, Value>) -> Self {
        Self { json: Some(json), ..Default::default() }
    }

    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.files.push(file);
        self
    }

    /// Add `f=json` and `token` to the highest priority container, creating
    /// an empty one (form for POST/PUT/PATCH, query otherwise) if none is set.
    /// With files attached, `json` fields become form fields of the upload.
    pub(crate) fn mixin(&mut self, method: &Method, token: Option<&str>) {
        // multipart carries only text fields besides the files
        if !self.files.is_empty() {
            if let Some(json) = self.json.take() {
                let data = self.data.get_or_insert_with(Params::new);
                for (key, value) in json {
                    let value = match value {
                        Value::String(text) => text,
                        other => other.to_string(),
                    };
                    data.entry(key).or_insert(value);
                }
            }
        }

        if self.params.is_none() && self.data.is_none() && self.json.is_none() {
            if is_write_method(method) || !self.files.is_empty() {
                self.data = Some(Params::new());
            } else {
                self.params = Some(Params::new());
            }
        }

        if let Some(fields) = self.params.as_mut().or(self.data.as_mut()) {
            fields.insert("f".to_owned(), "json".to_owned());
            if let Some(token) = token {
                fields.insert("token".to_owned(), token.to_owned());
            }
        } else if let Some(json) = self.json.as_mut() {
            json.insert("f".to_owned(), Value::from("json"));
            if let Some(token) = token {
                json.insert("token".to_owned(), Value::from(token));
            }
        }
    }
}

fn is_write_method(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
