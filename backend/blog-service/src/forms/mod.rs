/// Form handling for blog-service
///
/// Submitted bodies (urlencoded or multipart) are read into a [`FormInput`].
/// Each form declares its [`Field`]s; a field's [`FieldKind`] decides which
/// validation function cleans it. Failures are collected per field in
/// [`FormErrors`] and shown next to the inputs when the form is re-rendered.
pub mod auth;
pub mod comment;
pub mod post;

pub use auth::{LoginForm, SignupForm};
pub use comment::CommentForm;
pub use post::{CleanPost, ImageChange, PostForm};

use crate::error::{AppError, Result};
use crate::models::Group;
use actix_multipart::Multipart;
use actix_web::{dev::UrlEncoded, http::header, web, HttpRequest};
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};

/// Upper bound for a urlencoded body.
const URLENCODED_LIMIT: usize = 256 * 1024;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const TOO_LONG_MESSAGE: &str = "The submitted value is too large.";
pub const INVALID_TEXT_MESSAGE: &str = "The submitted value is not valid UTF-8 text.";
pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A file part of a multipart body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// The part exceeded the upload limit; `bytes` holds only a prefix.
    pub oversized: bool,
}

impl Upload {
    /// Browsers send an empty, nameless part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.bytes.is_empty()
    }
}

/// Raw submitted values, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
    /// Text parts that could not be read, with the message to show.
    rejected: HashMap<String, String>,
}

impl FormInput {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            files: HashMap::new(),
            rejected: HashMap::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.files.insert(name.into(), upload);
        self
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Like [`text`](Self::text), but a part that was too large or not UTF-8
    /// is an error to report against the field.
    pub fn field(&self, name: &str) -> std::result::Result<Option<&str>, String> {
        match self.rejected.get(name) {
            Some(message) => Err(message.clone()),
            None => Ok(self.text(name)),
        }
    }

    pub fn with_rejected(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.rejected.insert(name.into(), message.into());
        self
    }

    /// Checkbox semantics: present and not `off`/empty.
    pub fn checked(&self, name: &str) -> bool {
        self.text(name)
            .is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("off"))
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name).filter(|u| !u.is_empty())
    }

    /// Read a POST body. Multipart bodies may carry files; anything else is
    /// parsed as `application/x-www-form-urlencoded`.
    pub async fn read(
        req: &HttpRequest,
        payload: web::Payload,
        max_upload_bytes: usize,
    ) -> Result<Self> {
        if is_multipart(req) {
            Self::read_multipart(req, payload, max_upload_bytes).await
        } else {
            let pairs = UrlEncoded::<Vec<(String, String)>>::new(req, &mut payload.into_inner())
                .limit(URLENCODED_LIMIT)
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid form body: {e}")))?;
            Ok(Self::from_pairs(pairs))
        }
    }

    async fn read_multipart(
        req: &HttpRequest,
        payload: web::Payload,
        max_upload_bytes: usize,
    ) -> Result<Self> {
        let mut input = FormInput::default();
        let mut multipart = Multipart::new(req.headers(), payload);

        while let Some(item) = multipart.next().await {
            let mut field =
                item.map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?;

            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|m| m.to_string());

            let mut bytes = Vec::new();
            let mut oversized = false;
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?;
                if bytes.len() + chunk.len() > max_upload_bytes {
                    oversized = true;
                    continue;
                }
                bytes.extend_from_slice(&chunk);
            }

            match filename {
                Some(filename) => {
                    input.files.insert(
                        name,
                        Upload {
                            filename,
                            content_type,
                            bytes,
                            oversized,
                        },
                    );
                }
                None if oversized => {
                    tracing::debug!(field = %name, "Oversized text part rejected");
                    input.rejected.insert(name, TOO_LONG_MESSAGE.to_string());
                }
                None => match String::from_utf8(bytes) {
                    Ok(value) => {
                        input.fields.insert(name, value);
                    }
                    Err(_) => {
                        tracing::debug!(field = %name, "Non UTF-8 text part rejected");
                        input.rejected.insert(name, INVALID_TEXT_MESSAGE.to_string());
                    }
                },
            }
        }

        Ok(input)
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Field-name keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Errors that belong to the form rather than to one field.
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD)
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }
}

const NON_FIELD: &str = "__all__";

/// How a field is rendered and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text; `multiline` renders a textarea.
    Text { required: bool, multiline: bool },
    /// One of `(value, label)`; the empty value means "none".
    Choice { choices: Vec<(String, String)> },
    Image,
    /// Never echoed back when the form is re-rendered.
    Password,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub kind: FieldKind,
}

/// A form as shown to the user: its fields, the submitted values and any
/// validation errors.
#[derive(Debug, Clone, Default)]
pub struct BoundForm {
    pub fields: Vec<Field>,
    pub values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl BoundForm {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Trim and require non-empty text.
pub fn validate_text(raw: Option<&str>, required: bool) -> std::result::Result<String, String> {
    let value = raw.unwrap_or_default().trim();
    if required && value.is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    Ok(value.to_string())
}

/// Empty selects nothing; anything else must be the id of a listed group.
pub fn validate_group_choice(
    raw: Option<&str>,
    groups: &[Group],
) -> std::result::Result<Option<i64>, String> {
    let value = raw.unwrap_or_default().trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .ok()
        .filter(|id| groups.iter().any(|g| g.id == *id))
        .map(Some)
        .ok_or_else(|| INVALID_CHOICE_MESSAGE.to_string())
}

/// The upload must decode as an image, not merely carry an image extension.
pub fn validate_image(
    upload: Option<&Upload>,
    max_upload_bytes: usize,
) -> std::result::Result<Option<Upload>, String> {
    let Some(upload) = upload else {
        return Ok(None);
    };
    if upload.oversized || upload.bytes.len() > max_upload_bytes {
        return Err(format!(
            "The uploaded file is too large; the limit is {max_upload_bytes} bytes."
        ));
    }
    if upload.bytes.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }

    image::guess_format(&upload.bytes).map_err(|_| INVALID_IMAGE_MESSAGE.to_string())?;
    image::load_from_memory(&upload.bytes).map_err(|_| INVALID_IMAGE_MESSAGE.to_string())?;

    Ok(Some(upload.clone()))
}

pub fn group_choices(groups: &[Group]) -> Vec<(String, String)> {
    std::iter::once((String::new(), "---------".to_string()))
        .chain(groups.iter().map(|g| (g.id.to_string(), g.title.clone())))
        .collect()
}
