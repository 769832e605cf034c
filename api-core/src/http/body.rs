use crate::error::ApiError;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use std::path::Path;

/// Field carrying the logical verb for backends that only parse multipart
/// bodies on POST.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Outgoing payload: a JSON object or a multipart form.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        RequestBody::Multipart(form)
    }
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::InvalidRequest(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PartValue {
    Text(String),
    File(Upload),
}

/// Ordered multipart parts. Kept as plain data until send time so the field
/// set can be inspected and logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, PartValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), PartValue::Text(value.into())));
        self
    }

    /// Always emits the field; an absent value is sent as an empty string.
    pub fn text_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        let value = value.map(Into::into).unwrap_or_default();
        self.text(name, value)
    }

    /// Booleans travel as `1` / `0`.
    pub fn flag(self, name: impl Into<String>, value: bool) -> Self {
        self.text(name, if value { "1" } else { "0" })
    }

    pub fn file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.parts.push((name.into(), PartValue::File(upload)));
        self
    }

    pub fn file_opt(self, name: impl Into<String>, upload: Option<Upload>) -> Self {
        match upload {
            Some(upload) => self.file(name, upload),
            None => self,
        }
    }

    /// `name[]` repeated once per file.
    pub fn files(self, name: &str, uploads: impl IntoIterator<Item = Upload>) -> Self {
        let field = format!("{}[]", name);
        uploads
            .into_iter()
            .fold(self, |form, upload| form.file(field.clone(), upload))
    }

    /// `name[0]`, `name[1]`, ...
    pub fn indexed_files(self, name: &str, uploads: impl IntoIterator<Item = Upload>) -> Self {
        uploads
            .into_iter()
            .enumerate()
            .fold(self, |form, (index, upload)| {
                form.file(format!("{}[{}]", name, index), upload)
            })
    }

    /// `name[]` repeated once per value.
    pub fn texts(self, name: &str, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let field = format!("{}[]", name);
        values
            .into_iter()
            .fold(self, |form, value| form.text(field.clone(), value))
    }

    pub fn method_override(self, method: Method) -> Self {
        self.text(METHOD_OVERRIDE_FIELD, method.as_str())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(field, value)| match value {
            PartValue::Text(text) if field == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn into_reqwest(self) -> Result<Form, ApiError> {
        self.parts
            .into_iter()
            .try_fold(Form::new(), |form, (name, value)| match value {
                PartValue::Text(text) => Ok(form.text(name, text)),
                PartValue::File(upload) => {
                    let part = Part::bytes(upload.bytes)
                        .file_name(upload.file_name)
                        .mime_str(&upload.content_type)
                        .map_err(|e| {
                            ApiError::InvalidRequest(format!(
                                "invalid content type for `{}`: {}",
                                name, e
                            ))
                        })?;
                    Ok(form.part(name, part))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str) -> Upload {
        Upload::new(name, vec![0xFF, 0xD8, 0xFF])
    }

    #[test]
    fn guesses_content_type_from_file_name() {
        assert_eq!(jpeg("sofa.jpg").content_type, "image/jpeg");
        assert_eq!(
            Upload::new("blob", vec![]).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn absent_optional_text_is_still_sent() {
        let form = MultipartForm::new()
            .text("name", "Chairs")
            .text_opt("description", None::<String>)
            .flag("is_active", false);

        assert_eq!(form.field_names(), vec!["name", "description", "is_active"]);
        assert_eq!(form.get_text("description"), Some(""));
        assert_eq!(form.get_text("is_active"), Some("0"));
    }

    #[test]
    fn array_and_indexed_fields() {
        let form = MultipartForm::new()
            .files("images", vec![jpeg("a.jpg"), jpeg("b.jpg")])
            .indexed_files("gallery", vec![jpeg("c.jpg"), jpeg("d.jpg")])
            .texts("images_to_delete", vec!["products/old.jpg"])
            .method_override(Method::PUT);

        assert_eq!(
            form.field_names(),
            vec![
                "images[]",
                "images[]",
                "gallery[0]",
                "gallery[1]",
                "images_to_delete[]",
                "_method"
            ]
        );
        assert_eq!(form.get_text("_method"), Some("PUT"));
    }

    #[test]
    fn upload_from_path_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline-1.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let upload = tokio_test::block_on(Upload::from_path(&path)).unwrap();
        assert_eq!(upload.file_name, "timeline-1.png");
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.bytes, vec![1, 2, 3]);

        let missing = tokio_test::block_on(Upload::from_path(&dir.path().join("gone.png")));
        assert!(matches!(missing, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn converts_to_transport_form() {
        let form = MultipartForm::new()
            .text("title", "Loft")
            .file("image", jpeg("loft.jpg"));
        assert!(form.into_reqwest().is_ok());

        let bad = MultipartForm::new().file(
            "image",
            Upload {
                file_name: "x".to_string(),
                content_type: "not a mime".to_string(),
                bytes: vec![],
            },
        );
        assert!(matches!(bad.into_reqwest(), Err(ApiError::InvalidRequest(_))));
    }
}
