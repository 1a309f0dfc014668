use bytes::Bytes;

/// Content type written on every file part.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A named text value. Used for both scalar and repeated (`name[]`) fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name:  String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name:  name.into(),
            value: value.into(),
        }
    }
}

/// A binary part. `filename` is only written into the disposition header and
/// is never interpreted as a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub field:    String,
    pub filename: String,
    pub data:     Bytes,
}

impl FileAttachment {
    pub fn new(field: impl Into<String>, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            field:    field.into(),
            filename: filename.into(),
            data:     data.into(),
        }
    }
}

/// The boundary token together with the finished buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    boundary: String,
    bytes:    Bytes,
}

impl EncodedBody {
    pub(crate) fn new(boundary: String, bytes: Bytes) -> Self { Self { boundary, bytes } }

    pub fn boundary(&self) -> &str { &self.boundary }

    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Value for the `Content-Type` request header.
    pub fn content_type(&self) -> String { format!("multipart/form-data; boundary={}", self.boundary) }

    pub fn into_bytes(self) -> Bytes { self.bytes }
}

/// Accumulates fields in the order the encoder emits them: scalar fields,
/// then repeated fields, then files.
///
/// ```
/// use mailcast_multipart::Form;
///
/// let body = Form::new()
///     .text("subject", "Hi")
///     .repeated("tag_ids[]", "3")
///     .file("images[]", "pic.png", vec![1u8, 2, 3])
///     .encode();
///
/// assert!(body.as_bytes().ends_with(format!("--{}--\r\n", body.boundary()).as_bytes()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Form {
    fields:   Vec<FormField>,
    repeated: Vec<FormField>,
    files:    Vec<FileAttachment>,
}

impl Form {
    pub fn new() -> Self { Self::default() }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::new(name, value));
        self
    }

    /// Adds one entry of an array field. Entries sharing a name are kept in
    /// insertion order and never merged.
    pub fn repeated(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.repeated.push(FormField::new(name, value));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.files.push(FileAttachment::new(field, filename, data));
        self
    }

    pub fn attach(mut self, attachment: FileAttachment) -> Self {
        self.files.push(attachment);
        self
    }

    pub fn fields(&self) -> &[FormField] { &self.fields }

    pub fn repeated_fields(&self) -> &[FormField] { &self.repeated }

    pub fn files(&self) -> &[FileAttachment] { &self.files }

    pub fn part_count(&self) -> usize { self.fields.len() + self.repeated.len() + self.files.len() }

    pub fn encode(&self) -> EncodedBody { crate::encode(&self.fields, &self.repeated, &self.files) }

    pub fn encode_with_boundary(&self, boundary: impl Into<String>) -> EncodedBody {
        crate::encode_with_boundary(boundary, &self.fields, &self.repeated, &self.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_keeps_insertion_order() {
        let form = Form::new()
            .repeated("tag_ids[]", "2")
            .text("subject", "Hi")
            .repeated("tag_ids[]", "1")
            .repeated("tag_ids[]", "2");

        let values: Vec<&str> = form.repeated_fields().iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["2", "1", "2"]);
        assert_eq!(form.fields().len(), 1);
        assert_eq!(form.part_count(), 4);
    }

    #[test]
    fn test_content_type_header() {
        let body = Form::new().text("a", "b").encode_with_boundary("XYZ");
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
        assert_eq!(body.boundary(), "XYZ");
        assert!(!body.is_empty());
    }
}
