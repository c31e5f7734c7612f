//! Upload form record and its validation.

use apkstore_protocol::{BYTES_PER_MB, Category, Listing};

/// Local validation failure. Blocks submission before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Please enter a valid file size in MB.")]
    InvalidFileSize,
}

/// Editable state of the upload form.
///
/// Every field holds the raw text as typed. `file_size_mb` is parsed only on
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadForm {
    pub name: String,
    pub category: Category,
    pub description: String,
    pub version: String,
    pub file_size_mb: String,
    pub download_url: String,
    pub icon_url: String,
    pub(crate) features: Vec<String>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: Category::App,
            description: String::new(),
            version: String::new(),
            file_size_mb: String::new(),
            download_url: String::new(),
            icon_url: String::new(),
            features: vec![String::new()],
        }
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the initial state: empty fields, `app`, one empty feature entry.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn add_feature(&mut self) {
        self.features.push(String::new());
    }

    /// Edits one feature entry. Out-of-range indices are ignored.
    pub fn set_feature(&mut self, index: usize, text: impl Into<String>) {
        if let Some(entry) = self.features.get_mut(index) {
            *entry = text.into();
        }
    }

    /// Removes one feature entry, keeping at least one.
    pub fn remove_feature(&mut self, index: usize) {
        if self.features.len() > 1 && index < self.features.len() {
            self.features.remove(index);
        }
    }

    /// Checks the form and builds the listing it describes.
    pub fn validate(&self) -> Result<Listing, FormError> {
        let name = required("Name", &self.name)?;
        let description = required("Description", &self.description)?;
        let version = required("Version", &self.version)?;
        let download_url = required("Download URL", &self.download_url)?;
        let file_size = parse_file_size(&self.file_size_mb)?;

        let mod_features = self
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Listing {
            name,
            description,
            download_url,
            file_size,
            version,
            mod_features,
            category: self.category,
            icon_url: self.icon_url.trim().to_string(),
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Parses a positive, finite megabyte count and converts it to bytes.
pub fn parse_file_size(text: &str) -> Result<u64, FormError> {
    let mb: f64 = text.trim().parse().map_err(|_| FormError::InvalidFileSize)?;
    if !mb.is_finite() || mb <= 0.0 {
        return Err(FormError::InvalidFileSize);
    }
    let bytes = (mb * BYTES_PER_MB).round();
    // 2^64 bytes and up do not fit in a u64.
    if bytes >= u64::MAX as f64 {
        return Err(FormError::InvalidFileSize);
    }
    Ok(bytes as u64)
}
