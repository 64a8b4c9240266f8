use crate::common::{Error, Result};

/// Resource limits applied while decoding binary XML.
///
/// `ReaderQuotas` is a plain value: copying it into a section snapshots it,
/// so later changes to the caller's instance never reach sections that were
/// already opened.
///
/// # Examples
///
/// ```rust
/// use xmlbuf::ReaderQuotas;
///
/// // Create with defaults
/// let quotas = ReaderQuotas::default();
/// assert_eq!(quotas.max_depth, 32);
///
/// // Or customize
/// let quotas = ReaderQuotas::new()
///     .with_max_depth(8)
///     .with_max_string_content_length(1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReaderQuotas {
    /// Maximum element nesting depth
    pub max_depth: usize,
    /// Maximum characters in a single text, CDATA, comment or attribute value
    pub max_string_content_length: usize,
    /// Maximum bytes of a single binary content node
    pub max_array_length: usize,
    /// Maximum payload bytes of a single start tag record
    pub max_bytes_per_read: usize,
    /// Maximum cumulative characters of distinct element and attribute names
    pub max_name_table_char_count: usize,
}

impl Default for ReaderQuotas {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_string_content_length: 8192,
            max_array_length: 16384,
            max_bytes_per_read: 4096,
            max_name_table_char_count: 16384,
        }
    }
}

impl ReaderQuotas {
    /// Create a new `ReaderQuotas` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load quotas from YAML; fields that are not given keep their defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xmlbuf::ReaderQuotas;
    ///
    /// let quotas = ReaderQuotas::from_yaml("max_depth: 8\n")?;
    /// assert_eq!(quotas.max_depth, 8);
    /// assert_eq!(quotas.max_array_length, 16384);
    /// # Ok::<(), xmlbuf::Error>(())
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse reader quotas from YAML: {}", e)))
    }

    /// Quotas that never reject anything.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use xmlbuf::ReaderQuotas;
    ///
    /// assert_eq!(ReaderQuotas::max().max_depth, usize::MAX);
    /// ```
    #[inline]
    pub fn max() -> Self {
        Self {
            max_depth: usize::MAX,
            max_string_content_length: usize::MAX,
            max_array_length: usize::MAX,
            max_bytes_per_read: usize::MAX,
            max_name_table_char_count: usize::MAX,
        }
    }

    /// Set the maximum element nesting depth.
    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum length of string content.
    #[inline]
    pub fn with_max_string_content_length(mut self, len: usize) -> Self {
        self.max_string_content_length = len;
        self
    }

    /// Set the maximum length of binary content.
    #[inline]
    pub fn with_max_array_length(mut self, len: usize) -> Self {
        self.max_array_length = len;
        self
    }

    /// Set the maximum size of a start tag record.
    #[inline]
    pub fn with_max_bytes_per_read(mut self, bytes: usize) -> Self {
        self.max_bytes_per_read = bytes;
        self
    }

    /// Set the maximum number of name characters a reader may intern.
    #[inline]
    pub fn with_max_name_table_char_count(mut self, count: usize) -> Self {
        self.max_name_table_char_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_single_field() {
        let quotas = ReaderQuotas::new().with_max_array_length(7);
        assert_eq!(quotas.max_array_length, 7);
        assert_eq!(quotas.max_depth, ReaderQuotas::default().max_depth);
    }

    #[test]
    fn test_load_from_yaml_keeps_defaults() {
        let yaml = "max_depth: 4\nmax_bytes_per_read: 128\n";
        let quotas = ReaderQuotas::from_yaml(yaml).expect("parse quotas");

        assert_eq!(quotas.max_depth, 4);
        assert_eq!(quotas.max_bytes_per_read, 128);
        assert_eq!(quotas.max_string_content_length, 8192);
    }

    #[test]
    fn test_load_from_invalid_yaml() {
        let err = ReaderQuotas::from_yaml("max_depth: deep\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
