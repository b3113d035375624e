//! Splitting virtual paths into bucket, prefix and file name.
//!
//! # Limitation
//!
//! Whether a two-segment path names a file is decided by a heuristic: the
//! second segment is a file if and only if it contains a `.`. A directory
//! called `archive.2024` directly under a bucket is therefore treated as a
//! file, and a file without an extension as a directory. Paths with three or
//! more segments always treat the final segment as the file name.

/// Separator between virtual path segments.
pub const SEPARATOR: char = '/';

/// A virtual path split into its object-store parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathParts {
    /// Bucket (top-level namespace)
    pub bucket: String,
    /// Segments between bucket and file name, joined by `/`
    pub prefix: String,
    /// File name, empty when the path denotes a directory
    pub file: String,
}

impl PathParts {
    /// Object key of the file: prefix and file joined by `/`.
    pub fn key(&self) -> String {
        join_key(&self.prefix, &self.file)
    }
}

/// Heuristic deciding whether a segment names a file.
pub fn looks_like_file(segment: &str) -> bool {
    segment.contains('.')
}

/// Split `/bucket/prefix.../file` into its parts.
///
/// Never fails: empty input or a lone separator yields empty fields.
///
/// ```
/// use daguerre_storage::split;
///
/// let parts = split("/photos/2024/summer/beach.jpg");
/// assert_eq!(parts.bucket, "photos");
/// assert_eq!(parts.prefix, "2024/summer");
/// assert_eq!(parts.file, "beach.jpg");
/// ```
pub fn split(name: &str) -> PathParts {
    let name = name.strip_prefix(SEPARATOR).unwrap_or(name);

    let segments: Vec<&str> = name.split(SEPARATOR).collect();
    match segments.as_slice() {
        [bucket] => PathParts {
            bucket: bucket.to_string(),
            ..PathParts::default()
        },
        [bucket, second] if looks_like_file(second) => PathParts {
            bucket: bucket.to_string(),
            prefix: String::new(),
            file: second.to_string(),
        },
        [bucket, second] => PathParts {
            bucket: bucket.to_string(),
            prefix: second.to_string(),
            file: String::new(),
        },
        [bucket, middle @ .., last] => PathParts {
            bucket: bucket.to_string(),
            prefix: middle.join("/"),
            file: last.to_string(),
        },
        [] => PathParts::default(),
    }
}

/// Split a listing path into bucket and everything after it.
///
/// Unlike [`split`] there is no file-name heuristic.
pub fn split_bucket(path: &str) -> (String, String) {
    let path = path.strip_prefix(SEPARATOR).unwrap_or(path);
    match path.split_once(SEPARATOR) {
        Some((bucket, rest)) => (bucket.to_string(), rest.to_string()),
        None => (path.to_string(), String::new()),
    }
}

/// Make a non-empty prefix end with the separator.
pub fn dir_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with(SEPARATOR) {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, SEPARATOR)
    }
}

/// Join a prefix and a file name into an object key.
pub fn join_key(prefix: &str, file: &str) -> String {
    let prefix = prefix.trim_end_matches(SEPARATOR);
    match (prefix.is_empty(), file.is_empty()) {
        (true, _) => file.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}{}{}", prefix, SEPARATOR, file),
    }
}

/// Final segment of a raw object key, ignoring a trailing separator.
pub fn base_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches(SEPARATOR);
    match trimmed.rsplit_once(SEPARATOR) {
        Some((_, last)) => last,
        None => trimmed,
    }
}
