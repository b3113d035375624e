//! Backend-independent file and directory descriptors.
//!
//! These are transient views over backend state: built per call, never cached.

use chrono::{DateTime, Utc};

/// Size reported for synthetic directories. No aggregate size is computed.
pub const FOLDER_SIZE: u64 = 4096;

/// Mode bits of a descriptor.
///
/// The low nine bits are permissions; directory and symlink are flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("{:#o}", _0)]
pub struct FileMode(u32);

impl FileMode {
    /// Directory flag.
    pub const DIR: FileMode = FileMode(1 << 31);
    /// Symbolic link flag.
    pub const SYMLINK: FileMode = FileMode(1 << 27);
    /// Full permission bits, the placeholder used for object-store entries.
    pub const PERM: FileMode = FileMode(0o777);

    /// Mode from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Combine two modes.
    pub const fn union(self, other: FileMode) -> Self {
        Self(self.0 | other.0)
    }

    /// True when the directory flag is set.
    pub const fn is_dir(self) -> bool {
        self.0 & Self::DIR.0 != 0
    }

    /// True when the symlink flag is set.
    pub const fn is_symlink(self) -> bool {
        self.0 & Self::SYMLINK.0 != 0
    }

    /// Permission bits only.
    pub const fn perm(self) -> u32 {
        self.0 & Self::PERM.0
    }
}

/// Stat result for a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDescriptor {
    name: String,
    size: u64,
    modified: DateTime<Utc>,
    mode: FileMode,
}

impl FileDescriptor {
    /// Create a descriptor from its parts.
    pub fn new(name: impl Into<String>, size: u64, modified: DateTime<Utc>, mode: FileMode) -> Self {
        Self {
            name: name.into(),
            size,
            modified,
            mode,
        }
    }

    /// Synthetic directory descriptor for a bucket or prefix.
    ///
    /// Size is [`FOLDER_SIZE`] and the modification time is the current time.
    pub fn folder(name: impl Into<String>) -> Self {
        Self::new(name, FOLDER_SIZE, Utc::now(), FileMode::DIR.union(FileMode::PERM))
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Mode bits.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// True for directories, real or synthetic.
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirEntry {
    name: String,
    file_type: FileMode,
    info: FileDescriptor,
}

impl DirEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, file_type: FileMode, info: FileDescriptor) -> Self {
        Self {
            name: name.into(),
            file_type,
            info,
        }
    }

    /// Final path segment of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }

    /// Type bits of the entry.
    pub fn file_type(&self) -> FileMode {
        self.file_type
    }

    /// Full descriptor of the entry.
    pub fn info(&self) -> &FileDescriptor {
        &self.info
    }
}
