//! Seekable byte channels handed to the script engine.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom, Write};

use crate::resource::inner::Content;

/// Options for [`new_byte_channel`](crate::PluginFileSystem::new_byte_channel).
///
/// Mirrors [`std::fs::OpenOptions`] but stays inspectable, so the same value
/// can be applied to disk files and ignored for synthetic content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::read_only()
    }
}

impl OpenOptions {
    /// Open for reading only.
    pub const fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
        }
    }

    /// Set read access.
    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Set write access.
    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Set append mode.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Truncate an existing file on open.
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Create the file if missing.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Create the file, failing if it exists.
    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    /// Check if any option asks for modification.
    pub fn wants_write(&self) -> bool {
        self.write || self.append || self.truncate || self.create || self.create_new
    }

    pub(crate) fn to_std(self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new);
        options
    }
}

/// A seekable byte source over either a disk file or in-memory content.
///
/// In-memory channels are read-only: writes fail with
/// [`io::ErrorKind::PermissionDenied`].
#[derive(Debug)]
pub enum ByteChannel {
    /// Open disk file.
    File(File),
    /// Synthetic content (inner module or class export).
    Memory(Cursor<Content>),
}

impl ByteChannel {
    /// Wrap synthetic content.
    pub fn memory(content: Content) -> Self {
        Self::Memory(Cursor::new(content))
    }

    /// Check if writes can succeed on this channel.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl Read for ByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for ByteChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}

impl Write for ByteChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.write(buf),
            Self::Memory(_) => Err(read_only_channel()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(file) => file.flush(),
            Self::Memory(_) => Ok(()),
        }
    }
}

fn read_only_channel() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "channel is read-only")
}

/// Buffered text reader returned by [`new_reader`](crate::PluginFileSystem::new_reader).
pub type ModuleReader = Box<dyn BufRead + Send>;

pub(crate) fn memory_reader(content: Content) -> ModuleReader {
    Box::new(Cursor::new(content))
}

pub(crate) fn file_reader(file: File) -> ModuleReader {
    Box::new(BufReader::new(file))
}
