//! The plugin filesystem handed to the script engine.
//!
//! A single `PluginFileSystem` per plugin, with every operation routed by
//! the variant of the [`VirtualPath`] it receives:
//!
//! | operation                  | Disk                   | InnerModule / HostClass  |
//! |----------------------------|------------------------|--------------------------|
//! | `check_access`             | per-mode, real path    | read only                |
//! | `new_byte_channel`         | `std::fs` file         | in-memory, read only     |
//! | `new_reader`               | buffered file          | in-memory                |
//! | `write`                    | replace content        | rejected                 |
//! | `create_directory`         | `create_dir_all`       | rejected                 |
//! | `delete`                   | file or empty dir      | rejected                 |
//! | `new_directory_stream`     | `read_dir`             | rejected                 |
//! | `read_attributes`          | metadata map           | rejected                 |
//! | `to_absolute_path`         | cwd-relative           | identity                 |
//! | `to_real_path`             | canonicalized          | identity                 |
//!
//! # Usage
//!
//! ```ignore
//! let fs = PluginFileSystem::new(services, "/srv/plugins/demo", 3);
//!
//! let path = fs.parse_path(":plugin-id");
//! fs.check_access(&path, &[AccessMode::Read], LinkOption::Follow)?;
//! let source = fs.read_to_string(&path)?; // "export const id = 3"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::channel::{ByteChannel, ModuleReader, OpenOptions, file_reader, memory_reader};
use super::dir::{DirFilter, DirectoryStream};
use crate::classify::PathClassifier;
use crate::error::{VfsError, VfsResult};
use crate::path::{AccessMode, LinkOption, VirtualPath};
use crate::provider::{DiskProvider, HostClassProvider, InnerModuleProvider, ResourceProvider};
use crate::resource::class::ClassHandle;
use crate::resource::inner::Content;
use crate::resource::read::decode_utf8;
use crate::services::HostServices;

/// Virtual filesystem of one plugin.
///
/// Cheap to create; all heavy state lives in the shared [`HostServices`].
pub struct PluginFileSystem<H> {
    services: Arc<HostServices<H>>,
    classifier: PathClassifier<H>,
    plugin_id: i32,
}

impl<H: ClassHandle> PluginFileSystem<H> {
    /// Create the filesystem of the plugin installed in `base_dir`.
    pub fn new(
        services: Arc<HostServices<H>>,
        base_dir: impl Into<PathBuf>,
        plugin_id: i32,
    ) -> Self {
        let classifier = PathClassifier::new(services.clone(), base_dir);
        Self {
            services,
            classifier,
            plugin_id,
        }
    }

    /// Get the plugin base directory.
    pub fn base_dir(&self) -> &Path {
        self.classifier.base_dir()
    }

    /// Get the plugin id.
    pub fn plugin_id(&self) -> i32 {
        self.plugin_id
    }

    /// Get the shared services.
    pub fn services(&self) -> &Arc<HostServices<H>> {
        &self.services
    }

    fn inner_modules(&self) -> InnerModuleProvider<'_, H> {
        InnerModuleProvider::new(&self.services, self.plugin_id)
    }

    fn host_classes(&self) -> HostClassProvider<'_, H> {
        HostClassProvider::new(&self.services)
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    /// Classify an import string. See [`PathClassifier::classify`].
    pub fn parse_path(&self, path: &str) -> VirtualPath {
        self.classifier.classify(path)
    }

    /// Classify a URI. See [`PathClassifier::classify_uri`].
    pub fn parse_uri(&self, uri: &str) -> VirtualPath {
        self.classifier.classify_uri(uri)
    }

    // =========================================================================
    // Access Control
    // =========================================================================

    /// Check that every mode in `modes` is permitted on `path`.
    ///
    /// Synthetic paths allow reading only and fail with
    /// [`VfsError::AccessRejected`] otherwise, without touching any cache.
    /// Disk paths are resolved to their real path, then each mode is checked
    /// independently and the first denied one fails with
    /// [`VfsError::AccessDenied`].
    pub fn check_access(
        &self,
        path: &VirtualPath,
        modes: &[AccessMode],
        link: LinkOption,
    ) -> VfsResult<()> {
        tracing::trace!(%path, ?modes, "check_access");
        match path {
            VirtualPath::Disk(p) => DiskProvider.check_access(p, modes, link),
            VirtualPath::InnerModule(name) => self.inner_modules().check_access(name, modes, link),
            VirtualPath::HostClass(name) => self.host_classes().check_access(name, modes, link),
        }
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Open a seekable channel on `path`.
    ///
    /// `options` only apply to disk paths; synthetic content is always
    /// served read-only. Modes are not re-validated here; that is the job of
    /// [`check_access`](Self::check_access).
    pub fn new_byte_channel(
        &self,
        path: &VirtualPath,
        options: OpenOptions,
    ) -> VfsResult<ByteChannel> {
        tracing::trace!(%path, ?options, "new_byte_channel");
        match path {
            VirtualPath::Disk(p) => Ok(ByteChannel::File(DiskProvider.open(p, options)?)),
            synthetic => {
                if options.wants_write() {
                    tracing::debug!(%synthetic, "write options ignored for read-only content");
                }
                Ok(ByteChannel::memory(self.read(synthetic)?))
            }
        }
    }

    /// Open a buffered reader on `path`.
    ///
    /// Serves exactly the same content as [`new_byte_channel`](Self::new_byte_channel).
    pub fn new_reader(&self, path: &VirtualPath) -> VfsResult<ModuleReader> {
        tracing::trace!(%path, "new_reader");
        match path {
            VirtualPath::Disk(p) => {
                let file = DiskProvider.open(p, OpenOptions::read_only())?;
                Ok(file_reader(file))
            }
            synthetic => Ok(memory_reader(self.read(synthetic)?)),
        }
    }

    /// Read the whole content of `path`.
    ///
    /// Every content entry point serves synthetic paths through this one
    /// primitive, so channels and readers see the same cached bytes.
    pub fn read(&self, path: &VirtualPath) -> VfsResult<Content> {
        match path {
            VirtualPath::Disk(p) => DiskProvider.read(p),
            VirtualPath::InnerModule(name) => self.inner_modules().read(name),
            VirtualPath::HostClass(name) => self.host_classes().read(name),
        }
    }

    /// Read `path` as UTF-8 text, stripping a byte order mark.
    pub fn read_to_string(&self, path: &VirtualPath) -> VfsResult<String> {
        let content = self.read(path)?;
        let text = decode_utf8(&content).map_err(|e| match path {
            VirtualPath::Disk(_) => VfsError::Io(e),
            synthetic => VfsError::unavailable(synthetic, e),
        })?;
        Ok(text.to_string())
    }

    // =========================================================================
    // Structure and Metadata
    // =========================================================================

    /// Create a directory (and missing parents).
    pub fn create_directory(&self, dir: &VirtualPath) -> VfsResult<()> {
        let dir = disk_only(dir, "create directory")?;
        DiskProvider.create_directory(dir)
    }

    /// Replace the content of a disk file, creating it if needed.
    pub fn write(&self, path: &VirtualPath, data: &[u8]) -> VfsResult<()> {
        let path = disk_only(path, "write")?;
        DiskProvider.write(path, data)
    }

    /// Delete a file or empty directory.
    pub fn delete(&self, path: &VirtualPath) -> VfsResult<()> {
        let path = disk_only(path, "delete")?;
        DiskProvider.delete(path)
    }

    /// List the children of `dir` accepted by `filter`.
    pub fn new_directory_stream(
        &self,
        dir: &VirtualPath,
        filter: Option<DirFilter>,
    ) -> VfsResult<DirectoryStream> {
        let dir = disk_only(dir, "list")?;
        DiskProvider.list(dir, filter)
    }

    /// Read basic attributes of `path`. See [`attributes`](crate::fs::attributes).
    pub fn read_attributes(
        &self,
        path: &VirtualPath,
        selector: &str,
        link: LinkOption,
    ) -> VfsResult<Map<String, Value>> {
        let path = disk_only(path, "read attributes")?;
        DiskProvider.stat(path, selector, link)
    }

    /// Make `path` absolute. Synthetic paths are returned unchanged.
    pub fn to_absolute_path(&self, path: &VirtualPath) -> VirtualPath {
        match path {
            VirtualPath::Disk(p) => VirtualPath::Disk(DiskProvider.to_absolute_path(p)),
            synthetic => synthetic.clone(),
        }
    }

    /// Canonicalize `path`. Synthetic paths are returned unchanged.
    pub fn to_real_path(&self, path: &VirtualPath, link: LinkOption) -> VfsResult<VirtualPath> {
        match path {
            VirtualPath::Disk(p) => Ok(VirtualPath::Disk(DiskProvider.to_real_path(p, link)?)),
            synthetic => Ok(synthetic.clone()),
        }
    }
}

/// Reject structural operations on synthetic paths.
fn disk_only<'a>(path: &'a VirtualPath, operation: &str) -> VfsResult<&'a Path> {
    path.as_disk().ok_or_else(|| VfsError::rejected(path, operation))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::resource::inner::{MapBundle, ModuleBundle};
    use std::fs;
    use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Bundle that counts lookups.
    struct CountingBundle {
        inner: MapBundle,
        opens: Arc<AtomicUsize>,
    }

    impl ModuleBundle for CountingBundle {
        fn open(&self, resource: &str) -> io::Result<Option<Vec<u8>>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.inner.open(resource)
        }
    }

    struct Fixture {
        dir: TempDir,
        services: Arc<HostServices<Arc<str>>>,
        opens: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            crate::test_support::init_tracing();
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("demo/lib")).unwrap();
            fs::write(dir.path().join("demo/main.js"), "import ':util'").unwrap();
            fs::write(dir.path().join("demo/lib/a.js"), "export {}").unwrap();

            let mut inner = MapBundle::new();
            inner.insert("inner-module/util.js", "export const answer = 42");
            let opens = Arc::new(AtomicUsize::new(0));

            let services = HostServices::builder()
                .plugin_root(dir.path())
                .bundle(CountingBundle {
                    inner,
                    opens: opens.clone(),
                })
                .resolver(|name: &str| name.starts_with("host.").then(|| Arc::<str>::from(name)))
                .exporter(|class: &Arc<str>| -> Result<String, BoxError> {
                    Ok(format!("export default Java.type(\"{class}\")"))
                })
                .build()
                .into_shared();

            Self {
                dir,
                services,
                opens,
            }
        }

        fn plugin(&self, id: i32) -> PluginFileSystem<Arc<str>> {
            PluginFileSystem::new(self.services.clone(), self.dir.path().join("demo"), id)
        }
    }

    #[test]
    fn test_plugin_id_per_plugin() {
        let fixture = Fixture::new();
        let first = fixture.plugin(1);
        let second = fixture.plugin(2);

        let path = first.parse_path(":plugin-id");
        assert_eq!(first.read_to_string(&path).unwrap(), "export const id = 1");
        assert_eq!(second.read_to_string(&path).unwrap(), "export const id = 2");
        assert_eq!(first.read_to_string(&path).unwrap(), "export const id = 1");
        assert_eq!(fixture.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_inner_module_not_cached() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path(":missing");

        assert!(vfs.read(&path).unwrap().is_empty());
        assert!(vfs.read(&path).unwrap().is_empty());
        assert_eq!(fixture.opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_inner_module_cached_across_entry_points() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path(":util");

        let mut text = String::new();
        vfs.new_byte_channel(&path, OpenOptions::read_only())
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "export const answer = 42");

        let line = vfs.new_reader(&path).unwrap().lines().next().unwrap().unwrap();
        assert_eq!(line, "export const answer = 42");

        // Second plugin shares the cache
        fixture.plugin(9).read(&path).unwrap();
        assert_eq!(fixture.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_evicted_module_is_reloaded() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path(":util");

        vfs.read(&path).unwrap();
        fixture.services.inner_modules().trim_to(0);
        assert_eq!(&*vfs.read(&path).unwrap(), b"export const answer = 42");
        assert_eq!(fixture.opens.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_synthetic_access_control() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);

        for input in [":util", "host.example.Thing"] {
            let path = vfs.parse_path(input);
            assert!(path.is_synthetic(), "{input}");
            assert!(vfs.check_access(&path, &[AccessMode::Read], LinkOption::Follow).is_ok());
            for modes in [
                &[AccessMode::Write][..],
                &[AccessMode::Execute][..],
                &[AccessMode::Read, AccessMode::Write][..],
            ] {
                let err = vfs.check_access(&path, modes, LinkOption::Follow).unwrap_err();
                assert!(matches!(err, VfsError::AccessRejected { .. }), "{input} {modes:?}");
            }
        }
        // Rejections never touch the caches
        assert!(fixture.services.inner_modules().is_empty());
    }

    #[test]
    fn test_synthetic_structure_rejected() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path(":util");

        assert!(matches!(vfs.create_directory(&path), Err(VfsError::AccessRejected { .. })));
        assert!(matches!(vfs.delete(&path), Err(VfsError::AccessRejected { .. })));
        assert!(matches!(vfs.write(&path, b"x"), Err(VfsError::AccessRejected { .. })));
        assert!(matches!(
            vfs.new_directory_stream(&path, None),
            Err(VfsError::AccessRejected { .. })
        ));
        assert!(matches!(
            vfs.read_attributes(&path, "*", LinkOption::Follow),
            Err(VfsError::AccessRejected { .. })
        ));
    }

    #[test]
    fn test_synthetic_paths_are_canonical() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path("host.example.Thing");

        assert_eq!(vfs.to_absolute_path(&path), path);
        assert_eq!(vfs.to_real_path(&path, LinkOption::Follow).unwrap(), path);
    }

    #[test]
    fn test_host_class_export() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        let path = vfs.parse_path("host.example.Thing");
        assert_eq!(path, VirtualPath::HostClass("host.example.Thing".into()));

        let mut channel = vfs.new_byte_channel(&path, OpenOptions::read_only().write(true)).unwrap();
        assert!(channel.is_read_only());
        assert!(channel.write(b"x").is_err());

        let mut text = String::new();
        channel.read_to_string(&mut text).unwrap();
        assert_eq!(text, "export default Java.type(\"host.example.Thing\")");
    }

    #[test]
    fn test_unknown_class_reads_from_disk() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        fs::write(vfs.base_dir().join("com.example.Foo"), "export const foo = 1").unwrap();

        let path = vfs.parse_path("com.example.Foo");
        assert_eq!(path, VirtualPath::Disk(vfs.base_dir().join("com.example.Foo")));
        assert_eq!(vfs.read_to_string(&path).unwrap(), "export const foo = 1");
    }

    #[test]
    fn test_write_disk_file() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);

        let path = vfs.parse_path("config.js");
        vfs.write(&path, b"export default {}").unwrap();
        assert_eq!(vfs.read_to_string(&path).unwrap(), "export default {}");

        vfs.write(&path, b"export {}").unwrap();
        assert_eq!(vfs.read_to_string(&path).unwrap(), "export {}");
    }

    #[test]
    fn test_disk_round_trip() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);

        let dir = vfs.parse_path("data");
        vfs.create_directory(&dir).unwrap();

        let file = vfs.parse_path("data/state.json");
        let mut channel = vfs
            .new_byte_channel(&file, OpenOptions::read_only().write(true).create(true))
            .unwrap();
        channel.write_all(b"{\"n\":1}").unwrap();
        channel.seek(SeekFrom::Start(0)).unwrap();
        let mut text = String::new();
        channel.read_to_string(&mut text).unwrap();
        assert_eq!(text, "{\"n\":1}");

        let attrs = vfs.read_attributes(&file, "size", LinkOption::Follow).unwrap();
        assert_eq!(attrs["size"], Value::from(7u64));

        let listed: Vec<_> = vfs
            .new_directory_stream(&dir, None)
            .unwrap()
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(listed.len(), 1);

        vfs.delete(&file).unwrap();
        vfs.delete(&dir).unwrap();
        assert!(!vfs.base_dir().join("data").exists());
    }

    #[test]
    fn test_plugin_root_import() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);
        fs::create_dir_all(fixture.dir.path().join("@shared")).unwrap();
        fs::write(fixture.dir.path().join("@shared/lib.js"), "export {}").unwrap();

        let path = vfs.parse_path("@shared/lib.js");
        assert_eq!(path, VirtualPath::Disk(fixture.dir.path().join("@shared/lib.js")));
        assert!(vfs.check_access(&path, &[AccessMode::Read], LinkOption::Follow).is_ok());
        assert_eq!(vfs.read_to_string(&path).unwrap(), "export {}");
    }

    #[test]
    fn test_disk_real_path() {
        let fixture = Fixture::new();
        let vfs = fixture.plugin(0);

        let path = vfs.parse_path("lib/../main.js");
        let real = vfs.to_real_path(&path, LinkOption::Follow).unwrap();
        assert_eq!(
            real,
            VirtualPath::Disk(vfs.base_dir().join("main.js").canonicalize().unwrap())
        );
        assert!(vfs.to_real_path(&vfs.parse_path("missing.js"), LinkOption::Follow).is_err());
    }

    #[test]
    fn test_concurrent_plugins() {
        let fixture = Fixture::new();
        std::thread::scope(|s| {
            for id in 0..8 {
                let fixture = &fixture;
                s.spawn(move || {
                    let vfs = fixture.plugin(id);
                    for _ in 0..50 {
                        let util = vfs.parse_path(":util");
                        assert_eq!(&*vfs.read(&util).unwrap(), b"export const answer = 42");
                        let own = vfs.parse_path(":plugin-id");
                        assert_eq!(
                            vfs.read_to_string(&own).unwrap(),
                            format!("export const id = {id}")
                        );
                        let class = vfs.parse_path("host.example.Thing");
                        assert!(class.is_synthetic());
                    }
                });
            }
        });
        assert_eq!(fixture.services.classes().len(), 1);
    }
}
