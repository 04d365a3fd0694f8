use crate::error::{Result, ScribbleError};
use crate::lock::{self, LockRegistry};
use crate::logger::{LogFacade, Logger};
use crate::path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Construction options for a [`Store`].
#[derive(Clone, Default)]
pub struct Options {
    logger: Option<Arc<dyn Logger>>,
}

impl Options {
    /// Override the default logging sink.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// A directory of JSON records grouped into collections.
///
/// Records live at `<root>/<collection>/<resource>.json`. Writes and deletes
/// are serialized per collection; reads take no lock and rely on the
/// write-then-rename sequence to never see a partial record.
pub struct Store {
    root: PathBuf,
    locks: LockRegistry,
    log: Arc<dyn Logger>,
}

impl Store {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>, options: Option<Options>) -> Result<Self> {
        let root = path::clean(dir.as_ref());
        let log = options
            .and_then(|o| o.logger)
            .unwrap_or_else(|| Arc::new(LogFacade::default()));

        if root.exists() {
            log.debug(format_args!(
                "Using '{}' (database already exists)",
                root.display()
            ));
        } else {
            log.debug(format_args!("Creating database at '{}'...", root.display()));
            create_dir_all(&root)?;
        }

        Ok(Store {
            root,
            locks: LockRegistry::new(),
            log,
        })
    }

    /// Get the root data directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `value` as `<collection>/<resource>.json`, replacing any
    /// previous version in a single rename.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> Result<()> {
        path::validate(collection, resource)?;

        let lock = self.lock_for(collection);
        let _guard = lock::hold(&lock);

        let dir = path::collection_dir(&self.root, collection);
        let final_path = path::record_path(&self.root, collection, resource);
        let tmp_path = path::temp_path(&final_path);

        create_dir_all(&dir)?;

        let mut bytes = serde_json::to_vec_pretty(value)?;
        bytes.push(b'\n');

        write_synced(&tmp_path, &bytes)?;

        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Load and decode a record. The resource may be given with or without
    /// its `.json` extension.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T> {
        path::validate(collection, resource)?;

        let found = self.locate(collection, resource)?;
        let file = if found.is_dir() {
            path::record_path(&self.root, collection, resource)
        } else {
            found
        };

        let content = read_record(&file)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Raw text of every entry in a collection, in directory order.
    ///
    /// Temp files of in-flight writes are skipped, as are entries deleted
    /// between the listing and the read. Any other unreadable entry fails the
    /// whole scan.
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        path::validate_collection(collection)?;

        let dir = path::resolve(&path::collection_dir(&self.root, collection))?;

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry_path = entry?.path();
            if path::is_temp_file(&entry_path) {
                continue;
            }
            match fs::read_to_string(&entry_path) {
                Ok(content) => records.push(content),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(records)
    }

    /// `read_all`, decoding every record as `T`.
    pub fn read_all_as<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.read_all(collection)?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(ScribbleError::from))
            .collect()
    }

    /// Resource names of the committed records in a collection, sorted.
    pub fn list(&self, collection: &str) -> Result<Vec<String>> {
        path::validate_collection(collection)?;

        let dir = path::resolve(&path::collection_dir(&self.root, collection))?;

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let entry_path = entry.path();
            if !entry.file_type()?.is_file() || !path::is_record_file(&entry_path) {
                continue;
            }
            if let Some(stem) = entry_path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a record. If the target resolves to a directory (a nested
    /// collection), that directory is removed recursively.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        path::validate(collection, resource)?;

        let outer = self.lock_for(collection);
        let _outer_guard = lock::hold(&outer);

        let found = self.locate(collection, resource)?;
        if !found.is_dir() {
            return remove(&found);
        }

        // A directory is itself a collection; writers to it take its own lock.
        let nested = format!("{collection}/{resource}");
        if path::lock_key(&nested) == path::lock_key(collection) {
            return remove(&found);
        }
        let inner = self.lock_for(&nested);
        let _inner_guard = lock::hold(&inner);
        remove(&found)
    }

    /// Remove a whole collection directory.
    pub fn delete_collection(&self, collection: &str) -> Result<()> {
        path::validate_collection(collection)?;

        let lock = self.lock_for(collection);
        let _guard = lock::hold(&lock);

        let dir = path::collection_dir(&self.root, collection);
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {
                fs::remove_dir_all(&dir)?;
                Ok(())
            }
            Ok(_) => Err(ScribbleError::NotFound { path: dir }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ScribbleError::NotFound { path: dir }),
            Err(e) => Err(e.into()),
        }
    }

    fn lock_for(&self, collection: &str) -> Arc<std::sync::Mutex<()>> {
        self.locks.acquire(&path::lock_key(collection))
    }

    /// Resolve a record: the bare path wins only when it is a directory or a
    /// `.json` file, so a foreign file named like the resource never shadows
    /// the record itself.
    fn locate(&self, collection: &str, resource: &str) -> Result<PathBuf> {
        let record = path::record_path(&self.root, collection, resource);
        let found = path::resolve(&path::bare_path(&self.root, collection, resource))?;
        if found.is_dir() || path::is_record_file(&found) {
            Ok(found)
        } else {
            Ok(record)
        }
    }

    /// The logging sink this store reports to.
    pub fn logger(&self) -> &dyn Logger {
        self.log.as_ref()
    }
}

fn read_record(file: &Path) -> Result<String> {
    fs::read_to_string(file).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScribbleError::NotFound {
            path: file.to_path_buf(),
        },
        _ => e.into(),
    })
}

fn remove(target: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(target).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScribbleError::NotFound {
            path: target.to_path_buf(),
        },
        _ => e.into(),
    })?;
    if meta.is_dir() {
        fs::remove_dir_all(target)?;
    } else {
        fs::remove_file(target)?;
    }
    Ok(())
}

fn create_dir_all(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)?;
    Ok(())
}

fn write_synced(file: &Path, bytes: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut handle = options.open(file)?;
    handle.write_all(bytes)?;
    handle.sync_all()?;
    Ok(())
}
