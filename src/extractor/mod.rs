//! Concurrent extraction of registries from a directory tree.
//!
//! Every directory under the root is an independent unit of work. Units run
//! on a bounded pool of worker threads; each parses the `.rs` files of its own
//! directory, merges them into one per-directory registry and sends a single
//! report over a channel sized to the number of directories, so a worker
//! never blocks on send. The calling thread is the only aggregator and the
//! sole owner of the result: it merges reports one message at a time, last
//! write wins, recording every overwritten key.
//!
//! The first failed unit ends the extraction. Units still running are not
//! cancelled; they finish, and their reports are dropped with the channel.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_comments::extractor::{ExtractionGroup, ExtractionOptions};
//! use openapi_from_comments::grammar::DeclarationKind;
//! use openapi_from_comments::schema_generator::SchemaGenerator;
//! use std::path::Path;
//!
//! let group = ExtractionGroup::new(
//!     SchemaGenerator::new(DeclarationKind::Schema),
//!     ExtractionOptions::default(),
//! );
//! let extracted = group.run(Path::new("src/models")).unwrap();
//! println!("{} schemas, {} collisions", extracted.registry.len(), extracted.collisions.len());
//! ```

pub mod paths;
pub mod schemas;

use crate::constants::{DEFAULT_IGNORED_DIRECTORIES, DEFAULT_IGNORED_FILES};
use crate::error::{ExtractError, FileError};
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::DirectoryScanner;
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

/// A keyed collection that partial results are merged into.
pub trait Registry: Default + Send + 'static {
    /// Moves `incoming` into `self`, overwriting existing keys, and returns a
    /// description of every key that was overwritten.
    fn merge(&mut self, incoming: Self) -> Vec<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns one parsed file into a partial registry.
pub trait FileExtractor: Send + Sync + 'static {
    type Output: Registry;

    fn extract(&self, parsed: &ParsedFile) -> Result<Self::Output, FileError>;
}

/// Which directories and files an extraction skips, and how many workers it
/// may use.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Directory names skipped with their whole subtree.
    pub ignored_directories: Vec<String>,
    /// File name fragments; a file whose name contains one is skipped.
    pub ignored_files: Vec<String>,
    /// Worker pool size; defaults to the available parallelism.
    pub max_workers: Option<usize>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            ignored_directories: DEFAULT_IGNORED_DIRECTORIES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            ignored_files: DEFAULT_IGNORED_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            max_workers: None,
        }
    }
}

impl ExtractionOptions {
    fn worker_count(&self, units: usize) -> usize {
        let available = self
            .max_workers
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get));
        available.min(units).max(1)
    }

    fn is_ignored_file(&self, file_name: &str) -> bool {
        self.ignored_files
            .iter()
            .any(|fragment| !fragment.is_empty() && file_name.contains(fragment.as_str()))
    }
}

/// The merged outcome of one extraction.
#[derive(Debug)]
pub struct Extracted<R> {
    pub registry: R,
    /// Keys written more than once, in the order the overwrites happened.
    pub collisions: Vec<String>,
    /// Number of directory units that were dispatched.
    pub directories: usize,
}

/// What one directory unit reports back.
struct UnitReport<R> {
    directory: PathBuf,
    result: Result<(R, Vec<String>), ExtractError>,
}

/// A scoped extraction over one tree.
///
/// Each group owns its work queue and completion channel; nothing is shared
/// between two runs.
pub struct ExtractionGroup<E: FileExtractor> {
    extractor: Arc<E>,
    options: Arc<ExtractionOptions>,
}

impl<E: FileExtractor> ExtractionGroup<E> {
    pub fn new(extractor: E, options: ExtractionOptions) -> Self {
        Self {
            extractor: Arc::new(extractor),
            options: Arc::new(options),
        }
    }

    /// Extracts and merges every directory under `root`.
    ///
    /// # Errors
    ///
    /// Returns the first directory failure, or [`ExtractError::UnitsLost`]
    /// when a worker exits without reporting.
    pub fn run(self, root: &Path) -> Result<Extracted<E::Output>, ExtractError> {
        let scan = DirectoryScanner::new(
            root.to_path_buf(),
            self.options.ignored_directories.clone(),
        )
        .scan()?;

        let dispatched = scan.directories.len();
        let workers = self.options.worker_count(dispatched);
        info!(
            "Extracting {} directories under {} with {} workers",
            dispatched,
            root.display(),
            workers
        );

        let queue = Arc::new(Mutex::new(VecDeque::from(scan.directories)));
        let (sender, receiver) = sync_channel::<UnitReport<E::Output>>(dispatched.max(1));

        for index in 0..workers {
            let queue = Arc::clone(&queue);
            let sender = sender.clone();
            let extractor = Arc::clone(&self.extractor);
            let options = Arc::clone(&self.options);

            let spawned = thread::Builder::new()
                .name(format!("extract-{}", index))
                .spawn(move || worker(&queue, &sender, extractor.as_ref(), &options));
            if let Err(e) = spawned {
                warn!("Failed to start extraction worker {}: {}", index, e);
            }
        }
        // Workers hold the remaining senders; the channel closes when the last
        // one exits.
        drop(sender);

        let mut registry = E::Output::default();
        let mut collisions = Vec::new();
        let mut received = 0;

        for report in receiver.iter() {
            received += 1;
            match report.result {
                Ok((partial, unit_collisions)) => {
                    collisions.extend(unit_collisions);
                    collisions.extend(registry.merge(partial));
                }
                Err(e) => {
                    warn!(
                        "Extraction of {} failed, abandoning {} outstanding unit(s)",
                        report.directory.display(),
                        dispatched - received
                    );
                    return Err(e);
                }
            }
        }

        if received < dispatched {
            return Err(ExtractError::UnitsLost {
                missing: dispatched - received,
                dispatched,
            });
        }

        for collision in &collisions {
            warn!("Duplicate declaration overwritten: {}", collision);
        }

        info!(
            "Extracted {} entries from {} directories",
            registry.len(),
            dispatched
        );

        Ok(Extracted {
            registry,
            collisions,
            directories: dispatched,
        })
    }
}

fn worker<E: FileExtractor>(
    queue: &Mutex<VecDeque<PathBuf>>,
    sender: &SyncSender<UnitReport<E::Output>>,
    extractor: &E,
    options: &ExtractionOptions,
) {
    loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(directory) = next else {
            break;
        };

        let result = extract_directory(extractor, &directory, options);
        if sender.send(UnitReport { directory, result }).is_err() {
            debug!("Extraction already ended, dropping report");
        }
    }
}

/// Parses every non-ignored `.rs` file directly inside `directory` and merges
/// the per-file registries. Files that fail are skipped.
fn extract_directory<E: FileExtractor>(
    extractor: &E,
    directory: &Path,
    options: &ExtractionOptions,
) -> Result<(E::Output, Vec<String>), ExtractError> {
    let read_error = |source| ExtractError::ReadDirectory {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();

        let is_rust = path.extension().and_then(|s| s.to_str()) == Some("rs");
        if !is_rust || !path.is_file() || options.is_ignored_file(&file_name) {
            continue;
        }
        files.push(path);
    }
    files.sort();

    let mut registry = E::Output::default();
    let mut collisions = Vec::new();
    for parsed in AstParser::parse_files(&files).into_iter().flatten() {
        match extractor.extract(&parsed) {
            Ok(partial) => collisions.extend(registry.merge(partial)),
            Err(e) => debug!("Skipping {}: {}", parsed.path.display(), e),
        }
    }

    debug!(
        "{}: {} files, {} entries",
        directory.display(),
        files.len(),
        registry.len()
    );
    Ok((registry, collisions))
}
