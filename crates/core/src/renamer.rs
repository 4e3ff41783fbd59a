use crate::collision::{find_unique_target_path, ClaimTable};
use crate::crop_factor::CropFactorTable;
use crate::discovery::collect_files;
use crate::formatter::{file_extension, format_base_name};
use crate::metadata::normalize;
use crate::result::{ProgressListener, RenameError, RenameResult, RenameSummary, NO_EXIF_DATE};
use crate::tags::MetadataReader;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConfig {
    pub target_folder: PathBuf,
    pub recursive: bool,
    pub dry_run: bool,
}

/// Result of reading and formatting one file, before a target is chosen.
enum Naming {
    Named { base: String, extension: String },
    Skipped(RenameResult),
}

/// Per-file pipeline: read tags, normalize, format, resolve the target and
/// rename. Holds only shared read-only state.
pub struct FileProcessor {
    reader: Arc<dyn MetadataReader>,
    crop_factors: Arc<CropFactorTable>,
}

impl FileProcessor {
    pub fn new(reader: Arc<dyn MetadataReader>, crop_factors: Arc<CropFactorTable>) -> Self {
        Self {
            reader,
            crop_factors,
        }
    }

    pub fn process_file(&self, path: &Path, dry_run: bool, claims: &ClaimTable) -> RenameResult {
        match self.name_file(path) {
            Naming::Skipped(result) => result,
            Naming::Named { base, extension } => {
                match find_unique_target_path(path, &base, &extension, claims) {
                    Ok(target) => self.commit(path, &target, dry_run),
                    Err(err) => RenameResult::error(path, &err),
                }
            }
        }
    }

    fn name_file(&self, path: &Path) -> Naming {
        let Some(tags) = self.reader.read(path) else {
            return Naming::Skipped(RenameResult::skipped(path, NO_EXIF_DATE));
        };
        let fields = normalize(tags.as_ref(), &self.crop_factors);
        let Some(timestamp) = fields.timestamp else {
            return Naming::Skipped(RenameResult::skipped(path, NO_EXIF_DATE));
        };

        Naming::Named {
            base: format_base_name(timestamp, &fields),
            extension: file_extension(path),
        }
    }

    fn commit(&self, path: &Path, target: &Path, dry_run: bool) -> RenameResult {
        if !dry_run {
            if let Err(source) = fs::rename(path, target) {
                let err = RenameError::Move {
                    from: path.to_path_buf(),
                    to: target.to_path_buf(),
                    source,
                };
                log::debug!("{}", err);
                return RenameResult::error(path, &err);
            }
        }

        log::debug!(
            "{} {} -> {}",
            if dry_run { "planned" } else { "renamed" },
            path.display(),
            target.display()
        );
        RenameResult::success(path, target)
    }
}

#[derive(Debug, Default)]
struct PoolState {
    in_flight: Mutex<usize>,
    idle: Condvar,
    closed: AtomicBool,
    cancelled: AtomicBool,
}

impl PoolState {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        *self.lock() += 1;
    }

    fn finish(&self) {
        let mut in_flight = self.lock();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .idle
            .wait_timeout_while(guard, timeout, |in_flight| *in_flight > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *guard == 0
    }
}

/// Renames every supported image under a folder on a fixed-size worker pool.
pub struct Renamer {
    pool: rayon::ThreadPool,
    processor: Arc<FileProcessor>,
    state: Arc<PoolState>,
}

impl Renamer {
    pub fn new(reader: Arc<dyn MetadataReader>, crop_factors: Arc<CropFactorTable>) -> Result<Self> {
        Self::with_workers(reader, crop_factors, default_workers())
    }

    pub fn with_workers(
        reader: Arc<dyn MetadataReader>,
        crop_factors: Arc<CropFactorTable>,
        workers: usize,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("photo-renamer-{index}"))
            .build()
            .context("failed to build the rename worker pool")?;

        Ok(Self {
            pool,
            processor: Arc::new(FileProcessor::new(reader, crop_factors)),
            state: Arc::new(PoolState::default()),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Processes a single file outside of a batch run.
    pub fn process_file(&self, path: &Path, dry_run: bool) -> RenameResult {
        self.processor.process_file(path, dry_run, &ClaimTable::new())
    }

    /// Blocks until every discovered file has a result.
    ///
    /// Tags are read and names formatted on the pool. Targets are then
    /// resolved on the calling thread in discovery order, so files sharing a
    /// base name always get the same suffixes. The moves run on the pool again
    /// and reach the listener in completion order.
    pub fn rename_photos(
        &self,
        config: &RenameConfig,
        listener: &mut dyn ProgressListener,
    ) -> Result<RenameSummary> {
        if self.state.closed.load(Ordering::SeqCst) {
            bail!("the renamer has been shut down");
        }

        let files = collect_files(&config.target_folder, config.recursive);
        let total = files.len();
        log::info!(
            "found {} image(s) in {} (recursive={}, dry_run={})",
            total,
            config.target_folder.display(),
            config.recursive,
            config.dry_run
        );
        listener.on_start(total);

        let mut namings: Vec<Option<Result<Naming, RenameError>>> =
            (0..total).map(|_| None).collect();
        let named = self.dispatch(files.clone(), |processor, path: PathBuf| {
            processor.name_file(&path)
        });
        for (index, outcome) in named {
            namings[index] = Some(outcome);
        }

        let mut summary = RenameSummary::default();
        let claims = ClaimTable::new();
        let mut moves = Vec::new();
        for (path, naming) in files.iter().zip(namings) {
            let Some(naming) = naming else { continue };
            let result = match naming {
                Err(err) => RenameResult::error(path, &err),
                Ok(Naming::Skipped(result)) => result,
                Ok(Naming::Named { base, extension }) => {
                    match find_unique_target_path(path, &base, &extension, &claims) {
                        Ok(target) => {
                            moves.push((path.clone(), target));
                            continue;
                        }
                        Err(err) => RenameResult::error(path, &err),
                    }
                }
            };
            summary.record(&result);
            listener.on_progress(result);
        }

        let dry_run = config.dry_run;
        let moved = self.dispatch(
            moves.clone(),
            move |processor, (path, target): (PathBuf, PathBuf)| {
                processor.commit(&path, &target, dry_run)
            },
        );
        for (index, outcome) in moved {
            let result = outcome.unwrap_or_else(|err| RenameResult::error(&moves[index].0, &err));
            summary.record(&result);
            listener.on_progress(result);
        }

        let missing = total.saturating_sub(summary.total());
        if missing > 0 {
            log::warn!("{missing} task(s) ended without reporting a result");
            summary.errors += missing;
        }

        log::info!(
            "done: renamed={} skipped={} errors={}",
            summary.renamed,
            summary.skipped,
            summary.errors
        );
        listener.on_complete(summary.renamed, summary.skipped, summary.errors);
        Ok(summary)
    }

    /// Spawns one task per item and yields `(item index, outcome)` in
    /// completion order. Panics and cancellation become errors.
    fn dispatch<I, T, F>(
        &self,
        items: Vec<I>,
        task: F,
    ) -> mpsc::Receiver<(usize, Result<T, RenameError>)>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(&FileProcessor, I) -> T + Send + Sync + 'static,
    {
        let task = Arc::new(task);
        let (tx, rx) = mpsc::channel();
        for (index, item) in items.into_iter().enumerate() {
            let tx = tx.clone();
            let task = Arc::clone(&task);
            let processor = Arc::clone(&self.processor);
            let state = Arc::clone(&self.state);

            state.begin();
            self.pool.spawn(move || {
                let outcome = if state.cancelled.load(Ordering::SeqCst) {
                    Err(RenameError::Cancelled)
                } else {
                    panic::catch_unwind(AssertUnwindSafe(|| task(&processor, item)))
                        .map_err(|payload| RenameError::Panicked(panic_message(payload.as_ref())))
                };
                // The receiver only goes away if the caller unwound.
                let _ = tx.send((index, outcome));
                state.finish();
            });
        }
        rx
    }

    /// Refuses new runs and waits up to `timeout` for in-flight tasks. On
    /// timeout, tasks that have not started yet are cancelled. Returns whether
    /// the pool drained in time.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.state.closed.store(true, Ordering::SeqCst);
        let drained = self.state.wait_idle(timeout);
        if !drained {
            self.state.cancelled.store(true, Ordering::SeqCst);
            log::warn!(
                "workers still busy after {:?}; cancelling queued files",
                timeout
            );
        }
        drained
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif_reader::fixtures::{oppo_fields, write_jpeg, write_tiff};
    use crate::exif_reader::ExifReader;
    use crate::tags::{Block, TagDirectory, TagKey, TagSet};
    use std::collections::HashMap;
    use std::thread;
    use tempfile::tempdir;

    const OPPO_NAME: &str = "20251023_104114_OPPO Find X9 Pro_140_mm_F2.1_1-364_ISO50";

    #[derive(Default)]
    struct Recorder {
        total: Option<usize>,
        results: Vec<RenameResult>,
        complete: Option<(usize, usize, usize)>,
    }

    impl ProgressListener for Recorder {
        fn on_start(&mut self, total: usize) {
            self.total = Some(total);
        }

        fn on_progress(&mut self, result: RenameResult) {
            self.results.push(result);
        }

        fn on_complete(&mut self, renamed: usize, skipped: usize, errors: usize) {
            self.complete = Some((renamed, skipped, errors));
        }
    }

    impl Recorder {
        fn sorted_results(&self) -> Vec<RenameResult> {
            let mut results = self.results.clone();
            results.sort_by(|a, b| a.original().cmp(b.original()));
            results
        }
    }

    /// Tags keyed by file name; files not in the map have no metadata.
    struct FixedReader(HashMap<String, TagSet>);

    impl MetadataReader for FixedReader {
        fn read(&self, path: &Path) -> Option<Box<dyn TagDirectory>> {
            let name = path.file_name()?.to_string_lossy().to_string();
            if name.starts_with("panic") {
                panic!("corrupt container in {name}");
            }
            self.0
                .get(&name)
                .cloned()
                .map(|tags| Box::new(tags) as Box<dyn TagDirectory>)
        }
    }

    /// Same tags for every file, with a read delay derived from the digits in
    /// the file name so completion order differs from discovery order.
    struct StaggeredReader(TagSet);

    impl MetadataReader for StaggeredReader {
        fn read(&self, path: &Path) -> Option<Box<dyn TagDirectory>> {
            let n = path
                .file_stem()?
                .to_string_lossy()
                .chars()
                .filter_map(|c| c.to_digit(10))
                .fold(0u64, |acc, d| acc * 10 + u64::from(d));
            thread::sleep(Duration::from_millis((n * 7) % 5));
            Some(Box::new(self.0.clone()))
        }
    }

    /// Deletes files named `gone*` while reading them, so their move fails.
    struct VanishingReader(TagSet);

    impl MetadataReader for VanishingReader {
        fn read(&self, path: &Path) -> Option<Box<dyn TagDirectory>> {
            if path.file_name()?.to_string_lossy().starts_with("gone") {
                fs::remove_file(path).expect("remove source");
            }
            Some(Box::new(self.0.clone()))
        }
    }

    /// Blocks every read until released.
    struct GatedReader {
        tags: TagSet,
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl MetadataReader for GatedReader {
        fn read(&self, _path: &Path) -> Option<Box<dyn TagDirectory>> {
            let _ = self.started.lock().expect("lock").send(());
            let _ = self
                .release
                .lock()
                .expect("lock")
                .recv_timeout(Duration::from_secs(5));
            Some(Box::new(self.tags.clone()))
        }
    }

    fn dated(timestamp: &str, model: &str) -> TagSet {
        TagSet::new()
            .with_key(
                Block::Detail,
                TagKey::DateTimeOriginal,
                "DateTimeOriginal",
                timestamp,
            )
            .with_key(Block::Primary, TagKey::Model, "Model", model)
    }

    fn crop_factors() -> Arc<CropFactorTable> {
        Arc::new(CropFactorTable::builtin().expect("builtin rules"))
    }

    fn exif_renamer() -> Renamer {
        Renamer::with_workers(Arc::new(ExifReader), crop_factors(), 4).expect("pool")
    }

    fn fixed_renamer(tags: Vec<(&str, TagSet)>) -> Renamer {
        let map = tags
            .into_iter()
            .map(|(name, tags)| (name.to_string(), tags))
            .collect();
        Renamer::with_workers(Arc::new(FixedReader(map)), crop_factors(), 4).expect("pool")
    }

    fn config(root: &Path, dry_run: bool) -> RenameConfig {
        RenameConfig {
            target_folder: root.to_path_buf(),
            recursive: true,
            dry_run,
        }
    }

    #[test]
    fn renames_sample_capture_end_to_end() {
        let temp = tempdir().expect("tempdir");
        let original = temp.path().join("IMG20251023104114.jpg");
        write_jpeg(&original, &oppo_fields());
        let expected_name = format!("{OPPO_NAME}.jpg");
        let renamer = exif_renamer();

        let dry = renamer.process_file(&original, true);
        assert_eq!(
            dry,
            RenameResult::Success {
                original: original.clone(),
                new_name: expected_name.clone(),
            }
        );
        assert!(original.exists(), "dry run must not touch the file");

        let live = renamer.process_file(&original, false);
        assert_eq!(dry, live);
        assert!(!original.exists());
        assert!(temp.path().join(&expected_name).exists());
    }

    #[test]
    fn files_without_date_are_skipped_in_both_modes() {
        let temp = tempdir().expect("tempdir");
        let original = temp.path().join("scan.jpg");
        fs::write(&original, b"no exif here").expect("write");
        let renamer = exif_renamer();

        for dry_run in [true, false] {
            let result = renamer.process_file(&original, dry_run);
            assert_eq!(result, RenameResult::skipped(&original, NO_EXIF_DATE));
            assert!(original.exists());
        }
    }

    #[test]
    fn batch_reports_every_file_once() {
        let temp = tempdir().expect("tempdir");
        write_tiff(&temp.path().join("oppo.tif"), &oppo_fields());
        fs::write(temp.path().join("broken.jpg"), b"junk").expect("write");
        fs::write(temp.path().join("readme.txt"), b"not an image").expect("write");
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).expect("mkdir");
        write_tiff(&nested.join("copy.TIF"), &oppo_fields());

        let mut recorder = Recorder::default();
        let summary = exif_renamer()
            .rename_photos(&config(temp.path(), true), &mut recorder)
            .expect("run");

        assert_eq!(recorder.total, Some(3));
        assert_eq!(recorder.results.len(), 3);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(recorder.complete, Some((2, 1, 0)));
    }

    #[test]
    fn flat_run_ignores_subfolders() {
        let temp = tempdir().expect("tempdir");
        write_tiff(&temp.path().join("top.tif"), &oppo_fields());
        let nested = temp.path().join("nested");
        fs::create_dir_all(&nested).expect("mkdir");
        write_tiff(&nested.join("deep.tif"), &oppo_fields());

        let mut recorder = Recorder::default();
        let mut flat = config(temp.path(), true);
        flat.recursive = false;
        exif_renamer()
            .rename_photos(&flat, &mut recorder)
            .expect("run");

        assert_eq!(recorder.total, Some(1));
        assert_eq!(recorder.results[0].original(), temp.path().join("top.tif"));
    }

    #[test]
    fn dry_runs_are_repeatable() {
        let temp = tempdir().expect("tempdir");
        for name in ["a.jpg", "b.jpg", "c.png"] {
            fs::write(temp.path().join(name), b"x").expect("write");
        }
        let renamer = fixed_renamer(vec![
            ("a.jpg", dated("2024:01:01 10:00:00", "X-T5")),
            ("b.jpg", dated("2024:01:01 10:00:01", "X-T5")),
            ("c.png", dated("2024:01:01 10:00:02", "iPhone 14")),
        ]);

        let mut first = Recorder::default();
        let mut second = Recorder::default();
        renamer
            .rename_photos(&config(temp.path(), true), &mut first)
            .expect("first run");
        renamer
            .rename_photos(&config(temp.path(), true), &mut second)
            .expect("second run");

        assert_eq!(first.sorted_results(), second.sorted_results());
        assert!(first.results.iter().all(|r| matches!(r, RenameResult::Success { .. })));
        for name in ["a.jpg", "b.jpg", "c.png"] {
            assert!(temp.path().join(name).exists());
        }
    }

    #[test]
    fn colliding_names_follow_discovery_order() {
        let temp = tempdir().expect("tempdir");
        for i in 0..8 {
            fs::write(temp.path().join(format!("f{i}.jpg")), b"x").expect("write");
        }
        let reader = StaggeredReader(dated("2024:05:05 05:05:05", "X-T5"));
        let renamer = Renamer::with_workers(Arc::new(reader), crop_factors(), 4).expect("pool");

        let mut first = Recorder::default();
        let mut second = Recorder::default();
        renamer
            .rename_photos(&config(temp.path(), true), &mut first)
            .expect("first run");
        renamer
            .rename_photos(&config(temp.path(), true), &mut second)
            .expect("second run");

        let expected: Vec<RenameResult> = (0..8)
            .map(|i| RenameResult::Success {
                original: temp.path().join(format!("f{i}.jpg")),
                new_name: if i == 0 {
                    "20240505_050505_X-T5.jpg".to_string()
                } else {
                    format!("20240505_050505_X-T5_{i}.jpg")
                },
            })
            .collect();
        assert_eq!(first.sorted_results(), expected);
        assert_eq!(second.sorted_results(), expected);
    }

    #[test]
    fn identical_captures_never_overwrite_each_other() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("a.jpg"), b"A").expect("write");
        fs::write(temp.path().join("b.jpg"), b"B").expect("write");
        let renamer = fixed_renamer(vec![
            ("a.jpg", dated("2024:05:05 05:05:05", "X-T5")),
            ("b.jpg", dated("2024:05:05 05:05:05", "X-T5")),
        ]);

        let mut recorder = Recorder::default();
        let summary = renamer
            .rename_photos(&config(temp.path(), false), &mut recorder)
            .expect("run");
        assert_eq!(summary.renamed, 2);

        let base = temp.path().join("20240505_050505_X-T5.jpg");
        let suffixed = temp.path().join("20240505_050505_X-T5_1.jpg");
        assert_eq!(fs::read(&base).expect("base exists"), b"A");
        assert_eq!(fs::read(&suffixed).expect("suffixed exists"), b"B");
    }

    #[test]
    fn existing_target_is_never_overwritten() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("new.jpg"), b"new").expect("write");
        fs::write(temp.path().join("20240505_050505_X-T5.jpg"), b"old").expect("write");
        let renamer = fixed_renamer(vec![("new.jpg", dated("2024:05:05 05:05:05", "X-T5"))]);

        let result = renamer.process_file(&temp.path().join("new.jpg"), false);
        assert_eq!(
            result,
            RenameResult::Success {
                original: temp.path().join("new.jpg"),
                new_name: "20240505_050505_X-T5_1.jpg".to_string(),
            }
        );
        assert_eq!(
            fs::read(temp.path().join("20240505_050505_X-T5.jpg")).expect("read"),
            b"old"
        );
    }

    #[test]
    fn failed_move_is_reported_and_batch_continues() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("gone.jpg"), b"G").expect("write");
        fs::write(temp.path().join("kept.jpg"), b"K").expect("write");
        let reader = VanishingReader(dated("2024:05:05 05:05:05", "X-T5"));
        let renamer = Renamer::with_workers(Arc::new(reader), crop_factors(), 2).expect("pool");

        let mut recorder = Recorder::default();
        let summary = renamer
            .rename_photos(&config(temp.path(), false), &mut recorder)
            .expect("run");

        assert_eq!((summary.renamed, summary.skipped, summary.errors), (1, 0, 1));
        let results = recorder.sorted_results();
        match &results[0] {
            RenameResult::Error { original, reason } => {
                assert_eq!(original, &temp.path().join("gone.jpg"));
                assert!(reason.starts_with("IoError: cannot move"), "{reason}");
            }
            other => panic!("expected an error, got {other:?}"),
        }
        assert!(!temp.path().join("20240505_050505_X-T5.jpg").exists());
        assert_eq!(
            fs::read(temp.path().join("20240505_050505_X-T5_1.jpg")).expect("kept moved"),
            b"K"
        );
    }

    #[test]
    fn panics_become_error_results() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("ok.jpg"), b"x").expect("write");
        fs::write(temp.path().join("panic.jpg"), b"x").expect("write");
        let renamer = fixed_renamer(vec![("ok.jpg", dated("2024:01:01 00:00:00", "X-T5"))]);

        let mut recorder = Recorder::default();
        let summary = renamer
            .rename_photos(&config(temp.path(), false), &mut recorder)
            .expect("run");

        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.errors, 1);
        let error = recorder
            .results
            .iter()
            .find(|r| matches!(r, RenameResult::Error { .. }))
            .expect("error result");
        assert_eq!(
            error,
            &RenameResult::Error {
                original: temp.path().join("panic.jpg"),
                reason: "Panic: corrupt container in panic.jpg".to_string(),
            }
        );
        assert!(temp.path().join("panic.jpg").exists());
    }

    #[test]
    fn missing_folder_completes_with_zero_files() {
        let temp = tempdir().expect("tempdir");
        let mut recorder = Recorder::default();
        let summary = exif_renamer()
            .rename_photos(&config(&temp.path().join("missing"), true), &mut recorder)
            .expect("run");

        assert_eq!(summary, RenameSummary::default());
        assert_eq!(recorder.total, Some(0));
        assert_eq!(recorder.complete, Some((0, 0, 0)));
    }

    #[test]
    fn shutdown_refuses_new_runs() {
        let temp = tempdir().expect("tempdir");
        let renamer = exif_renamer();

        assert!(renamer.shutdown(Duration::from_secs(1)));
        assert!(renamer.is_shut_down());
        let err = renamer
            .rename_photos(&config(temp.path(), true), &mut Recorder::default())
            .expect_err("closed renamer must refuse");
        assert!(err.to_string().contains("shut down"));
    }

    #[test]
    fn shutdown_timeout_cancels_queued_files() {
        let temp = tempdir().expect("tempdir");
        let names = ["a.jpg", "b.jpg", "c.jpg"];
        for name in names {
            fs::write(temp.path().join(name), b"x").expect("write");
        }
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let reader = GatedReader {
            tags: dated("2024:05:05 05:05:05", "X-T5"),
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        };
        let renamer =
            Arc::new(Renamer::with_workers(Arc::new(reader), crop_factors(), 1).expect("pool"));

        let run = config(temp.path(), false);
        let handle = {
            let renamer = Arc::clone(&renamer);
            thread::spawn(move || {
                let mut recorder = Recorder::default();
                let summary = renamer.rename_photos(&run, &mut recorder).expect("run");
                (summary, recorder)
            })
        };

        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("first read started");
        assert!(!renamer.shutdown(Duration::from_millis(50)));
        release_tx.send(()).expect("release");
        let (summary, recorder) = handle.join().expect("run thread");

        assert_eq!(summary.errors, 3);
        assert_eq!(recorder.results.len(), 3);
        for result in &recorder.results {
            match result {
                RenameResult::Error { reason, .. } => {
                    assert!(reason.starts_with("Cancelled:"), "{reason}")
                }
                other => panic!("expected a cancelled file, got {other:?}"),
            }
        }
        for name in names {
            assert!(temp.path().join(name).exists());
        }
    }

    #[test]
    fn worker_count_is_fixed() {
        assert_eq!(exif_renamer().workers(), 4);
        assert!(default_workers() >= 1);
    }
}
