//! Batch driver: analyze every play in a directory
//!
//! Plays are independent; each is processed on tokio's blocking pool with a
//! semaphore bounding how many run at once. A failing play is recorded in
//! the summary and does not stop the batch. Two inputs that would write the
//! same output file are not both analyzed; the later one is a failure.

use crate::adapter::InputRouter;
use crate::catalog::Catalog;
use crate::engine::PlayEngine;
use crate::error::{PlayError, PlayResult};
use crate::play::Play;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use walkdir::WalkDir;

/// A play written by the batch driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    pub input: PathBuf,
    pub output: PathBuf,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Outcome of a batch run, sorted by input path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: Vec<BatchOutput>,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Read, parse and analyze one play file
///
/// Catalog metadata, when a row matches the file stem, overrides what the
/// adapter extracted.
pub fn analyze_file(
    engine: &PlayEngine,
    router: &InputRouter,
    kind: &str,
    path: &Path,
    catalog: Option<&Catalog>,
) -> PlayResult<Play> {
    let adapter = router.adapter_for(kind)?;
    let content = std::fs::read_to_string(path)?;
    let input = adapter.load(content, &path.display().to_string())?;
    let source = router.parse(&input)?;

    let overrides = catalog.and_then(|c| c.metadata_for(&file_stem(path)));
    engine.analyze_with_metadata(&source, overrides.as_ref())
}

/// A finished play task: its input and the blocking job's outcome
type PlayTask = (PathBuf, Result<PlayResult<BatchOutput>, JoinError>);

/// Drain `tasks` into `summary`; inputs left in `pending` never reported back
async fn collect(
    mut tasks: JoinSet<PlayTask>,
    mut pending: BTreeSet<PathBuf>,
    summary: &mut BatchSummary,
) {
    while let Some(joined) = tasks.join_next().await {
        let (input, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                tracing::error!(error = %e, "batch task aborted");
                continue;
            }
        };
        pending.remove(&input);
        match result {
            Ok(Ok(written)) => {
                tracing::debug!(output = %written.output.display(), "play written");
                summary.written.push(written);
            }
            Ok(Err(e)) => {
                tracing::warn!(input = %input.display(), error = %e, "play failed");
                summary.failures.push(BatchFailure {
                    input,
                    error: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(input = %input.display(), error = %e, "play task panicked");
                summary.failures.push(BatchFailure {
                    input,
                    error: e.to_string(),
                });
            }
        }
    }

    summary.failures.extend(pending.into_iter().map(|input| {
        tracing::error!(input = %input.display(), "play task did not complete");
        BatchFailure {
            input,
            error: "play task did not complete".to_string(),
        }
    }));
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct BatchDriver {
    engine: Arc<PlayEngine>,
    router: Arc<InputRouter>,
    catalog: Option<Arc<Catalog>>,
    semaphore: Arc<Semaphore>,
}

impl BatchDriver {
    pub fn new(engine: PlayEngine) -> Self {
        let router = engine.router();
        let limit = engine.config().batch.max_concurrent_plays.max(1);
        Self {
            engine: Arc::new(engine),
            router: Arc::new(router),
            catalog: None,
            semaphore: Arc::new(Semaphore::new(limit)),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Override the configured concurrency limit
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    pub fn with_router(mut self, router: InputRouter) -> Self {
        self.router = Arc::new(router);
        self
    }

    /// Source files for `kind` directly inside `input_dir`, sorted by name
    pub fn discover(&self, input_dir: &Path, kind: &str) -> PlayResult<Vec<PathBuf>> {
        let extension = self.router.adapter_for(kind)?.file_extension().to_string();
        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            let matches = entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case(extension.as_str()));
            if matches {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Analyze every play of `kind` in `input_dir`, writing `<stem>.json` into `output_dir`
    pub async fn run(&self, input_dir: &Path, output_dir: &Path, kind: &str) -> PlayResult<BatchSummary> {
        if !input_dir.is_dir() {
            return Err(PlayError::InvalidInput(format!(
                "input directory {} does not exist",
                input_dir.display()
            )));
        }
        let files = self.discover(input_dir, kind)?;
        std::fs::create_dir_all(output_dir)?;
        tracing::info!(plays = files.len(), input = %input_dir.display(), "batch started");

        let mut summary = BatchSummary::default();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut pending: BTreeSet<PathBuf> = BTreeSet::new();
        let mut tasks: JoinSet<PlayTask> = JoinSet::new();

        for input in files {
            let output = output_dir.join(format!("{}.json", file_stem(&input)));
            if let Some(first) = claimed.get(&output) {
                tracing::warn!(input = %input.display(), first = %first.display(), "output name already taken, skipping");
                summary.failures.push(BatchFailure {
                    error: format!(
                        "{} is already written from {}",
                        output.display(),
                        first.display()
                    ),
                    input,
                });
                continue;
            }
            claimed.insert(output.clone(), input.clone());
            pending.insert(input.clone());

            let semaphore = self.semaphore.clone();
            let engine = self.engine.clone();
            let router = self.router.clone();
            let catalog = self.catalog.clone();
            let kind = kind.to_string();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let job_input = input.clone();
                let result = tokio::task::spawn_blocking(move || {
                    let _span = tracing::info_span!("play", path = %job_input.display()).entered();
                    let play = analyze_file(&engine, &router, &kind, &job_input, catalog.as_deref())?;
                    std::fs::write(&output, play.to_json_pretty()?)?;
                    Ok::<_, PlayError>(BatchOutput {
                        input: job_input,
                        output,
                        warnings: play.diagnostics.len(),
                    })
                })
                .await;
                (input, result)
            });
        }

        collect(tasks, pending, &mut summary).await;

        summary.written.sort_by(|a, b| a.input.cmp(&b.input));
        summary.failures.sort_by(|a, b| a.input.cmp(&b.input));
        tracing::info!(
            written = summary.written.len(),
            failed = summary.failures.len(),
            "batch finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use tempfile::TempDir;

    const PLAY: &str = "Test Play\nDRAMATIC CHARACTERS\nA\nB\nACT 1\nSCENE 1\nA\nB NON_SPEAKING\nSCENE 2\nA\nB\n";
    const BROKEN: &str = "Broken\nDRAMATIC CHARACTERS\nA\nACT 1\nSCENE 1\nZ\n";

    fn driver() -> BatchDriver {
        BatchDriver::new(PlayEngine::new(EngineConfig::default()))
    }

    #[tokio::test]
    async fn writes_one_json_per_play() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("F_1.txt"), PLAY).unwrap();
        std::fs::write(input.path().join("F_2.txt"), PLAY).unwrap();
        std::fs::write(input.path().join("notes.md"), "ignored").unwrap();

        let summary = driver()
            .run(input.path(), output.path(), "plain_text")
            .await
            .unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.written[0].output, output.path().join("F_1.json"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path().join("F_2.json")).unwrap())
                .unwrap();
        assert_eq!(json["title"], "Test Play");
        assert_eq!(json["metadata"]["num_scenes_text"], 2);
    }

    #[tokio::test]
    async fn failing_play_does_not_stop_the_batch() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("a.txt"), BROKEN).unwrap();
        std::fs::write(input.path().join("b.txt"), PLAY).unwrap();

        let summary = driver()
            .with_concurrency(1)
            .run(input.path(), output.path(), "plain_text")
            .await
            .unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].input.ends_with("a.txt"));
        assert!(summary.failures[0].error.contains("unresolved reference 'Z'"));
        assert!(output.path().join("b.json").exists());
        assert!(!output.path().join("a.json").exists());
    }

    #[tokio::test]
    async fn catalog_metadata_is_applied() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("F_1.txt"), PLAY).unwrap();
        let catalog = Catalog::parse(
            "index\ttitle\tlast_name\tfirst_name\tdate\nF_1\tLe Titre\tMolière\tJean-Baptiste\t1666\n",
        )
        .unwrap();

        driver()
            .with_catalog(catalog)
            .run(input.path(), output.path(), "plain_text")
            .await
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path().join("F_1.json")).unwrap())
                .unwrap();
        assert_eq!(json["title"], "Le Titre");
        assert_eq!(json["author"], "Jean-Baptiste Molière");
        assert_eq!(json["creation_date"], "1666");
    }

    #[tokio::test]
    async fn inputs_sharing_an_output_name_are_not_both_written() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(input.path().join("F_1.TXT"), PLAY).unwrap();
        std::fs::write(input.path().join("F_1.txt"), BROKEN).unwrap();

        let summary = driver()
            .run(input.path(), output.path(), "plain_text")
            .await
            .unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.written.len(), 1);
        assert!(summary.written[0].input.ends_with("F_1.TXT"));
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].input.ends_with("F_1.txt"));
        assert!(summary.failures[0].error.contains("F_1.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path().join("F_1.json")).unwrap())
                .unwrap();
        assert_eq!(json["title"], "Test Play");
    }

    #[tokio::test]
    async fn aborted_task_is_reported_with_its_input() {
        let mut tasks: JoinSet<PlayTask> = JoinSet::new();
        tasks.spawn(std::future::pending::<PlayTask>());
        tasks.abort_all();
        let pending = BTreeSet::from([PathBuf::from("plays/F_3.txt")]);

        let mut summary = BatchSummary::default();
        collect(tasks, pending, &mut summary).await;

        assert!(summary.written.is_empty());
        assert_eq!(
            summary.failures,
            vec![BatchFailure {
                input: PathBuf::from("plays/F_3.txt"),
                error: "play task did not complete".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn missing_input_directory_is_invalid_input() {
        let output = TempDir::new().unwrap();
        let result = driver()
            .run(&output.path().join("nope"), output.path(), "plain_text")
            .await;
        assert!(matches!(result, Err(PlayError::InvalidInput(_))));
    }
}
