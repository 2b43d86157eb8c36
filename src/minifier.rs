//! # Tree Minifier Module
//!
//! Questo è il modulo principale: replica la struttura di un albero di backup
//! sostituendo il contenuto di ogni file con un surrogato economico.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: la configurazione viene verificata prima di toccare
//!    qualsiasi cosa (directory esistenti, binario eseguibile)
//! 2. **Conteggio**: una passata iniziale conta i file regolari del sorgente;
//!    il totale è calcolato una sola volta e mai ricalcolato durante il run
//! 3. **Traversal**: ogni voce non-directory viene processata dall'inizio
//!    alla fine prima della successiva, in modo strettamente sequenziale
//! 4. **Skip-existing**: una voce già presente nel target viene saltata —
//!    è il meccanismo di resume dopo un'interruzione
//! 5. **Symlink**: ricreati con lo stesso link target, mai seguiti,
//!    best-effort (un fallimento è solo un warning)
//! 6. **Directory**: create pigramente quando un file ne ha bisogno,
//!    contate solo quando vengono create davvero
//! 7. **Dispatch**: classificazione per estensione e strategia corrispondente,
//!    con misurazione della durata per il throughput tracker
//! 8. **Riepilogo**: statistiche finali e rate medio di conversione
//!
//! ## Semantica di fallimento:
//! Un errore I/O non recuperabile interrompe immediatamente l'intero run;
//! l'output parziale resta sul disco e il rerun riparte da dove si era
//! arrivati grazie allo skip-existing.

use crate::{
    classifier::{Classifier, FilePolicy},
    config::Config,
    error::MinifyError,
    progress::{Reporter, RunStatistics},
    substitute::{Applied, Substituter},
    throughput::ThroughputTracker,
};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Core driver: walks the source tree and builds the minified target tree.
pub struct Minifier {
    config: Config,
    classifier: Classifier,
    substituter: Substituter,
    stats: RunStatistics,
    throughput: ThroughputTracker,
}

impl Minifier {
    /// Create a minifier; the configuration is validated here, before any
    /// filesystem work.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let classifier = Classifier::new(&config.image_extensions);
        let substituter = Substituter::new(config.clone());

        Ok(Self {
            config,
            classifier,
            substituter,
            stats: RunStatistics::new(),
            throughput: ThroughputTracker::new(),
        })
    }

    /// Number of regular files below `root`. Computed once per run and cached
    /// by the caller; the source tree is assumed stable while we work.
    fn count_source_files(root: &Path) -> u64 {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .count() as u64
    }

    /// Run the minification over the whole source tree.
    pub async fn run(&mut self) -> Result<RunStatistics> {
        info!(
            "🌲 Minifying {} into {}",
            self.config.source.display(),
            self.config.target.display()
        );
        if self.config.skip_existing_files {
            info!("⏩ Resume mode: files already present in the target are skipped");
        }

        let total = Self::count_source_files(&self.config.source);
        info!("Found {} files in source tree", total);

        let reporter = Reporter::new(total, self.config.quiet_mode);
        let source_root = self.config.source.clone();
        let target_root = self.config.target.clone();

        for entry in WalkDir::new(&source_root).follow_links(false) {
            let entry = entry?;
            let file_type = entry.file_type();

            // Directories are structural; they are materialized lazily when a
            // file below them is written.
            if file_type.is_dir() {
                continue;
            }

            let source_path = entry.path();
            let relative = source_path.strip_prefix(&source_root)?;
            let target_path = target_root.join(relative);

            self.stats.total_files += 1;

            // symlink_metadata: presence without following, so a dangling
            // link already placed in the target still counts as done.
            let target_exists = std::fs::symlink_metadata(&target_path).is_ok();
            if target_exists && self.config.skip_existing_files {
                self.stats.skipped += 1;
                reporter.step(&format!(
                    "[{}/{}] Skipping file: {} (already exists)",
                    self.stats.total_files,
                    total,
                    source_path.display()
                ));
                continue;
            }

            if file_type.is_symlink() {
                self.recreate_symlink(source_path, &target_path, &reporter);
                continue;
            }

            self.ensure_parent_dir(&target_path, &reporter).await?;

            let policy = self.classifier.classify(source_path);
            self.apply_policy(policy, source_path, &target_path, total, &reporter)
                .await?;
        }

        let summary = match self.throughput.conversions_per_minute() {
            Some(cpm) => format!(
                "Ready! Total files: {}. Processed {} files per minute.",
                self.stats.total_files,
                cpm.round()
            ),
            None => format!("Ready! Total files: {}.", self.stats.total_files),
        };
        reporter.finish(&summary);

        Ok(self.stats.clone())
    }

    /// Recreate a symlink with the identical link-target string. Never
    /// follows the link; failures are warnings, the traversal continues.
    fn recreate_symlink(&self, source_path: &Path, target_path: &Path, reporter: &Reporter) {
        let link_target = match std::fs::read_link(source_path) {
            Ok(link_target) => link_target,
            Err(e) => {
                warn!("Could not read symlink {}: {}", source_path.display(), e);
                return;
            }
        };

        match make_symlink(&link_target, target_path) {
            Ok(()) => reporter.note(&format!(
                "Symlink created: {} -> {}",
                target_path.display(),
                link_target.display()
            )),
            Err(e) => {
                let err = MinifyError::Symlink {
                    link: target_path.to_path_buf(),
                    link_target,
                    detail: e.to_string(),
                };
                warn!("{err}");
            }
        }
    }

    /// Create the parent directory chain when missing; counts only actual
    /// creations, re-creating an existing directory is a no-op.
    async fn ensure_parent_dir(&mut self, target_path: &Path, reporter: &Reporter) -> Result<()> {
        if let Some(parent) = target_path.parent() {
            if !parent.is_dir() {
                self.stats.directories_created += 1;
                reporter.note(&format!("Creating directory: {}", parent.display()));
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Dispatch one regular file to its strategy, timing the substitution.
    async fn apply_policy(
        &mut self,
        policy: FilePolicy,
        source_path: &Path,
        target_path: &Path,
        total: u64,
        reporter: &Reporter,
    ) -> Result<()> {
        let started = Instant::now();

        match self.substituter.apply(policy, source_path, target_path).await {
            Ok(Applied::Converted) => {
                self.throughput.record(started.elapsed());
                self.stats.converted += 1;
                reporter.step(&self.conversion_line(policy, source_path, total));
            }
            Ok(Applied::Copied) => {
                self.stats.copied += 1;
                reporter.step(&format!(
                    "[{}/{}] Copying file: {}",
                    self.stats.total_files,
                    total,
                    source_path.display()
                ));
            }
            Err(e) if e.is_recoverable() => {
                debug!("continuing after per-file failure");
                warn!("{e}");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Progress line for a converted file, with the smoothed rate and ETA
    /// when available (image and media conversions only, as before).
    fn conversion_line(&self, policy: FilePolicy, source_path: &Path, total: u64) -> String {
        let label = policy.conversion_label().unwrap_or("Generic");
        let base = format!(
            "[{}/{}] Converted {} file: {}",
            self.stats.total_files,
            total,
            label,
            source_path.display()
        );

        if !matches!(policy, FilePolicy::Image | FilePolicy::PlaceholderMedia) {
            return base;
        }

        let files_left = total.saturating_sub(self.stats.total_files);
        match (
            self.throughput.conversions_per_minute(),
            self.throughput.eta(files_left),
        ) {
            (Some(cpm), Some(eta)) => {
                let minutes = eta.as_secs() / 60;
                format!(
                    "{} ({} cpm, ETA: {}:{:02} h)",
                    base,
                    cpm.round(),
                    minutes / 60,
                    minutes % 60
                )
            }
            _ => base,
        }
    }
}

#[cfg(unix)]
fn make_symlink(link_target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link_target, link)
}

#[cfg(windows)]
fn make_symlink(link_target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(link_target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageConverter;
    use crate::substitute::{PLACEHOLDER_MEDIA, PLACEHOLDER_PDF};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn scenario_config(source: &Path, target: &Path, binary: PathBuf) -> Config {
        Config {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            skip_existing_files: true,
            quiet_mode: true,
            converter: ImageConverter::ImageMagick,
            convert_binary: binary,
            image_quality: 1,
            image_colors: 16,
            image_extensions: vec!["jpg".to_string(), "png".to_string()],
            json_summary: false,
        }
    }

    #[cfg(unix)]
    fn stub_converter(dir: &Path, script_body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("stub-convert");
        std::fs::write(&path, format!("#!/bin/sh\n{script_body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// The reference tree: {a.jpg, b/c.pdf, d.mp4, e.txt, f -> e.txt}.
    #[cfg(unix)]
    fn build_scenario_tree(source: &Path) {
        std::fs::write(source.join("a.jpg"), vec![0xffu8; 2048]).unwrap();
        std::fs::create_dir(source.join("b")).unwrap();
        std::fs::write(source.join("b").join("c.pdf"), vec![0x25u8; 8192]).unwrap();
        std::fs::write(source.join("d.mp4"), vec![0x00u8; 16384]).unwrap();
        std::fs::write(source.join("e.txt"), "plain text").unwrap();
        std::os::unix::fs::symlink("e.txt", source.join("f")).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scenario_first_run_populates_target() {
        let workspace = TempDir::new().unwrap();
        let source = workspace.path().join("source");
        let target = workspace.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        build_scenario_tree(&source);
        let binary = stub_converter(workspace.path(), r#"cp "$5" "$6""#);

        let mut minifier =
            Minifier::new(scenario_config(&source, &target, binary)).unwrap();
        let stats = minifier.run().await.unwrap();

        assert_eq!(stats.total_files, 5);
        assert_eq!(stats.converted, 3);
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.directories_created, 1);
        assert_eq!(stats.skipped, 0);

        // Recompressed image exists (stub copies the source bytes)
        assert!(target.join("a.jpg").is_file());
        // PDF and media are byte-for-byte the placeholder assets
        assert_eq!(
            std::fs::read(target.join("b").join("c.pdf")).unwrap(),
            PLACEHOLDER_PDF
        );
        assert_eq!(std::fs::read(target.join("d.mp4")).unwrap(), PLACEHOLDER_MEDIA);
        // Generic file duplicated byte-identically
        assert_eq!(std::fs::read(target.join("e.txt")).unwrap(), b"plain text");
        // Symlink recreated with the identical link-target string
        assert_eq!(
            std::fs::read_link(target.join("f")).unwrap(),
            PathBuf::from("e.txt")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rerun_skips_everything_without_mutation() {
        let workspace = TempDir::new().unwrap();
        let source = workspace.path().join("source");
        let target = workspace.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        build_scenario_tree(&source);
        let binary = stub_converter(workspace.path(), r#"cp "$5" "$6""#);

        let config = scenario_config(&source, &target, binary);
        Minifier::new(config.clone()).unwrap().run().await.unwrap();

        let before = std::fs::metadata(target.join("e.txt")).unwrap().modified().unwrap();

        let stats = Minifier::new(config).unwrap().run().await.unwrap();
        assert_eq!(stats.total_files, 5);
        assert_eq!(stats.skipped, 5);
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.copied, 0);
        assert_eq!(stats.directories_created, 0);

        let after = std::fs::metadata(target.join("e.txt")).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_skip_existing_disabled_redoes_the_work() {
        let workspace = TempDir::new().unwrap();
        let source = workspace.path().join("source");
        let target = workspace.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        std::fs::write(source.join("c.pdf"), "original pdf").unwrap();
        let binary = stub_converter(workspace.path(), r#"cp "$5" "$6""#);

        let mut config = scenario_config(&source, &target, binary);
        config.skip_existing_files = false;

        // Pre-populate the target with different content.
        std::fs::write(target.join("c.pdf"), "stale").unwrap();

        let stats = Minifier::new(config).unwrap().run().await.unwrap();
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.converted, 1);
        assert_eq!(std::fs::read(target.join("c.pdf")).unwrap(), PLACEHOLDER_PDF);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_converter_warns_and_continues() {
        let workspace = TempDir::new().unwrap();
        let source = workspace.path().join("source");
        let target = workspace.path().join("target");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&target).unwrap();
        std::fs::write(source.join("a.jpg"), "jpeg bytes").unwrap();
        std::fs::write(source.join("e.txt"), "plain text").unwrap();
        let binary = stub_converter(workspace.path(), "exit 1");

        let mut minifier =
            Minifier::new(scenario_config(&source, &target, binary)).unwrap();
        let stats = minifier.run().await.unwrap();

        // The image failed but the run finished and the rest was processed.
        assert_eq!(stats.converted, 0);
        assert_eq!(stats.copied, 1);
        assert!(!target.join("a.jpg").exists());
        assert!(target.join("e.txt").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_count_ignores_directories_and_symlinks() {
        let workspace = TempDir::new().unwrap();
        let source = workspace.path().join("source");
        std::fs::create_dir(&source).unwrap();
        build_scenario_tree(&source);

        // a.jpg, b/c.pdf, d.mp4, e.txt are regular; b/ and f are not.
        assert_eq!(Minifier::count_source_files(&source), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let workspace = TempDir::new().unwrap();
        let binary = stub_converter(workspace.path(), "exit 0");
        let config = scenario_config(
            &workspace.path().join("nope"),
            workspace.path(),
            binary,
        );
        assert!(Minifier::new(config).is_err());
    }
}
