//! # Substitution Strategies Module
//!
//! Questo modulo implementa le quattro politiche di sostituzione del
//! contenuto, una per variante di `FilePolicy`, dietro un unico dispatch
//! esaustivo.
//!
//! ## Strategie:
//! - **Image**: invoca il binario esterno (ImageMagick o GraphicsMagick) con
//!   un downgrade lossy fisso (`-quality` e `-colors` dalla configurazione).
//!   Gli argomenti passano come vettore, mai attraverso una shell: le path non
//!   hanno bisogno di escaping. Exit status ed esistenza dell'output vengono
//!   verificati; un fallimento è un errore recuperabile per singolo file.
//! - **Pdf**: ignora completamente il contenuto sorgente e scrive l'asset
//!   segnaposto `dummy.pdf`, incluso nel binario in fase di build.
//! - **PlaceholderMedia**: come Pdf, con l'asset vuoto `emptyfile.txt`.
//! - **Generic**: hard link (condivide lo storage, non raddoppia il disco);
//!   se fallisce, ad esempio attraversando filesystem diversi, copia
//!   completa. Se fallisce anche la copia il run si interrompe.
//!
//! Ogni strategia condivide la stessa firma: sorgente e target, esito.

use crate::classifier::FilePolicy;
use crate::config::Config;
use crate::error::MinifyError;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Minimal one-page PDF substituted verbatim for every source PDF.
pub const PLACEHOLDER_PDF: &[u8] = include_bytes!("../resources/dummy.pdf");

/// Empty placeholder substituted verbatim for every designated media file.
pub const PLACEHOLDER_MEDIA: &[u8] = include_bytes!("../resources/emptyfile.txt");

/// How a file ended up in the target tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Content replaced by a policy substitute (image, PDF or media)
    Converted,
    /// Duplicated as-is via hard link or byte copy
    Copied,
}

/// Applies the substitution strategy selected by the classifier.
pub struct Substituter {
    config: Config,
}

impl Substituter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Apply the strategy for `policy`. Exhaustive over all policy variants;
    /// the dispatch order never matters here because classification already
    /// picked exactly one policy.
    pub async fn apply(
        &self,
        policy: FilePolicy,
        source: &Path,
        target: &Path,
    ) -> Result<Applied, MinifyError> {
        match policy {
            FilePolicy::Image => {
                self.convert_image(source, target).await?;
                Ok(Applied::Converted)
            }
            FilePolicy::Pdf => {
                self.write_placeholder(target, PLACEHOLDER_PDF).await?;
                Ok(Applied::Converted)
            }
            FilePolicy::PlaceholderMedia => {
                self.write_placeholder(target, PLACEHOLDER_MEDIA).await?;
                Ok(Applied::Converted)
            }
            FilePolicy::Generic => {
                self.link_or_copy(source, target).await?;
                Ok(Applied::Copied)
            }
        }
    }

    /// Recompress an image through the external converter binary.
    ///
    /// The invocation is `<binary> [convert] -quality <q> -colors <n>
    /// <source> <target>`; only GraphicsMagick needs the `convert`
    /// subcommand prefix.
    async fn convert_image(&self, source: &Path, target: &Path) -> Result<(), MinifyError> {
        let mut command = Command::new(&self.config.convert_binary);
        command
            .args(self.config.converter.argument_prefix())
            .arg("-quality")
            .arg(self.config.image_quality.to_string())
            .arg("-colors")
            .arg(self.config.image_colors.to_string())
            .arg(source)
            .arg(target);

        debug!("running image converter: {:?}", command);

        let output = command.output().await.map_err(|e| MinifyError::Converter {
            path: source.to_path_buf(),
            detail: format!(
                "failed to execute {}: {}",
                self.config.convert_binary.display(),
                e
            ),
        })?;

        if !output.status.success() {
            return Err(MinifyError::Converter {
                path: source.to_path_buf(),
                detail: format!(
                    "converter exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        // A converter that exits 0 without writing anything would otherwise
        // leave a silent hole in the target tree.
        if !target.is_file() {
            return Err(MinifyError::Converter {
                path: source.to_path_buf(),
                detail: format!(
                    "converter reported success but produced no output at {}",
                    target.display()
                ),
            });
        }

        Ok(())
    }

    /// Write a canned placeholder asset, ignoring the source entirely.
    async fn write_placeholder(&self, target: &Path, asset: &[u8]) -> Result<(), MinifyError> {
        tokio::fs::write(target, asset).await.map_err(MinifyError::Io)
    }

    /// Duplicate a file without shrinking it: hard link first, full copy as
    /// the cross-device fallback.
    async fn link_or_copy(&self, source: &Path, target: &Path) -> Result<(), MinifyError> {
        match std::fs::hard_link(source, target) {
            Ok(()) => Ok(()),
            Err(link_err) => {
                debug!(
                    "linking file failed ({link_err}), copying instead: {} to {}",
                    source.display(),
                    target.display()
                );
                tokio::fs::copy(source, target)
                    .await
                    .map(|_| ())
                    .map_err(|copy_err| MinifyError::CopyFallback {
                        source_path: source.to_path_buf(),
                        target_path: target.to_path_buf(),
                        detail: copy_err.to_string(),
                    })
            }
        }
    }
}
