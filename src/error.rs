//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom dell'applicazione.
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O non recuperabili (directory non creabile, copia fallita)
//! - `Symlink`: Ricreazione symlink fallita (recuperabile, best-effort)
//! - `Converter`: Il binario di conversione immagini è fallito o non ha
//!   prodotto output (recuperabile per singolo file)
//! - `CopyFallback`: Hard link E copia completa falliti (fatale)
//! - `Config`: Errori di validazione della configurazione (fatali, pre-run)

use std::path::PathBuf;

/// Custom error types for the minify run
#[derive(thiserror::Error, Debug)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Symlink could not be created: {} -> {}: {}", .link.display(), .link_target.display(), .detail)]
    Symlink {
        link: PathBuf,
        link_target: PathBuf,
        detail: String,
    },

    #[error("Image conversion failed for {}: {}", .path.display(), .detail)]
    Converter { path: PathBuf, detail: String },

    #[error("Copy file failed too: {} to {}: {}", .source_path.display(), .target_path.display(), .detail)]
    CopyFallback {
        source_path: PathBuf,
        target_path: PathBuf,
        detail: String,
    },

    #[error("{0}")]
    Config(String),
}

impl MinifyError {
    /// Recoverable errors are logged as warnings and the run continues;
    /// everything else aborts the whole job.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Symlink { .. } | Self::Converter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let converter = MinifyError::Converter {
            path: PathBuf::from("/a/b.jpg"),
            detail: "exit status 1".to_string(),
        };
        assert!(converter.is_recoverable());

        let symlink = MinifyError::Symlink {
            link: PathBuf::from("/t/f"),
            link_target: PathBuf::from("e.txt"),
            detail: "permission denied".to_string(),
        };
        assert!(symlink.is_recoverable());

        let fallback = MinifyError::CopyFallback {
            source_path: PathBuf::from("/s/e.txt"),
            target_path: PathBuf::from("/t/e.txt"),
            detail: "no space left on device".to_string(),
        };
        assert!(!fallback.is_recoverable());

        let config = MinifyError::Config("missing target".to_string());
        assert!(!config.is_recoverable());
    }

    #[test]
    fn test_messages_name_both_paths() {
        let err = MinifyError::CopyFallback {
            source_path: PathBuf::from("/s/e.txt"),
            target_path: PathBuf::from("/t/e.txt"),
            detail: "boom".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/s/e.txt"));
        assert!(message.contains("/t/e.txt"));
    }
}
