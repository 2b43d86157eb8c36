//! # Progress Reporting and Statistics Module
//!
//! Questo modulo gestisce l'output di progresso e i contatori del run.
//!
//! ## Componenti principali:
//! - `Reporter`: progress bar con `indicatif` più una riga di log per ogni
//!   file processato (stampata sopra la barra, così lo scrollback resta
//!   leggibile). In quiet mode non emette nulla di routine.
//! - `RunStatistics`: contatori cumulativi del run, monotoni, posseduti in
//!   esclusiva dal driver.
//!
//! ## Statistiche tracciate:
//! - **total_files**: voci non-directory incontrate (file e symlink)
//! - **skipped**: voci saltate perché il target esiste già
//! - **converted**: file sostituiti da una politica (immagine/pdf/media)
//! - **directories_created**: directory di output effettivamente create
//! - **copied**: file duplicati tali e quali (hard link o copia)
//!
//! Il riepilogo finale viene stampato sempre, anche in quiet mode.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// Counters for one minify run; monotonically non-decreasing.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStatistics {
    pub total_files: u64,
    pub skipped: u64,
    pub converted: u64,
    pub directories_created: u64,
    pub copied: u64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Emits per-file progress lines and drives the progress bar.
pub struct Reporter {
    bar: Option<ProgressBar>,
}

impl Reporter {
    /// Create a reporter for `total_files` entries. In quiet mode no bar is
    /// drawn and routine lines are dropped entirely.
    pub fn new(total_files: u64, quiet_mode: bool) -> Self {
        if quiet_mode {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total_files);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    /// Per-entry progress line; advances the bar by one.
    pub fn step(&self, line: &str) {
        if let Some(bar) = &self.bar {
            bar.println(line);
            bar.inc(1);
        }
    }

    /// Routine notice (directory created, symlink recreated) that does not
    /// advance the bar.
    pub fn note(&self, line: &str) {
        if let Some(bar) = &self.bar {
            bar.println(line);
        }
    }

    /// Final summary; printed even in quiet mode.
    pub fn finish(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.finish_with_message(message.to_string()),
            None => println!("{message}"),
        }
    }
}
