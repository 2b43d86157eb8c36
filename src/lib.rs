//! # Backup Minify Library
//!
//! Prepara repliche ridotte di grandi alberi di backup (aree di storage di
//! contenuti e media) per ambienti di sviluppo e test: stessa struttura,
//! contenuti sostituiti da surrogati economici.
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione immutabile del run e selezione del converter
//! - `error`: Tipi di errore custom con distinzione recuperabile/fatale
//! - `classifier`: Mappa estensioni file su politiche di sostituzione
//! - `substitute`: Le quattro strategie (immagine, PDF, media, generico)
//! - `throughput`: Finestra mobile delle durate, rate e ETA
//! - `progress`: Progress bar, righe di log per file, statistiche del run
//! - `minifier`: Il driver che percorre l'albero e orchestra tutto
//! - `cleanup`: Rimozione dei dump `.data.sql` rigenerabili
//!
//! ## Utilizzo:
//! ```no_run
//! use backup_minify::{Config, Minifier};
//! # async fn demo(config: Config) -> anyhow::Result<()> {
//! let mut minifier = Minifier::new(config)?;
//! let stats = minifier.run().await?;
//! println!("converted {} files", stats.converted);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod minifier;
pub mod progress;
pub mod substitute;
pub mod throughput;

pub use classifier::{Classifier, FilePolicy};
pub use config::{Config, ImageConverter};
pub use error::MinifyError;
pub use minifier::Minifier;
pub use progress::RunStatistics;
pub use throughput::ThroughputTracker;
