//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione del run di minificazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri del run
//! - Selezione del converter immagini (ImageMagick vs GraphicsMagick)
//! - Validazione robusta prima che il run inizi (directory esistenti,
//!   binario eseguibile, parametri in range)
//!
//! ## Parametri di configurazione:
//! - `source` / `target`: radici dell'albero di input e output (entrambe
//!   devono già esistere, il target non viene mai creato)
//! - `skip_existing_files`: file già presenti nel target restano intatti
//!   (default: true, è il meccanismo di resume)
//! - `quiet_mode`: sopprime l'output di progresso di routine (default: false)
//! - `converter` + `convert_binary`: dialetto e path del binario esterno
//! - `image_quality` / `image_colors`: downgrade lossy applicato alle immagini
//! - `image_extensions`: estensioni trattate come immagini (default: jpg, png)
//!
//! ## Immutabilità:
//! La configurazione viene costruita una sola volta, validata, e non è più
//! modificabile per tutta la durata del run.

use crate::error::MinifyError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default ImageMagick convert binary location.
pub const IMAGE_MAGICK_CONVERT_BINARY: &str = "/usr/bin/convert";
/// Default GraphicsMagick binary location.
pub const GRAPHICS_MAGICK_CONVERT_BINARY: &str = "/usr/bin/gm";
/// GraphicsMagick is invoked as `gm convert`; this is the subcommand.
pub const GRAPHICS_MAGICK_CONVERT_PARAM: &str = "convert";

/// Which external image converter dialect to speak.
///
/// The contract is identical for both: only the binary path and the argument
/// prefix differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageConverter {
    ImageMagick,
    GraphicsMagick,
}

impl FromStr for ImageConverter {
    type Err = MinifyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "imagemagick" | "im" => Ok(Self::ImageMagick),
            "graphicsmagick" | "gm" => Ok(Self::GraphicsMagick),
            other => Err(MinifyError::Config(format!(
                "Please provide a valid image converter using \
                 --imageconverter=<imageconverter>; got '{other}', valid choices \
                 are: imagemagick, im, graphicsmagick, gm"
            ))),
        }
    }
}

impl ImageConverter {
    /// Default binary path for this dialect.
    pub fn default_binary(&self) -> PathBuf {
        match self {
            Self::ImageMagick => PathBuf::from(IMAGE_MAGICK_CONVERT_BINARY),
            Self::GraphicsMagick => PathBuf::from(GRAPHICS_MAGICK_CONVERT_BINARY),
        }
    }

    /// Arguments inserted between the binary and the conversion options.
    pub fn argument_prefix(&self) -> &'static [&'static str] {
        match self {
            Self::ImageMagick => &[],
            Self::GraphicsMagick => &[GRAPHICS_MAGICK_CONVERT_PARAM],
        }
    }
}

/// Configuration for one minify run, immutable once constructed
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the tree to minify
    pub source: PathBuf,
    /// Root of the output tree; must pre-exist
    pub target: PathBuf,
    /// Leave files already present in the target untouched (resume support)
    pub skip_existing_files: bool,
    /// Suppress routine progress output (warnings and errors always shown)
    pub quiet_mode: bool,
    /// Image converter dialect
    pub converter: ImageConverter,
    /// Resolved converter binary path
    pub convert_binary: PathBuf,
    /// Quality passed to the converter (1-100, historical default 1)
    pub image_quality: u8,
    /// Palette size passed to the converter (historical default 16)
    pub image_colors: u32,
    /// Lower-case extensions handled by the image converter
    pub image_extensions: Vec<String>,
    /// Print final statistics as one JSON object on stdout
    pub json_summary: bool,
}

impl Config {
    /// Validate the configuration before any work starts.
    ///
    /// Every failure here is fatal and reported once, with no partial work.
    pub fn validate(&self) -> Result<(), MinifyError> {
        if !self.source.is_dir() {
            return Err(MinifyError::Config(format!(
                "Could not find source dir '{}'",
                self.source.display()
            )));
        }

        if !self.target.is_dir() {
            return Err(MinifyError::Config(format!(
                "Could not find target dir '{}'",
                self.target.display()
            )));
        }

        if self.image_quality == 0 || self.image_quality > 100 {
            return Err(MinifyError::Config(
                "Image quality must be between 1 and 100".to_string(),
            ));
        }

        if self.image_colors == 0 {
            return Err(MinifyError::Config(
                "Image palette size must be greater than 0".to_string(),
            ));
        }

        if self.image_extensions.is_empty() {
            return Err(MinifyError::Config(
                "At least one image extension must be configured".to_string(),
            ));
        }

        if !is_executable(&self.convert_binary) {
            return Err(MinifyError::Config(format!(
                "The image convert executable {} does not exist or cannot be executed",
                self.convert_binary.display()
            )));
        }

        Ok(())
    }
}

/// Check that a path points at an executable regular file.
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
