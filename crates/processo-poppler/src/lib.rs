//! Engines backed by command-line tools: `pdftotext` and `pdftoppm` from
//! poppler-utils, and `tesseract`.
//!
//! Each engine takes the executable path at construction so deployments can
//! point at non-standard installs.

mod command;
pub mod pdftoppm;
pub mod pdftotext;
pub mod tesseract;

pub use pdftoppm::{DEFAULT_DPI, PdftoppmRasterizer};
pub use pdftotext::PdftotextBackend;
pub use tesseract::TesseractEngine;
