//! # DICOM-export library
//!
//! This crate converts a directory tree of DICOM files into a mirrored tree of
//! images that any viewer can open.
//!
//! This library is built on the dicom-rs ecosystem. Every file below the input
//! directory is checked with a header-only parse; files that are not DICOM are
//! left out. The pixel data of each remaining file is decoded and every slice is
//! rescaled from its own minimum and maximum to the 8-bit range:
//!  - Single frame images are written as 8-bit grayscale PNG
//!  - Multi-frame images are written as looping grayscale GIF, one frame per
//!    slice, each frame resized to a fixed resolution
//!
//!  The output path is the source path relative to the input directory,
//!  re-rooted under the output directory, with `.png` appended (or `.gif` for
//!  multi-frame images). Files are converted one after another unless more
//!  jobs are requested, in which case they are spread over a rayon pool.
//!  DICOM files are assumed to have the following attributes:
//!   - Grayscale samples (Samples per Pixel of 1)
//!   - 8, 16 or 32 bits allocated
//!   - A transfer syntax dicom-rs can decode natively
//!
//! # Examples
//!
//! ## Converting a directory
//!
//! Convert everything below `data/` into `output/`, using 256×256 animation
//! frames.
//!
//! ```no_run
//! # use dicom_export::{ConvertConfig, convert};
//! let config = ConvertConfig {
//!     frame_width: 256,
//!     frame_height: 256,
//!     ..ConvertConfig::default()
//! };
//! let summary = convert(config).expect("should have converted the directory");
//! println!("{} of {} files written", summary.converted.len(), summary.found);
//! ```

pub mod config;
pub mod converter;
pub mod discovery;
pub mod encoder;
pub mod enums;
pub mod error;
pub mod normalize;
pub mod volume;
pub mod volume_loader;

#[cfg(test)]
mod fixtures;

pub use config::ConvertConfig;
pub use converter::{Converter, Summary, convert};
pub use error::{Error, Result};
pub use volume::PixelVolume;
pub use volume_loader::VolumeLoader;
