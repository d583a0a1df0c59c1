use std::path::{Path, PathBuf};

use rayon::prelude::*;
use web_time::Instant;

use crate::{
    config::ConvertConfig,
    discovery,
    encoder::{self, FrameSettings, Written},
    enums::OutputKind,
    error::{Error, Result},
    volume_loader::VolumeLoader,
};

/// A source file and the artifact written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub source: PathBuf,
    pub output: Written,
}

/// A source file left out under `continue_on_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub source: PathBuf,
    pub reason: String,
}

/// Result of a full run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Number of DICOM files found during discovery.
    pub found: usize,
    pub converted: Vec<Converted>,
    pub skipped: Vec<Skipped>,
}

enum Outcome {
    Converted(Converted),
    Skipped(Skipped),
}

/// Output path for `source` before its rank is known.
///
/// The path relative to `input_root` is re-rooted under `output_root` and `.png`
/// is appended unless the name already ends with it.
///
/// # Errors
///
/// Returns [`Error::OutsideInputRoot`] if `source` is not below `input_root`.
pub fn still_destination(input_root: &Path, output_root: &Path, source: &Path) -> Result<PathBuf> {
    let relative = source
        .strip_prefix(input_root)
        .map_err(|_| Error::OutsideInputRoot {
            path: source.to_path_buf(),
            root: input_root.to_path_buf(),
        })?;

    let destination = output_root.join(relative);
    let suffix = format!(".{}", OutputKind::Still.extension());
    let named_as_still = destination
        .file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(suffix.as_bytes()));
    if named_as_still {
        return Ok(destination);
    }

    let mut name = destination.into_os_string();
    name.push(suffix);
    Ok(PathBuf::from(name))
}

/// Output path for `source` once the kind of artifact is known.
///
/// # Errors
///
/// Returns [`Error::OutsideInputRoot`] if `source` is not below `input_root`.
pub fn destination_for(
    input_root: &Path,
    output_root: &Path,
    source: &Path,
    kind: OutputKind,
) -> Result<PathBuf> {
    still_destination(input_root, output_root, source).map(|path| kind.rewrite_extension(&path))
}

pub struct Converter {
    config: ConvertConfig,
    settings: FrameSettings,
}

impl Converter {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration cannot be honoured.
    pub fn new(config: ConvertConfig) -> Result<Self> {
        let settings = FrameSettings::try_from(&config)?;
        Ok(Self { config, settings })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Discover every DICOM file under the input directory and convert each one.
    ///
    /// # Errors
    ///
    /// Returns the first error that is fatal or, unless `continue_on_error` is set,
    /// the first decode or encode error. Files converted before the error keep
    /// their output.
    pub fn run(&self) -> Result<Summary> {
        let started = Instant::now();
        let input_dir = &self.config.input_dir;

        let sources = discovery::discover(input_dir)?;
        tracing::info!(
            "Found {} DICOM files in '{}'.",
            sources.len(),
            input_dir.display()
        );

        let outcomes = if self.config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()?;
            pool.install(|| {
                sources
                    .par_iter()
                    .map(|source| self.convert_or_skip(source))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            sources
                .iter()
                .map(|source| self.convert_or_skip(source))
                .collect::<Result<Vec<_>>>()?
        };

        let mut summary = Summary {
            found: sources.len(),
            ..Summary::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Converted(converted) => summary.converted.push(converted),
                Outcome::Skipped(skipped) => summary.skipped.push(skipped),
            }
        }

        tracing::info!(
            "Converted {} of {} files ({} skipped) in {:.2?}",
            summary.converted.len(),
            summary.found,
            summary.skipped.len(),
            started.elapsed()
        );
        Ok(summary)
    }

    /// Decode one source file and write its artifact under the output directory.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be decoded or its artifact cannot be written.
    pub fn convert_file(&self, source: &Path) -> Result<Written> {
        let volume = VolumeLoader::load(source)?;
        tracing::debug!(
            "Decoded {}: shape {:?}, {} samples",
            source.display(),
            volume.shape(),
            volume.sample_type()
        );

        let still_path =
            still_destination(&self.config.input_dir, &self.config.output_dir, source)?;
        let written = encoder::write_volume(&volume, &still_path, &self.settings)?;
        tracing::info!("Saved: {}", written.path.display());
        Ok(written)
    }

    fn convert_or_skip(&self, source: &Path) -> Result<Outcome> {
        match self.convert_file(source) {
            Ok(output) => Ok(Outcome::Converted(Converted {
                source: source.to_path_buf(),
                output,
            })),
            Err(err) if self.config.continue_on_error && !err.is_fatal() => {
                tracing::warn!("Skipping {}: {err}", source.display());
                Ok(Outcome::Skipped(Skipped {
                    source: source.to_path_buf(),
                    reason: err.to_string(),
                }))
            }
            Err(err) => Err(err),
        }
    }
}

/// Convert everything described by `config`.
///
/// # Errors
///
/// See [`Converter::run`].
pub fn convert(config: ConvertConfig) -> Result<Summary> {
    Converter::new(config)?.run()
}
