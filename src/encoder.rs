//! PNG and GIF output for decoded volumes.
//!
//! Every artifact is encoded into a temporary file next to its destination and
//! renamed into place once complete, so a failed encode leaves nothing behind.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{GrayImage, ImageFormat, imageops};
use ndarray::Array2;
use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::{
    config::ConvertConfig,
    enums::{OutputKind, Resampling},
    error::{Error, Result},
    volume::PixelVolume,
};

/// Frame geometry and timing of animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSettings {
    pub width: u16,
    pub height: u16,
    /// Hundredths of a second between frames.
    pub delay_centis: u16,
    /// 0 loops forever.
    pub loop_count: u16,
    pub filter: Resampling,
}

impl FrameSettings {
    fn repeat(&self) -> gif::Repeat {
        match self.loop_count {
            0 => gif::Repeat::Infinite,
            count => gif::Repeat::Finite(count),
        }
    }
}

impl TryFrom<&ConvertConfig> for FrameSettings {
    type Error = Error;

    fn try_from(config: &ConvertConfig) -> Result<Self> {
        config.validate()?;
        let side = |name: &'static str, value: u32| {
            u16::try_from(value).map_err(|_| Error::InvalidConfig {
                name,
                reason: format!("{value} does not fit a GIF frame"),
            })
        };
        Ok(Self {
            width: side("frame_width", config.frame_width)?,
            height: side("frame_height", config.frame_height)?,
            delay_centis: config.frame_delay_centis(),
            loop_count: config.loop_count,
            filter: config.filter,
        })
    }
}

/// An artifact that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub kind: OutputKind,
    pub frames: usize,
}

/// Normalize `volume` and write it next to `still_path`.
///
/// Rank 2 volumes are written to `still_path` as PNG. Rank 3 volumes are written
/// as GIF to `still_path` with its extension replaced by `gif`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedRank`] for other ranks, plus any error of
/// [`write_still`] or [`write_animation`].
pub fn write_volume(
    volume: &PixelVolume,
    still_path: &Path,
    settings: &FrameSettings,
) -> Result<Written> {
    let unsupported = || Error::UnsupportedRank {
        path: still_path.to_path_buf(),
        rank: volume.rank(),
    };
    let kind = volume.output_kind().ok_or_else(unsupported)?;
    let slices = volume.normalized_slices().ok_or_else(unsupported)?;
    let path = kind.rewrite_extension(still_path);

    match kind {
        OutputKind::Still => {
            let slice = slices.first().ok_or_else(|| Error::EmptyVolume { path: path.clone() })?;
            write_still(slice, &path)?;
        }
        OutputKind::Animation => write_animation(&slices, &path, settings)?,
    }

    Ok(Written {
        path,
        kind,
        frames: slices.len(),
    })
}

/// Write one normalized slice as an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns error if the parent directory cannot be created or the image cannot be
/// encoded or written.
pub fn write_still(slice: &Array2<u8>, path: &Path) -> Result<()> {
    let image = slice_to_image(slice);
    write_atomically(path, |writer| {
        image
            .write_to(writer, ImageFormat::Png)
            .map_err(|source| Error::EncodePng {
                path: path.to_path_buf(),
                source,
            })
    })
}

/// Resize normalized slices and write them as a looping grayscale GIF.
///
/// # Errors
///
/// Returns [`Error::EmptyVolume`] if there are no slices, or error if the file
/// cannot be encoded or written.
pub fn write_animation(slices: &[Array2<u8>], path: &Path, settings: &FrameSettings) -> Result<()> {
    if slices.is_empty() {
        return Err(Error::EmptyVolume {
            path: path.to_path_buf(),
        });
    }

    let filter = settings.filter.into();
    let frames: Vec<GrayImage> = slices
        .par_iter()
        .map(|slice| {
            imageops::resize(
                &slice_to_image(slice),
                u32::from(settings.width),
                u32::from(settings.height),
                filter,
            )
        })
        .collect();

    let gif_error = |source: gif::EncodingError| Error::EncodeGif {
        path: path.to_path_buf(),
        source,
    };
    write_atomically(path, |writer| {
        let mut encoder =
            gif::Encoder::new(writer, settings.width, settings.height, &grayscale_palette())
                .map_err(gif_error)?;
        encoder.set_repeat(settings.repeat()).map_err(gif_error)?;

        for image in &frames {
            let frame = gif::Frame {
                width: settings.width,
                height: settings.height,
                delay: settings.delay_centis,
                buffer: Cow::Borrowed(image.as_raw()),
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame).map_err(gif_error)?;
        }

        encoder.into_inner().map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    })
}

/// Global palette mapping index `i` to gray level `i`.
fn grayscale_palette() -> Vec<u8> {
    (0..=u8::MAX).flat_map(|level| [level; 3]).collect()
}

fn slice_to_image(slice: &Array2<u8>) -> GrayImage {
    let (height, width) = slice.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        image::Luma([slice[[y as usize, x as usize]]])
    })
}

/// Create the parent directory of `path`, if any.
///
/// # Errors
///
/// Returns [`Error::CreateDir`] if the directory cannot be created.
pub fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn write_atomically<F>(path: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    create_parent_dir(path)?;
    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = temp_file_in(directory).map_err(write_error)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        encode(&mut writer)?;
        writer.flush().map_err(write_error)?;
    }
    temp.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}

/// Temporary file that ends up with the mode of an ordinary new file.
///
/// `NamedTempFile` defaults to 0600, which `persist` keeps.
fn temp_file_in(directory: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Reduced by the umask on open.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(directory)
}
