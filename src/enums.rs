use std::path::{Path, PathBuf};

use image::imageops::FilterType;

/// Artifact written for one source file, decided by the rank of its pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Single slice, written as PNG.
    Still,
    /// Stack of slices, written as GIF with one frame per slice.
    Animation,
}

impl OutputKind {
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            2 => Some(OutputKind::Still),
            3 => Some(OutputKind::Animation),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Still => "png",
            OutputKind::Animation => "gif",
        }
    }

    /// Swap the trailing still-image extension of `still_path` for this kind's.
    pub fn rewrite_extension(self, still_path: &Path) -> PathBuf {
        match self {
            OutputKind::Still => still_path.to_path_buf(),
            // `.png` alone is a name without extension to `Path`.
            OutputKind::Animation => match still_path.file_name() {
                Some(name) if name.as_encoded_bytes() == b".png" => {
                    still_path.with_file_name(".gif")
                }
                _ => still_path.with_extension(self.extension()),
            },
        }
    }
}

/// Resampling filter used when animation frames are resized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Resampling {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<Resampling> for FilterType {
    fn from(resampling: Resampling) -> Self {
        match resampling {
            Resampling::Nearest => FilterType::Nearest,
            Resampling::Triangle => FilterType::Triangle,
            Resampling::CatmullRom => FilterType::CatmullRom,
            Resampling::Gaussian => FilterType::Gaussian,
            Resampling::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
