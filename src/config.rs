use std::path::PathBuf;

use crate::{
    enums::Resampling,
    error::{Error, Result},
};

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_FRAME_WIDTH: u32 = 480;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;
pub const DEFAULT_FRAME_DELAY_MS: u32 = 200;
/// 0 loops forever.
pub const DEFAULT_LOOP_COUNT: u16 = 0;

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root directory scanned for DICOM files.
    pub input_dir: PathBuf,

    /// Root directory the converted tree is written to.
    pub output_dir: PathBuf,

    /// Width every animation frame is resized to.
    pub frame_width: u32,

    /// Height every animation frame is resized to.
    pub frame_height: u32,

    /// Delay between animation frames. GIF stores centiseconds, so the value is
    /// truncated to a multiple of 10 ms and must be at least 10 ms.
    pub frame_delay_ms: u32,

    /// Number of animation repetitions, 0 for an infinite loop.
    pub loop_count: u16,

    /// Filter used when resizing animation frames.
    pub filter: Resampling,

    /// Log and skip files that fail to decode or encode instead of aborting.
    pub continue_on_error: bool,

    /// Number of files converted concurrently. 1 keeps the run sequential.
    pub jobs: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            loop_count: DEFAULT_LOOP_COUNT,
            filter: Resampling::default(),
            continue_on_error: false,
            jobs: 1,
        }
    }
}

impl ConvertConfig {
    /// Check that every value can be honoured by the encoders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let max_side = u32::from(u16::MAX);
        for (name, value) in [
            ("frame_width", self.frame_width),
            ("frame_height", self.frame_height),
        ] {
            if value == 0 || value > max_side {
                return Err(Error::InvalidConfig {
                    name,
                    reason: format!("{value} is outside 1..={max_side}"),
                });
            }
        }

        // A zero delay is played back at an arbitrary viewer-chosen speed.
        if self.frame_delay_ms < 10 {
            return Err(Error::InvalidConfig {
                name: "frame_delay_ms",
                reason: format!("{} ms is below one GIF time unit (10 ms)", self.frame_delay_ms),
            });
        }
        if u16::try_from(self.frame_delay_ms / 10).is_err() {
            return Err(Error::InvalidConfig {
                name: "frame_delay_ms",
                reason: format!("{} ms does not fit a GIF frame delay", self.frame_delay_ms),
            });
        }

        if self.jobs == 0 {
            return Err(Error::InvalidConfig {
                name: "jobs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Frame delay in GIF units (hundredths of a second).
    pub fn frame_delay_centis(&self) -> u16 {
        u16::try_from(self.frame_delay_ms / 10).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_480_square_frames_at_200_ms() {
        let config = ConvertConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!((config.frame_width, config.frame_height), (480, 480));
        assert_eq!(config.frame_delay_ms, 200);
        assert_eq!(config.frame_delay_centis(), 20);
        assert_eq!(config.loop_count, 0);
        assert_eq!(config.filter, Resampling::Lanczos3);
        assert!(!config.continue_on_error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_sized_frames() {
        let config = ConvertConfig {
            frame_height: 0,
            ..ConvertConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig {
                name: "frame_height",
                ..
            })
        ));
    }

    #[test]
    fn rejects_frames_wider_than_gif_allows() {
        let config = ConvertConfig {
            frame_width: 70_000,
            ..ConvertConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_oversized_delay_and_zero_jobs() {
        let slow = ConvertConfig {
            frame_delay_ms: 10 * (u32::from(u16::MAX) + 1),
            ..ConvertConfig::default()
        };
        assert!(slow.validate().is_err());

        let idle = ConvertConfig {
            jobs: 0,
            ..ConvertConfig::default()
        };
        assert!(idle.validate().is_err());
    }

    #[test]
    fn rejects_delays_below_one_centisecond() {
        for frame_delay_ms in [0, 9] {
            let config = ConvertConfig {
                frame_delay_ms,
                ..ConvertConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfig {
                    name: "frame_delay_ms",
                    ..
                })
            ));
        }

        let shortest = ConvertConfig {
            frame_delay_ms: 10,
            ..ConvertConfig::default()
        };
        assert_eq!(shortest.frame_delay_centis(), 1);
        assert!(shortest.validate().is_ok());
    }

    #[test]
    fn delay_is_truncated_to_centiseconds() {
        let config = ConvertConfig {
            frame_delay_ms: 125,
            ..ConvertConfig::default()
        };
        assert_eq!(config.frame_delay_centis(), 12);
    }
}
