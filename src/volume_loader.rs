use crate::{
    error::{Error, Result},
    volume::PixelVolume,
};

use dicom::{
    object::{DefaultDicomObject, OpenFileOptions, open_file},
    pixeldata::{
        ConvertOptions, DecodedPixelData, ModalityLutOption, PixelDecoder, PixelRepresentation,
        VoiLutOption,
    },
};
use dicom_dictionary_std::tags;
use ndarray::{Array, Array4, ArrayD, Axis};
use std::path::Path;

pub struct VolumeLoader;

impl VolumeLoader {
    /// Parse the file meta group and data set up to the pixel data element.
    ///
    /// Pixel data is never read, so this stays cheap on large files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file is not a readable DICOM file.
    pub fn probe(path: &Path) -> Result<DefaultDicomObject> {
        OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|source| Error::Open {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Fully parse a file and decode its pixel data.
    ///
    /// Single frame images become rank 2 `(rows, columns)` arrays, multi-frame
    /// images rank 3 `(frames, rows, columns)` arrays. Stored values are returned
    /// as-is, without modality or VOI LUT transforms.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be parsed, its pixel data cannot be decoded,
    /// or it holds colour or otherwise unsupported samples
    pub fn load(path: &Path) -> Result<PixelVolume> {
        let dicom_object = open_file(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_dicom_object(&dicom_object, path)
    }

    pub fn load_from_dicom_object(
        dicom_object: &DefaultDicomObject,
        path: &Path,
    ) -> Result<PixelVolume> {
        let decode_error = |source: dicom::pixeldata::Error| Error::Decode {
            path: path.to_path_buf(),
            source,
        };
        let pixel_data = dicom_object.decode_pixel_data().map_err(decode_error)?;

        let samples_per_pixel = pixel_data.samples_per_pixel();
        if samples_per_pixel != 1 {
            return Err(Error::UnsupportedPixelFormat {
                path: path.to_path_buf(),
                reason: format!(
                    "{samples_per_pixel} samples per pixel, only grayscale is supported"
                ),
            });
        }

        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);

        let volume = match (pixel_data.bits_allocated(), pixel_data.pixel_representation()) {
            (8, PixelRepresentation::Unsigned) => PixelVolume::U8(Self::squeeze_frames(
                pixel_data.to_ndarray_with_options::<u8>(&options).map_err(decode_error)?,
            )),
            (8, PixelRepresentation::Signed) => PixelVolume::I8(Self::squeeze_frames(
                Self::native_samples(&pixel_data, path, i8::from_le_bytes)?,
            )),
            (16, PixelRepresentation::Unsigned) => PixelVolume::U16(Self::squeeze_frames(
                pixel_data.to_ndarray_with_options::<u16>(&options).map_err(decode_error)?,
            )),
            (16, PixelRepresentation::Signed) => PixelVolume::I16(Self::squeeze_frames(
                pixel_data.to_ndarray_with_options::<i16>(&options).map_err(decode_error)?,
            )),
            (32, PixelRepresentation::Unsigned) => PixelVolume::U32(Self::squeeze_frames(
                Self::native_samples(&pixel_data, path, u32::from_le_bytes)?,
            )),
            (32, PixelRepresentation::Signed) => PixelVolume::I32(Self::squeeze_frames(
                Self::native_samples(&pixel_data, path, i32::from_le_bytes)?,
            )),
            (bits, _) => {
                return Err(Error::UnsupportedPixelFormat {
                    path: path.to_path_buf(),
                    reason: format!("{bits} bits allocated"),
                });
            }
        };

        Ok(volume)
    }

    /// Reinterpret decoded little-endian samples as `T`, shaped like
    /// `to_ndarray_with_options` output.
    ///
    /// dicom-rs only converts 8-bit data to `u8` and has no 32-bit integer path.
    fn native_samples<T, const N: usize>(
        pixel_data: &DecodedPixelData<'_>,
        path: &Path,
        from_le_bytes: fn([u8; N]) -> T,
    ) -> Result<Array4<T>> {
        let shape = (
            pixel_data.number_of_frames() as usize,
            pixel_data.rows() as usize,
            pixel_data.columns() as usize,
            1,
        );
        let len = shape.0 * shape.1 * shape.2;
        let bytes = pixel_data.data();
        if bytes.len() < len * N {
            return Err(Error::UnsupportedPixelFormat {
                path: path.to_path_buf(),
                reason: format!("{} bytes of pixel data, expected {}", bytes.len(), len * N),
            });
        }

        let samples = bytes
            .chunks_exact(N)
            .take(len)
            .map(|chunk| {
                let mut raw = [0; N];
                raw.copy_from_slice(chunk);
                from_le_bytes(raw)
            })
            .collect();
        Array::from_shape_vec(shape, samples).map_err(|err| Error::UnsupportedPixelFormat {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Drop the sample axis and, for single frame images, the frame axis.
    fn squeeze_frames<T>(array: Array4<T>) -> ArrayD<T> {
        let frames = array.index_axis_move(Axis(3), 0);
        if frames.len_of(Axis(0)) == 1 {
            frames.index_axis_move(Axis(0), 0).into_dyn()
        } else {
            frames.into_dyn()
        }
    }
}
