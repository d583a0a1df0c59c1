use ndarray::{Array2, ArrayD, Ix2, Ix3};

use crate::{
    enums::OutputKind,
    normalize::{Intensity, normalize},
};

/// Pixel data decoded from one DICOM file.
///
/// Rank 2 arrays are `(rows, columns)`, rank 3 arrays are `(frames, rows, columns)`.
/// The variant follows the stored sample type.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelVolume {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
}

macro_rules! with_array {
    ($volume:expr, $array:ident => $body:expr) => {
        match $volume {
            PixelVolume::U8($array) => $body,
            PixelVolume::I8($array) => $body,
            PixelVolume::U16($array) => $body,
            PixelVolume::I16($array) => $body,
            PixelVolume::U32($array) => $body,
            PixelVolume::I32($array) => $body,
        }
    };
}

impl PixelVolume {
    pub fn rank(&self) -> usize {
        with_array!(self, data => data.ndim())
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, data => data.shape())
    }

    /// Name of the stored sample type, for logging.
    pub fn sample_type(&self) -> &'static str {
        match self {
            PixelVolume::U8(_) => "u8",
            PixelVolume::I8(_) => "i8",
            PixelVolume::U16(_) => "u16",
            PixelVolume::I16(_) => "i16",
            PixelVolume::U32(_) => "u32",
            PixelVolume::I32(_) => "i32",
        }
    }

    /// Artifact this volume is exported as, `None` for ranks other than 2 and 3.
    pub fn output_kind(&self) -> Option<OutputKind> {
        OutputKind::from_rank(self.rank())
    }

    /// Normalize every slice along the first axis, or the whole array for rank 2.
    ///
    /// Returns `None` for ranks other than 2 and 3.
    pub fn normalized_slices(&self) -> Option<Vec<Array2<u8>>> {
        with_array!(self, data => normalized_slices_of(data))
    }
}

fn normalized_slices_of<T: Intensity>(data: &ArrayD<T>) -> Option<Vec<Array2<u8>>> {
    match data.ndim() {
        2 => {
            let slice = data.view().into_dimensionality::<Ix2>().ok()?;
            Some(vec![normalize(slice)])
        }
        3 => {
            let stack = data.view().into_dimensionality::<Ix3>().ok()?;
            Some(stack.outer_iter().map(normalize).collect())
        }
        _ => None,
    }
}
