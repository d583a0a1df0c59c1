//! Per-slice intensity rescaling to the 8-bit range.
//!
//! Values are mapped with `floor((v - min) / (max - min) * 255)`, so the slice
//! minimum lands on 0 and the maximum on 255. Constant slices become all zeros.
//! Slices that already hold `u8` samples are copied unchanged.

use ndarray::{Array2, ArrayView2, Zip};

/// Sample types a slice can be normalized from.
pub trait Intensity: Copy + PartialOrd + Send + Sync {
    fn to_f64(self) -> f64;

    /// Slices of this type that are already 8-bit and must not be rescaled.
    fn passthrough(_slice: &ArrayView2<'_, Self>) -> Option<Array2<u8>> {
        None
    }
}

impl Intensity for u8 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn passthrough(slice: &ArrayView2<'_, Self>) -> Option<Array2<u8>> {
        Some(slice.to_owned())
    }
}

macro_rules! impl_intensity {
    ($($ty:ty),*) => {
        $(
            impl Intensity for $ty {
                #[inline]
                fn to_f64(self) -> f64 {
                    f64::from(self)
                }
            }
        )*
    };
}

impl_intensity!(i8, u16, i16, u32, i32, f32, f64);

/// Rescale one slice into `[0, 255]`.
pub fn normalize<T: Intensity>(slice: ArrayView2<'_, T>) -> Array2<u8> {
    if let Some(identity) = T::passthrough(&slice) {
        return identity;
    }

    let Some((min, max)) = min_max(&slice) else {
        return Array2::zeros(slice.raw_dim());
    };
    if max <= min {
        return Array2::zeros(slice.raw_dim());
    }

    let range = max - min;
    Zip::from(&slice).par_map_collect(|&value| scale_to_u8(value.to_f64(), min, range))
}

#[inline]
fn scale_to_u8(value: f64, min: f64, range: f64) -> u8 {
    // `as` truncates toward zero and saturates, which is the documented floor policy
    // for the non-negative scaled values.
    ((value - min) / range * 255.0) as u8
}

fn min_max<T: Intensity>(slice: &ArrayView2<'_, T>) -> Option<(f64, f64)> {
    slice.iter().fold(None, |acc, &value| {
        let value = value.to_f64();
        Some(match acc {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        })
    })
}
