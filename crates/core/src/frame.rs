//! Frame geometry and CPU-side pixel helpers.
//!
//! Host frames are packed 32-bit pixels, row-major, with no stride padding.
//! Inputs arrive in byte order (B, G, R, A); rendered output is written in
//! byte order (R, G, B, A). The helpers here describe that contract on the
//! CPU so GPU output can be checked against it.

use serde::{Deserialize, Serialize};

use crate::error::MixError;

/// Validated output dimensions of a transition instance.
///
/// Both sides are non-zero and `width * height` fits in `usize`; GL takes
/// sizes as `i32`, so each side must also fit in `i32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    width: u32,
    height: u32,
}

impl FrameSize {
    /// Creates a frame size, rejecting zero or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, MixError> {
        if width == 0 || height == 0 {
            return Err(MixError::InvalidDimensions);
        }
        i32::try_from(width).map_err(|_| MixError::InvalidDimensions)?;
        i32::try_from(height).map_err(|_| MixError::InvalidDimensions)?;
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(MixError::InvalidDimensions)?;
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in one frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes in one packed 32-bit frame.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * 4
    }

    /// Checks that `buffer` holds exactly one frame of pixels.
    pub fn check_buffer<T>(&self, buffer: &[T]) -> Result<(), MixError> {
        if buffer.len() == self.pixel_count() {
            Ok(())
        } else {
            Err(MixError::FrameSize {
                expected: self.pixel_count(),
                got: buffer.len(),
            })
        }
    }
}

/// Packs four bytes in memory order into one host pixel.
pub fn pack(bytes: [u8; 4]) -> u32 {
    u32::from_ne_bytes(bytes)
}

/// Splits one host pixel into its four bytes in memory order.
pub fn unpack(pixel: u32) -> [u8; 4] {
    pixel.to_ne_bytes()
}

/// Reorders one (B, G, R, A) input pixel into (R, G, B, A) output order.
pub fn bgra_to_rgba(pixel: u32) -> u32 {
    let [b, g, r, a] = unpack(pixel);
    pack([r, g, b, a])
}

/// CPU reference for the linear-mix transition.
///
/// Takes two (B, G, R, A) frames and returns the (R, G, B, A) frame the GPU
/// produces for `mix(from, to, progress)`, rounding each channel to the
/// nearest byte. `progress` is clamped here only to keep the byte
/// conversion defined; the GPU path forwards it untouched.
pub fn mix_reference(from: &[u32], to: &[u32], progress: f64) -> Vec<u32> {
    let t = progress.clamp(0.0, 1.0);
    from.iter()
        .zip(to)
        .map(|(&a, &b)| {
            let a = unpack(bgra_to_rgba(a));
            let b = unpack(bgra_to_rgba(b));
            let mut out = [0u8; 4];
            for i in 0..4 {
                let v = f64::from(a[i]) * (1.0 - t) + f64::from(b[i]) * t;
                out[i] = v.round() as u8;
            }
            pack(out)
        })
        .collect()
}

/// Largest per-channel difference between two frames of equal length.
pub fn max_channel_delta(lhs: &[u32], rhs: &[u32]) -> u8 {
    lhs.iter()
        .zip(rhs)
        .flat_map(|(&l, &r)| {
            let (l, r) = (unpack(l), unpack(r));
            (0..4).map(move |i| l[i].abs_diff(r[i]))
        })
        .max()
        .unwrap_or(0)
}
