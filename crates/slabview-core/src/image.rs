//! Volumetric intensity images.

use crate::error::{Result, ViewError};

/// A single-channel 8-bit intensity volume.
///
/// `size` is `[depth, height, width]`; `data` is laid out with width varying
/// fastest, then height, then depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    size: [u32; 3],
}

impl Image {
    /// Creates an image, checking that `data` matches `size`.
    pub fn new(data: Vec<u8>, size: [u32; 3]) -> Result<Self> {
        if size.contains(&0) {
            return Err(ViewError::EmptyImage(size));
        }
        let expected = size
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s as usize))
            .ok_or(ViewError::ImageTooLarge(size))?;
        if data.len() != expected {
            return Err(ViewError::ImageSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// The 1x1x1 black image used before any data is loaded.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            data: vec![0],
            size: [1, 1, 1],
        }
    }

    /// Builds an 8-bit image from 16-bit raw intensities with a logarithmic
    /// response curve, compressing the bright tail of detector counts.
    ///
    /// Values are offset by a dark level of 100 before scaling.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_u16_log_scaled(raw: &[u16], size: [u32; 3]) -> Result<Self> {
        const DARK_LEVEL: f64 = 100.0;
        const FULL_SCALE: f64 = 65536.0;
        const CURVE: f64 = 7.0;

        let gain = CURVE.exp() - 1.0;
        let data = raw
            .iter()
            .map(|&v| {
                let fraction = (f64::from(v) - DARK_LEVEL) / (FULL_SCALE - DARK_LEVEL);
                let scaled = (1.0 + fraction * gain).ln() / CURVE * 256.0;
                // NaN (below the dark level) saturates to 0
                scaled.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        Self::new(data, size)
    }

    /// Raw intensities.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `[depth, height, width]`.
    #[must_use]
    pub fn size(&self) -> [u32; 3] {
        self.size
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.size[0]
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.size[1]
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.size[2]
    }

    /// Each dimension divided by the largest one, in `[depth, height, width]`
    /// order. The largest dimension maps to 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized_extent(&self) -> [f32; 3] {
        let max = self.size.iter().copied().max().unwrap_or(1) as f32;
        self.size.map(|s| s as f32 / max)
    }

    /// Expands intensities into RGBA8 texels: gray in RGB, opaque alpha.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() * 4);
        for &v in &self.data {
            rgba.extend_from_slice(&[v, v, v, u8::MAX]);
        }
        rgba
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::placeholder()
    }
}
