//! RGBA image registry with nearest and bilinear resampling.

#[cfg(test)]
#[path = "image_test.rs"]
mod image_test;

use std::collections::HashMap;

use crate::error::EngineError;

/// Resampling filter for [`ImageStore::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    Nearest,
    Bilinear,
}

impl TryFrom<u32> for ResizeMode {
    type Error = EngineError;

    fn try_from(mode: u32) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Bilinear),
            other => Err(EngineError::invalid(format!("unknown resize mode {other}"))),
        }
    }
}

/// A stored RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Exactly `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Image {
    fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width as usize + x) * 4;
        &self.rgba[i..i + 4]
    }
}

#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<i32, Image>,
}

impl ImageStore {
    /// Store (or replace) an image. Bytes past `w * h * 4` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for a zero dimension or a
    /// buffer shorter than `w * h * 4`.
    pub fn store(&mut self, id: i32, rgba: &[u8], width: u32, height: u32) -> Result<(), EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!("image {id} has zero size {width}x{height}")));
        }
        let expected = (width as usize).saturating_mul(height as usize).saturating_mul(4);
        if rgba.len() < expected {
            return Err(EngineError::invalid(format!(
                "image {id} needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        self.images.insert(id, Image { width, height, rgba: rgba[..expected].to_vec() });
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<&Image> {
        self.images.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Resample a stored image. Output dimensions floor at 1.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidArgument`] for an unknown image id.
    pub fn resize(&self, id: i32, out_w: u32, out_h: u32, mode: ResizeMode) -> Result<Vec<u8>, EngineError> {
        let img = self.images.get(&id).ok_or_else(|| EngineError::invalid(format!("unknown image {id}")))?;
        let (ow, oh) = (out_w.max(1), out_h.max(1));
        Ok(match mode {
            ResizeMode::Nearest => resize_nearest(img, ow, oh),
            ResizeMode::Bilinear => resize_bilinear(img, ow, oh),
        })
    }
}

fn resize_nearest(img: &Image, ow: u32, oh: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(ow as usize * oh as usize * 4);
    for y in 0..u64::from(oh) {
        let sy = (y * u64::from(img.height) / u64::from(oh)) as usize;
        for x in 0..u64::from(ow) {
            let sx = (x * u64::from(img.width) / u64::from(ow)) as usize;
            out.extend_from_slice(img.pixel(sx, sy));
        }
    }
    out
}

fn resize_bilinear(img: &Image, ow: u32, oh: u32) -> Vec<u8> {
    let (sw, sh) = (img.width as f32, img.height as f32);
    let (max_x, max_y) = (img.width as usize - 1, img.height as usize - 1);
    let mut out = Vec::with_capacity(ow as usize * oh as usize * 4);
    for y in 0..oh {
        let gy = y as f32 * sh / oh as f32;
        let y0 = (gy.floor() as usize).min(max_y);
        let y1 = (y0 + 1).min(max_y);
        let wy = gy - y0 as f32;
        for x in 0..ow {
            let gx = x as f32 * sw / ow as f32;
            let x0 = (gx.floor() as usize).min(max_x);
            let x1 = (x0 + 1).min(max_x);
            let wx = gx - x0 as f32;

            let (p00, p10) = (img.pixel(x0, y0), img.pixel(x1, y0));
            let (p01, p11) = (img.pixel(x0, y1), img.pixel(x1, y1));
            for ch in 0..4 {
                let top = lerp(f32::from(p00[ch]), f32::from(p10[ch]), wx);
                let bottom = lerp(f32::from(p01[ch]), f32::from(p11[ch]), wx);
                out.push(lerp(top, bottom, wy).round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    out
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
