//! In-memory bitmap handle
//!
//! The only thumbnail representation this subsystem owns: decoded RGBA
//! pixels plus dimensions. How the bytes were produced is the decoding
//! collaborator's business.

/// A decoded thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Raw pixel data (RGBA, row-major).
    pub pixels: Vec<u8>,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Bitmap {
    /// Create a bitmap from raw RGBA bytes.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Create a single-color bitmap. Handy for placeholder assets.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Memory footprint in bytes, used for cache accounting.
    pub fn memory_size(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_fills_pixels() {
        let bitmap = Bitmap::solid(2, 2, [1, 2, 3, 4]);
        assert_eq!(bitmap.width, 2);
        assert_eq!(bitmap.height, 2);
        assert_eq!(bitmap.pixels.len(), 16);
        assert_eq!(&bitmap.pixels[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_memory_size() {
        let bitmap = Bitmap::new(vec![0u8; 64 * 64 * 4], 64, 64);
        assert_eq!(bitmap.memory_size(), 64 * 64 * 4);
    }
}
