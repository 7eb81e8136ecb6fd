//! Logical viewport size and capped device pixel ratio.

/// Window size in logical pixels plus the pixel ratio used for the drawing buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// `min(device_pixel_ratio, max_pixel_ratio)`.
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width,
            height,
            pixel_ratio: device_pixel_ratio.min(max_pixel_ratio),
        }
    }

    /// Surface size in physical pixels.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            (f64::from(self.width) * self.pixel_ratio).round() as u32,
            (f64::from(self.height) * self.pixel_ratio).round() as u32,
        )
    }

    /// Width over height, or `None` while the window has no area.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_capped_at_two() {
        let viewport = Viewport::new(1024, 768, 3.0, 2.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (2048, 1536));
    }

    #[test]
    fn test_low_density_passes_through() {
        let viewport = Viewport::new(1024, 768, 1.0, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (1024, 768));
        assert_eq!(viewport.aspect_ratio(), Some(1024.0 / 768.0));
    }

    #[test]
    fn test_fractional_ratio_rounds() {
        let viewport = Viewport::new(1001, 333, 1.5, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (1502, 500));
    }

    #[test]
    fn test_invalid_ratio_defaults_to_one() {
        assert_eq!(Viewport::new(10, 10, 0.0, 2.0).pixel_ratio, 1.0);
        assert_eq!(Viewport::new(10, 10, f64::NAN, 2.0).pixel_ratio, 1.0);
    }

    #[test]
    fn test_zero_area_has_no_aspect() {
        assert_eq!(Viewport::new(800, 0, 1.0, 2.0).aspect_ratio(), None);
    }
}
