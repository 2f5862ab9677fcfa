use crate::{assets::PreparedImage, core::Viewport};

/// Placement of a source image scaled to fully cover a target area while
/// preserving aspect ratio. Overflow on the non-dominant axis is cropped by
/// centering; the image is never letterboxed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_w: f64,
    pub draw_h: f64,
}

/// Choose the dominant scaling axis by comparing aspect ratios.
pub fn cover_fit(target: Viewport, img_w: u32, img_h: u32) -> CoverFit {
    let target_w = f64::from(target.width);
    let target_h = f64::from(target.height);
    let img_aspect = if img_h == 0 {
        1.0
    } else {
        f64::from(img_w) / f64::from(img_h)
    };
    let target_aspect = if target_h == 0.0 { 1.0 } else { target_w / target_h };

    if target_aspect > img_aspect {
        let draw_w = target_w;
        let draw_h = if img_aspect == 0.0 { target_h } else { target_w / img_aspect };
        CoverFit {
            offset_x: 0.0,
            offset_y: (target_h - draw_h) / 2.0,
            draw_w,
            draw_h,
        }
    } else {
        let draw_w = target_h * img_aspect;
        let draw_h = target_h;
        CoverFit {
            offset_x: (target_w - draw_w) / 2.0,
            offset_y: 0.0,
            draw_w,
            draw_h,
        }
    }
}

/// Exclusively-owned drawable 2D surface in premultiplied RGBA8.
///
/// Full clear-and-redraw policy: no state persists across redraws beyond the
/// pixel bytes themselves.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            pixels: vec![0; viewport.pixel_count() * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Resize the backing buffer to exactly the new dimensions. The surface
    /// comes back blank; callers re-render the current frame.
    pub fn resize(&mut self, viewport: Viewport) {
        self.width = viewport.width;
        self.height = viewport.height;
        self.pixels.clear();
        self.pixels.resize(viewport.pixel_count() * 4, 0);
    }

    /// Clear, then draw `img` cover-fit over the whole surface with
    /// nearest-neighbor sampling. Deterministic: drawing the same image twice
    /// produces bit-identical pixels.
    pub fn draw_cover(&mut self, img: &PreparedImage) {
        self.clear();
        if self.width == 0 || self.height == 0 || img.width == 0 || img.height == 0 {
            return;
        }

        let fit = cover_fit(self.viewport(), img.width, img.height);
        if fit.draw_w <= 0.0 || fit.draw_h <= 0.0 {
            return;
        }

        let src = img.rgba8_premul.as_slice();
        let src_w = img.width as usize;
        let max_x = img.width as f64 - 1.0;
        let max_y = img.height as f64 - 1.0;

        for y in 0..self.height as usize {
            let sy = ((y as f64 + 0.5 - fit.offset_y) / fit.draw_h * f64::from(img.height) - 0.5)
                .round()
                .clamp(0.0, max_y) as usize;
            let src_row = sy * src_w;
            let dst_row = y * self.width as usize;
            for x in 0..self.width as usize {
                let sx = ((x as f64 + 0.5 - fit.offset_x) / fit.draw_w * f64::from(img.width)
                    - 0.5)
                    .round()
                    .clamp(0.0, max_x) as usize;
                let s = (src_row + sx) * 4;
                let d = (dst_row + x) * 4;
                self.pixels[d..d + 4].copy_from_slice(&src[s..s + 4]);
            }
        }
    }
}
