/*
 * Sunface - digital weather watch face
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt;

use anyhow::{Result, anyhow};
use embedded_graphics::{
    prelude::*, pixelcolor::Bgr888, primitives::Rectangle
};
use tinybmp::Bmp;

/// Owned, decoded condition icon. Decoding happens on a background thread,
/// so the bitmap carries its pixels rather than borrowing the asset bytes.
#[derive(Clone, PartialEq)]
pub struct IconBitmap {
    width: u32,
    height: u32,
    pixels: Vec<Bgr888>
}

impl IconBitmap {
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Bgr888>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self { width, height, pixels }
    }

    /// Decode a BMP condition asset as pushed by the paired phone.
    pub fn decode_bmp(data: &[u8]) -> Result<Self> {
        let bmp = Bmp::<Bgr888>::from_slice(data)
            .map_err(|e| anyhow!("Invalid condition asset: {:?}", e))?;

        let size = bmp.size();
        let mut pixels = vec![Bgr888::BLACK; (size.width * size.height) as usize];

        for Pixel(point, colour) in bmp.pixels() {
            let idx = point.y as u32 * size.width + point.x as u32;
            pixels[idx as usize] = colour;
        }

        Ok(Self::from_pixels(size.width, size.height, pixels))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn pixel(&self, x: u32, y: u32) -> Bgr888 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Resize to the given height, preserving aspect ratio. `smooth` selects
    /// bilinear sampling; otherwise nearest neighbour (used when the display
    /// is in a mode with anti-aliasing disabled).
    pub fn scaled(&self, target_height: u32, smooth: bool) -> Self {
        let target_height = target_height.max(1);
        let target_width =
            ((self.width as f32 / self.height as f32) * target_height as f32)
                .round()
                .max(1.0) as u32;

        let mut pixels = Vec::with_capacity((target_width * target_height) as usize);
        for y in 0..target_height {
            for x in 0..target_width {
                let colour = if smooth {
                    self.sample_bilinear(
                        x, y, target_width, target_height
                    )
                } else {
                    self.sample_nearest(
                        x, y, target_width, target_height
                    )
                };
                pixels.push(colour);
            }
        }

        Self::from_pixels(target_width, target_height, pixels)
    }

    fn sample_nearest(&self, x: u32, y: u32, dst_w: u32, dst_h: u32) -> Bgr888 {
        let sx = (x as u64 * self.width as u64 / dst_w as u64) as u32;
        let sy = (y as u64 * self.height as u64 / dst_h as u64) as u32;
        self.pixel(sx.min(self.width - 1), sy.min(self.height - 1))
    }

    fn sample_bilinear(&self, x: u32, y: u32, dst_w: u32, dst_h: u32) -> Bgr888 {
        let fx = ((x as f32 + 0.5) * self.width as f32 / dst_w as f32 - 0.5)
            .max(0.0);
        let fy = ((y as f32 + 0.5) * self.height as f32 / dst_h as f32 - 0.5)
            .max(0.0);

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let wx = fx - x0 as f32;
        let wy = fy - y0 as f32;

        let blend = |a: u8, b: u8, w: f32| a as f32 * (1.0 - w) + b as f32 * w;
        let lerp2 = |get: fn(&Bgr888) -> u8| {
            let top = blend(get(&self.pixel(x0, y0)), get(&self.pixel(x1, y0)), wx);
            let bottom = blend(get(&self.pixel(x0, y1)), get(&self.pixel(x1, y1)), wx);
            (top * (1.0 - wy) + bottom * wy).round() as u8
        };

        Bgr888::new(lerp2(|c| c.r()), lerp2(|c| c.g()), lerp2(|c| c.b()))
    }

    /// Desaturated copy for ambient composition.
    pub fn greyscale(&self) -> Self {
        let pixels = self.pixels.iter()
            .map(|c| {
                let luma = (c.r() as u32 * 299
                    + c.g() as u32 * 587
                    + c.b() as u32 * 114) / 1000;
                let luma = luma as u8;
                Bgr888::new(luma, luma, luma)
            })
            .collect();

        Self::from_pixels(self.width, self.height, pixels)
    }

    pub fn draw<D>(&self, target: &mut D, top_left: Point) -> Result<(), D::Error>
        where D: DrawTarget<Color = Bgr888>
    {
        let area = Rectangle::new(top_left, self.size());
        target.fill_contiguous(&area, self.pixels.iter().copied())
    }
}

impl fmt::Debug for IconBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IconBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> IconBitmap {
        // 2x2: white black / black white
        IconBitmap::from_pixels(2, 2, vec![
            Bgr888::WHITE, Bgr888::BLACK,
            Bgr888::BLACK, Bgr888::WHITE
        ])
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(IconBitmap::decode_bmp(&[0x00, 0x01, 0x02]).is_err());
    }

    #[test]
    fn scale_preserves_aspect_ratio() {
        let icon = IconBitmap::from_pixels(4, 2, vec![Bgr888::RED; 8]);
        let scaled = icon.scaled(10, false);
        assert_eq!(scaled.height(), 10);
        assert_eq!(scaled.width(), 20);
    }

    #[test]
    fn nearest_scale_keeps_corner_colours() {
        let scaled = checkerboard().scaled(4, false);
        assert_eq!(scaled.pixel(0, 0), Bgr888::WHITE);
        assert_eq!(scaled.pixel(3, 0), Bgr888::BLACK);
        assert_eq!(scaled.pixel(0, 3), Bgr888::BLACK);
        assert_eq!(scaled.pixel(3, 3), Bgr888::WHITE);
    }

    #[test]
    fn bilinear_scale_blends_midpoints() {
        let scaled = checkerboard().scaled(4, true);
        // dead centre of the board lands between all four source pixels
        let mid = scaled.pixel(2, 2);
        assert!(mid.r() > 0 && mid.r() < 255);
        assert_eq!(mid.r(), mid.g());
        assert_eq!(mid.g(), mid.b());
    }

    #[test]
    fn greyscale_uses_luma_weights() {
        let icon = IconBitmap::from_pixels(1, 1, vec![Bgr888::new(255, 0, 0)]);
        let grey = icon.greyscale();
        // 255 * 0.299 = 76
        assert_eq!(grey.pixel(0, 0), Bgr888::new(76, 76, 76));
    }

    #[test]
    fn greyscale_leaves_dimensions() {
        let grey = checkerboard().greyscale();
        assert_eq!(grey.size(), Size::new(2, 2));
        assert_eq!(grey.pixel(0, 0), Bgr888::WHITE);
        assert_eq!(grey.pixel(1, 0), Bgr888::BLACK);
    }
}
