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

use anyhow::{Result, anyhow};
use embedded_graphics::{pixelcolor::Bgr888, prelude::*};
use embedded_graphics_framebuf::FrameBuf;
use linuxfb::Framebuffer;

use crate::drawable::{AppDrawable, AppFrameBuf, DISPLAY_SIZE};

/// Direct framebuffer output for watch hardware.
pub struct FramebufferWindow {
    fb_dev: Framebuffer,
    buffer: AppFrameBuf
}

impl FramebufferWindow {
    pub fn new() -> Result<Self> {
        let mut fb_dev = Framebuffer::new("/dev/fb0")
            .or(Err(anyhow!("Error opening fb0")))?;

        // the offset is sometimes nonzero after opening, leaving the panel
        // blank until it is reset
        fb_dev.set_offset(0, 0)
            .or(Err(anyhow!("Error changing offset of fb0")))?;

        let data = [Bgr888::BLACK; DISPLAY_SIZE * DISPLAY_SIZE];
        let buffer = FrameBuf::new(data, DISPLAY_SIZE, DISPLAY_SIZE);

        Ok(Self { fb_dev, buffer })
    }

    fn flush(&self) -> Result<()> {
        let mut fb_mem = self.fb_dev.map()
            .or(Err(anyhow!("Error mapping fb0 mem")))?;

        for (i, p) in self.buffer.data.iter().enumerate() {
            let offset = i * 4;
            fb_mem[offset] = p.b();
            fb_mem[offset + 1] = p.g();
            fb_mem[offset + 2] = p.r();
            // fourth byte is unused by the panel
        }

        Ok(())
    }

    pub fn draw_screen(&mut self, screen: &dyn AppDrawable) -> Result<()> {
        screen.draw(&mut self.buffer)?;
        self.flush()?;
        Ok(())
    }
}
