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

use anyhow::Result;

use crate::config::Config;

#[cfg(feature = "device")]
mod window_fb;

#[cfg(feature = "device")]
pub fn new_window() -> Result<window_fb::FramebufferWindow> {
    window_fb::FramebufferWindow::new()
}

#[cfg(feature = "device")]
pub fn new_event_source(_config: &Config) -> Result<crate::events::DefaultEventSource> {
    use crate::events::{Event, EventSender, EventSource};

    // watch hardware has no window manager; the panel is visible from boot
    let source = crate::events::DefaultEventSource::new();
    source.event_sender().send_event(Event::SetVisible(true))?;
    Ok(source)
}

#[cfg(feature = "device")]
pub fn new_locale(
    config: &Config,
    _source: &crate::events::DefaultEventSource
) -> crate::clock::FixedLocale {
    crate::clock::FixedLocale { use_24_hour: config.locale.use_24_hour }
}

#[cfg(feature = "simulate")]
mod window_sdl;

#[cfg(feature = "simulate")]
pub fn new_window() -> Result<window_sdl::SdlWindow> {
    window_sdl::SdlWindow::new()
}

#[cfg(feature = "simulate")]
pub fn new_event_source(config: &Config) -> Result<window_sdl::SdlEventSource> {
    window_sdl::SdlEventSource::new(config.locale.use_24_hour)
}

#[cfg(feature = "simulate")]
pub fn new_locale(
    _config: &Config,
    source: &window_sdl::SdlEventSource
) -> window_sdl::SimLocale {
    source.locale()
}
