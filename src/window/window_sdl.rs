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

//! SDL window backend doubling as the simulated lifecycle host.
//!
//! Keys stand in for host callbacks:
//!   V visibility   A ambient        M interruption filter (mute)
//!   L low-bit      B burn-in        P peek card
//!   T locale (flips 12/24 hour)     W inject a weather push
//!   Q / close      quit

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering}
    }
};

use anyhow::{Result, anyhow};
use embedded_graphics::{pixelcolor::Bgr888, prelude::*};
use embedded_graphics_framebuf::FrameBuf;
use sdl2::{
    EventPump, event::{Event as SdlEvent, EventSender as SdlEventSender},
    keyboard::Keycode, pixels::PixelFormatEnum, render::Canvas, video::Window
};

use crate::{
    clock::LocaleProvider,
    drawable::{AppDrawable, AppFrameBuf, DISPLAY_SIZE},
    events::{Event, EventSender, EventSource},
    weather::WeatherUpdate
};

const DISPLAY_U32: u32 = DISPLAY_SIZE as u32;

/// Host minute tick interval simulated while ambient.
const TIME_TICK_MS: u32 = 60_000;

pub struct SdlWindow {
    window_canvas: Canvas<Window>,
    buffer: AppFrameBuf
}

impl SdlWindow {
    pub fn new() -> Result<Self> {
        let sdl_context = sdl2::init()
            .map_err(|e| anyhow!(e))?;

        let window = sdl_context.video()
            .map_err(|e| anyhow!(e))?
            .window("Sunface", DISPLAY_U32, DISPLAY_U32)
            .position_centered()
            .build()?;

        let window_canvas = window.into_canvas()
            .build()
            .map_err(|e| anyhow!(e))?;

        let data = [Bgr888::BLACK; DISPLAY_SIZE * DISPLAY_SIZE];
        let buffer = FrameBuf::new(data, DISPLAY_SIZE, DISPLAY_SIZE);

        Ok(
            Self { window_canvas, buffer }
        )
    }

    fn flush(&mut self) -> Result<()> {
        let texture_creator = self.window_canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::BGR888, DISPLAY_U32, DISPLAY_U32)
            .map_err(|e| anyhow!(e))?;

        texture.with_lock(None, |dest, _| {
            for (i, p) in self.buffer.data.iter().enumerate() {
                let offset = i * 4;
                dest[offset] = p.r();
                dest[offset + 1] = p.g();
                dest[offset + 2] = p.b();
            }
        }).map_err(|e| anyhow!(e))?;

        self.window_canvas.clear();
        self.window_canvas.copy(&texture, None, None)
            .map_err(|e| anyhow!(e))?;
        self.window_canvas.present();

        Ok(())
    }

    pub fn draw_screen(&mut self, screen: &dyn AppDrawable) -> Result<()> {
        screen.draw(&mut self.buffer)?;
        self.flush()?;
        Ok(())
    }
}

/// Shared 12/24-hour flag standing in for the host locale. The face
/// re-queries this every frame.
#[derive(Clone)]
pub struct SimLocale {
    use_24_hour: Arc<AtomicBool>
}

impl LocaleProvider for SimLocale {
    fn use_24_hour(&self) -> bool {
        self.use_24_hour.load(Ordering::Relaxed)
    }
}

pub struct SdlEventSource {
    event_pump: EventPump,
    event_sender: SdlEventSenderHandle,
    pending: VecDeque<Event>,
    use_24_hour: Arc<AtomicBool>,
    // mirrors of the simulated host state, toggled by keys
    visible: bool,
    ambient: bool,
    muted: bool,
    low_bit_ambient: bool,
    burn_in_protection: bool,
    peek_card: bool
}

impl SdlEventSource {
    pub fn new(use_24_hour: bool) -> Result<Self> {
        let sdl_context = sdl2::init()
            .map_err(|e| anyhow!(e))?;

        let event_pump = sdl_context.event_pump()
            .map_err(|e| anyhow!(e))?;

        let sdl_events = sdl_context.event()
            .map_err(|e| anyhow!(e))?;

        sdl_events.register_custom_event::<Event>()
            .map_err(|e| anyhow!(e))?;

        let event_sender = SdlEventSenderHandle::new(sdl_events.event_sender());

        Ok(Self {
            event_pump,
            event_sender,
            // the host reports visibility right after creation
            pending: VecDeque::from([Event::SetVisible(true)]),
            use_24_hour: Arc::new(AtomicBool::new(use_24_hour)),
            visible: true,
            ambient: false,
            muted: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            peek_card: false
        })
    }

    pub fn locale(&self) -> SimLocale {
        SimLocale { use_24_hour: self.use_24_hour.clone() }
    }

    fn properties_event(&self) -> Event {
        Event::SetProperties {
            low_bit_ambient: self.low_bit_ambient,
            burn_in_protection: self.burn_in_protection
        }
    }

    fn map_sdl_event(&mut self, event: SdlEvent) -> Option<Event> {
        match event {
            SdlEvent::Quit { .. } =>
                Some(Event::Quit),
            SdlEvent::KeyDown { keycode: Some(Keycode::Q), .. } =>
                Some(Event::Quit),
            SdlEvent::KeyDown { keycode: Some(Keycode::V), .. } => {
                self.visible = !self.visible;
                Some(Event::SetVisible(self.visible))
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::A), .. } => {
                self.ambient = !self.ambient;
                Some(Event::SetAmbient(self.ambient))
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::M), .. } => {
                self.muted = !self.muted;
                Some(Event::SetMuted(self.muted))
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::L), .. } => {
                self.low_bit_ambient = !self.low_bit_ambient;
                Some(self.properties_event())
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::B), .. } => {
                self.burn_in_protection = !self.burn_in_protection;
                Some(self.properties_event())
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::P), .. } => {
                self.peek_card = !self.peek_card;
                Some(Event::PeekCard(self.peek_card.then_some(96)))
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::T), .. } => {
                self.use_24_hour.fetch_xor(true, Ordering::Relaxed);
                Some(Event::LocaleChanged)
            }
            SdlEvent::KeyDown { keycode: Some(Keycode::W), .. } => {
                Some(Event::WeatherData(WeatherUpdate {
                    max_temp: 75.3,
                    min_temp: 58.1,
                    icon_asset: test_condition_asset()
                }))
            }
            sdl_event => {
                if sdl_event.is_user_event() {
                    Some(sdl_event.as_user_event_type::<Event>().unwrap())
                } else {
                    None
                }
            }
        }
    }
}

impl EventSource<SdlEventSenderHandle> for SdlEventSource {
    fn wait_event(&mut self) -> Result<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }

            match self.event_pump.wait_event_timeout(TIME_TICK_MS) {
                Some(sdl_event) => {
                    if let Some(event) = self.map_sdl_event(sdl_event) {
                        return Ok(event);
                    }
                    // Unhandled event: wait again
                }
                None => {
                    // ambient hosts deliver a tick once a minute
                    if self.visible && self.ambient {
                        return Ok(Event::TimeTick);
                    }
                }
            }
        }
    }

    fn event_sender(&self) -> SdlEventSenderHandle {
        self.event_sender.clone()
    }
}

#[derive(Clone)]
pub struct SdlEventSenderHandle {
    inner: Arc<SdlEventSender>,
}

impl SdlEventSenderHandle {
    fn new(sender: SdlEventSender) -> Self {
        Self { inner: Arc::new(sender) }
    }
}

impl EventSender for SdlEventSenderHandle {
    fn send_event(&self, event: Event) -> Result<()> {
        self.inner.push_custom_event(event)
            .map_err(|e| anyhow!(e))
    }
}

/// A solid 16x16 24-bit BMP, enough to exercise the decode and scale path
/// from the keyboard.
fn test_condition_asset() -> Vec<u8> {
    const SIZE: u32 = 16;
    const HEADER_LEN: u32 = 54;
    let row_len = SIZE * 3; // already 4-byte aligned
    let data_len = row_len * SIZE;

    let mut bmp = Vec::with_capacity((HEADER_LEN + data_len) as usize);

    // file header
    bmp.extend(b"BM");
    bmp.extend((HEADER_LEN + data_len).to_le_bytes());
    bmp.extend([0; 4]); // reserved
    bmp.extend(HEADER_LEN.to_le_bytes());

    // info header
    bmp.extend(40u32.to_le_bytes());
    bmp.extend((SIZE as i32).to_le_bytes());
    bmp.extend((SIZE as i32).to_le_bytes());
    bmp.extend(1u16.to_le_bytes());  // planes
    bmp.extend(24u16.to_le_bytes()); // bits per pixel
    bmp.extend([0; 4]);              // BI_RGB
    bmp.extend(data_len.to_le_bytes());
    bmp.extend([0; 16]);             // resolution + palette fields

    for _ in 0..(SIZE * SIZE) {
        // BGR: sunny yellow
        bmp.extend([0x00, 0xc4, 0xff]);
    }

    bmp
}
