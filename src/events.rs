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

use std::sync::mpsc::{Receiver, Sender, channel};

use anyhow::Result;

use crate::{icon::IconBitmap, weather::WeatherUpdate};

/// Everything the watch face reacts to, as one narrow vocabulary. The host
/// adapter (window backend) translates platform callbacks into these; worker
/// threads push their completions through the same channel.
#[derive(Debug)]
pub enum Event {
    /// Face shown or hidden by the host.
    SetVisible(bool),
    /// Ambient (always-on low power) mode toggled by the host.
    SetAmbient(bool),
    /// Display capability flags, reported once by the host after startup.
    SetProperties {
        low_bit_ambient: bool,
        burn_in_protection: bool
    },
    /// Interruption filter engaged or released.
    SetMuted(bool),
    /// Host minute tick, delivered while ambient.
    TimeTick,
    /// Periodic interactive tick, tagged with the arming epoch so ticks
    /// already queued when the timer is disarmed can be recognized as stale.
    RedrawTick(u64),
    /// Timezone or locale changed; date formats must be re-derived.
    LocaleChanged,
    /// Height of a system overlay card obscuring the lower face region,
    /// or `None` when the region is clear.
    PeekCard(Option<u32>),
    /// Weather push from the paired phone.
    WeatherData(WeatherUpdate),
    /// Completion of a background icon decode. `icon` is `None` when the
    /// asset could not be decoded.
    IconDecoded {
        generation: u64,
        epoch: u64,
        icon: Option<IconBitmap>
    },
    Quit
}

pub trait EventSender {
    fn send_event(&self, event: Event) -> Result<()>;
}

pub trait EventSource<S: EventSender> {
    fn wait_event(&mut self) -> Result<Event>;
    fn event_sender(&self) -> S;
}

pub struct DefaultEventSource {
    sender: Sender<Event>,
    receiver: Receiver<Event>
}

impl DefaultEventSource {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }
}

impl EventSource<Sender<Event>> for DefaultEventSource {
    fn wait_event(&mut self) -> Result<Event> {
        Ok(self.receiver.recv()?)
    }

    fn event_sender(&self) -> Sender<Event> {
        self.sender.clone()
    }
}

impl EventSender for Sender<Event> {
    fn send_event(&self, event: Event) -> Result<()> {
        Ok(self.send(event)?)
    }
}
