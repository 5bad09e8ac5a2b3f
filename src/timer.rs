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

use std::{
    sync::mpsc::{RecvTimeoutError, Sender, channel},
    thread,
    time::Duration
};

use log::debug;

use crate::events::{Event, EventSender};

/// Periodic interactive redraw ticks. Armed while the face is visible and
/// interactive, disarmed everywhere else.
///
/// Ticks carry the epoch they were armed with; the state machine drops any
/// tick whose epoch is no longer current, which covers the tick that may
/// already sit in the event queue when the timer is disarmed.
pub struct RedrawTimer<S> {
    event_sender: S,
    period: Duration,
    stop: Option<Sender<()>>
}

impl<S: EventSender + Clone + Send + 'static> RedrawTimer<S> {
    pub fn new(event_sender: S, period: Duration) -> Self {
        Self {
            event_sender,
            period,
            stop: None
        }
    }

    pub fn is_armed(&self) -> bool {
        self.stop.is_some()
    }

    pub fn arm(&mut self, epoch: u64) {
        // re-arming replaces any running tick thread
        self.disarm();
        debug!("Arming redraw timer (epoch {epoch})");

        let (stop_sender, stop_receiver) = channel();
        let event_sender = self.event_sender.clone();
        let period = self.period;

        thread::spawn(move || {
            loop {
                match stop_receiver.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if event_sender.send_event(Event::RedrawTick(epoch)).is_err() {
                            break;
                        }
                    }
                    _ => break
                }
            }
        });

        self.stop = Some(stop_sender);
    }

    pub fn disarm(&mut self) {
        if let Some(stop) = self.stop.take() {
            debug!("Disarming redraw timer");
            let _ = stop.send(());
        }
    }
}

impl<S> Drop for RedrawTimer<S> {
    fn drop(&mut self) {
        // teardown cancels pending ticks unconditionally
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
