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
    io::ErrorKind,
    net::{TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering}
    },
    thread,
    time::Duration
};

use log::{debug, info, warn};
use wear_datalink::{DataLinkError, MessageReader, weather::{WEATHER_PATH, WeatherItem}};

use crate::{
    events::{Event, EventSender},
    icon::IconBitmap
};

/// A weather push as it enters the event loop: temperatures plus the still
/// encoded icon asset.
#[derive(Debug, Clone)]
pub struct WeatherUpdate {
    pub max_temp: f64,
    pub min_temp: f64,
    pub icon_asset: Vec<u8>
}

/// Owns the data-link subscription and the background icon decodes.
///
/// Decodes are tagged with a monotonically increasing generation and the
/// subscription epoch current when they were spawned; the state machine
/// applies a completion only if both still match. There is no cancellation:
/// a hung decode never completes and a superseded one loses the generation
/// race.
pub struct WeatherStation<S> {
    event_sender: S,
    listener_stop: Option<Arc<AtomicBool>>,
    epoch: u64,
    generation: u64
}

impl<S: EventSender + Clone + Send + 'static> WeatherStation<S> {
    pub fn new(event_sender: S) -> Self {
        Self {
            event_sender,
            listener_stop: None,
            epoch: 0,
            generation: 0
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start the listener thread. Re-subscribing while subscribed is a
    /// no-op, matching the guarded receiver registration.
    pub fn subscribe(&mut self, addr: &str) {
        if self.listener_stop.is_some() {
            debug!("Already subscribed to weather channel");
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        self.listener_stop = Some(stop.clone());

        let addr = addr.to_string();
        let event_sender = self.event_sender.clone();

        thread::spawn(move || {
            // channel failures are not fatal; the face keeps rendering the
            // last snapshot it saw
            if let Err(e) = listen(&addr, &stop, &event_sender) {
                warn!("Weather channel listener failed: {e}");
            }
        });
    }

    /// Stop the listener and orphan any in-flight decode by moving to the
    /// next subscription epoch. Must stay in lockstep with the state
    /// machine's epoch. Unsubscribing while unsubscribed is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(stop) = self.listener_stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
        self.epoch += 1;
    }

    /// Decode the condition asset off the render thread. The completion
    /// hops back through the event channel; state is only ever mutated by
    /// the event loop.
    pub fn spawn_decode(&mut self, asset: Vec<u8>) {
        self.generation += 1;
        let generation = self.generation;
        let epoch = self.epoch;
        let event_sender = self.event_sender.clone();

        thread::spawn(move || {
            let icon = match IconBitmap::decode_bmp(&asset) {
                Ok(icon) => Some(icon),
                Err(e) => {
                    // terminal for this update; the next push starts fresh
                    warn!("Condition icon decode failed: {e}");
                    None
                }
            };

            let _ = event_sender.send_event(Event::IconDecoded {
                generation,
                epoch,
                icon
            });
        });
    }
}

const ACCEPT_POLL: Duration = Duration::from_millis(100);
const READ_TIMEOUT: Duration = Duration::from_millis(500);

fn listen<S: EventSender>(
    addr: &str,
    stop: &AtomicBool,
    event_sender: &S
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    info!("Weather channel listening on {addr}");

    while !stop.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                debug!("Weather channel peer connected: {peer}");
                if let Err(e) = serve_peer(stream, stop, event_sender) {
                    warn!("Weather channel connection failed: {e}");
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => return Err(e.into())
        }
    }

    Ok(())
}

fn serve_peer<S: EventSender>(
    stream: TcpStream,
    stop: &AtomicBool,
    event_sender: &S
) -> anyhow::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let mut reader = MessageReader::new(stream);

    while !stop.load(Ordering::Relaxed) {
        let item = match reader.read_item() {
            Ok(item) => item,
            Err(DataLinkError::Disconnected) => {
                debug!("Weather channel peer disconnected");
                return Ok(());
            }
            Err(DataLinkError::IoError(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                // idle; check the stop flag and keep waiting
                continue;
            }
            Err(e) => return Err(e.into())
        };

        if item.path != WEATHER_PATH {
            debug!("Ignoring data item at {}", item.path);
            continue;
        }

        match WeatherItem::try_from(&item) {
            Ok(weather) => {
                event_sender.send_event(Event::WeatherData(WeatherUpdate {
                    max_temp: weather.max_temp,
                    min_temp: weather.min_temp,
                    icon_asset: weather.condition
                }))?;
            }
            Err(e) => warn!("Malformed weather item: {e}")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{io::Write, sync::mpsc::channel, net::TcpStream};

    use super::*;

    fn recv_decoded(
        rx: &std::sync::mpsc::Receiver<Event>
    ) -> (u64, u64, Option<IconBitmap>) {
        match rx.recv_timeout(Duration::from_secs(5)).expect("event") {
            Event::IconDecoded { generation, epoch, icon } => (generation, epoch, icon),
            other => panic!("expected IconDecoded, got {:?}", other)
        }
    }

    #[test]
    fn decode_failure_reports_none() {
        let (tx, rx) = channel();
        let mut station = WeatherStation::new(tx);

        station.spawn_decode(vec![0xde, 0xad]);
        let (generation, epoch, icon) = recv_decoded(&rx);

        assert_eq!(generation, 1);
        assert_eq!(epoch, 0);
        assert!(icon.is_none());
    }

    #[test]
    fn decodes_carry_increasing_generations() {
        let (tx, rx) = channel();
        let mut station = WeatherStation::new(tx);

        station.spawn_decode(vec![0]);
        station.spawn_decode(vec![1]);

        let mut generations = vec![recv_decoded(&rx).0, recv_decoded(&rx).0];
        generations.sort();
        assert_eq!(generations, vec![1, 2]);
    }

    #[test]
    fn unsubscribe_moves_to_next_epoch() {
        let (tx, rx) = channel();
        let mut station = WeatherStation::new(tx);
        assert_eq!(station.epoch(), 0);

        station.unsubscribe();
        assert_eq!(station.epoch(), 1);

        // a decode spawned now is stamped with the new epoch
        station.spawn_decode(vec![0]);
        let (_, epoch, _) = recv_decoded(&rx);
        assert_eq!(epoch, 1);
    }

    #[test]
    fn listener_delivers_weather_pushes() {
        let addr = "127.0.0.1:47353";
        let (tx, rx) = channel();
        let mut station = WeatherStation::new(tx);
        station.subscribe(addr);

        // the listener thread needs a moment to bind
        let mut stream = None;
        for _ in 0..50 {
            match TcpStream::connect(addr) {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(_) => thread::sleep(Duration::from_millis(100))
            }
        }
        let mut stream = stream.expect("connect to listener");

        let item = WeatherItem {
            max_temp: 75.3,
            min_temp: 58.1,
            condition: vec![1, 2, 3]
        };
        stream.write_all(&item.to_item().to_bytes()).expect("write frame");

        match rx.recv_timeout(Duration::from_secs(5)).expect("event") {
            Event::WeatherData(update) => {
                assert_eq!(update.max_temp, 75.3);
                assert_eq!(update.min_temp, 58.1);
                assert_eq!(update.icon_asset, vec![1, 2, 3]);
            }
            other => panic!("expected WeatherData, got {:?}", other)
        }

        station.unsubscribe();
    }
}
