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

mod clock;
mod config;
mod drawable;
mod events;
mod face;
mod fonts;
mod icon;
mod state;
mod theme;
mod timer;
mod weather;
mod window;

use anyhow::Result;
use argh::FromArgs;
use log::debug;

use crate::{
    config::Config,
    events::{Event, EventSource},
    face::FaceScreen,
    state::{FaceState, SideEffect},
    timer::RedrawTimer,
    weather::WeatherStation
};

#[derive(FromArgs)]
/// Digital watch face showing time, date and weather pushed from a
/// paired phone.
struct Args {
    /// path to the config file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// log to syslog instead of stderr
    #[argh(switch)]
    syslog: bool
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.syslog)?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default()
    };

    let mut event_source = window::new_event_source(&config)?;
    let mut window = window::new_window()?;
    let locale = window::new_locale(&config, &event_source);

    let mut state = FaceState::new();
    let mut face = FaceScreen::new(&config, Box::new(locale));
    let mut weather = WeatherStation::new(event_source.event_sender());
    let mut timer = RedrawTimer::new(
        event_source.event_sender(),
        config.display.update_rate
    );

    'running: loop {
        let event = event_source.wait_event()?;
        if matches!(event, Event::Quit) {
            break 'running;
        }

        let effects = state.apply(&event);

        // resolve the asset off the render thread; the decoded bitmap
        // re-enters through the event channel
        if let Event::WeatherData(update) = &event {
            weather.spawn_decode(update.icon_asset.clone());
        }

        let mut redraw = false;
        for effect in effects {
            match effect {
                SideEffect::Subscribe =>
                    weather.subscribe(&config.channel.listen_addr),
                SideEffect::Unsubscribe =>
                    weather.unsubscribe(),
                SideEffect::ArmTimer(epoch) =>
                    timer.arm(epoch),
                SideEffect::DisarmTimer =>
                    timer.disarm(),
                SideEffect::RegisterLocale =>
                    debug!("Locale change notifications hooked up"),
                SideEffect::UnregisterLocale =>
                    debug!("Locale change notifications released"),
                SideEffect::RefreshFormats =>
                    face.refresh_formats(),
                SideEffect::ResolvePalette =>
                    face.resolve_palette(&state),
                SideEffect::Redraw =>
                    redraw = true
            }
        }

        if redraw && state.visible {
            face.sync(&state);
            window.draw_screen(&face)?;
        }
    }

    // teardown cancels everything pending unconditionally
    timer.disarm();
    weather.unsubscribe();

    Ok(())
}

fn init_logging(use_syslog: bool) -> Result<()> {
    if use_syslog {
        syslog::init(
            syslog::Facility::LOG_USER,
            log::LevelFilter::Info,
            Some("sunface")
        ).map_err(|e| anyhow::anyhow!("Syslog setup failed: {e}"))?;
    } else {
        env_logger::init();
    }

    Ok(())
}
