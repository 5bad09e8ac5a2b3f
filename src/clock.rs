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

use chrono::{DateTime, Local, Timelike};

/// One wall-clock reading, taken exactly once per frame so the hour, minute
/// and date can never tear against each other mid-frame.
#[derive(Debug, Clone, Copy)]
pub struct ClockSnapshot {
    when: DateTime<Local>
}

impl ClockSnapshot {
    pub fn now() -> Self {
        Self { when: Local::now() }
    }

    pub fn at(when: DateTime<Local>) -> Self {
        Self { when }
    }

    fn hour(&self) -> u32 {
        self.when.hour()
    }

    fn minute(&self) -> u32 {
        self.when.minute()
    }
}

/// Where the 12/24-hour preference comes from. Re-queried every frame;
/// the preference can change while the face is ambient or hidden.
pub trait LocaleProvider {
    fn use_24_hour(&self) -> bool;
}

/// Fixed preference sourced from the config file (device builds have no
/// interactive way to flip it).
pub struct FixedLocale {
    pub use_24_hour: bool
}

impl LocaleProvider for FixedLocale {
    fn use_24_hour(&self) -> bool {
        self.use_24_hour
    }
}

/// Locale-derived formatting state. Rebuilt whenever the host reports a
/// locale or timezone change, and whenever the face becomes visible again.
#[derive(Debug, Clone)]
pub struct ClockFormats {
    date_pattern: String,
    am_label: String,
    pm_label: String
}

impl ClockFormats {
    pub fn new() -> Self {
        let mut formats = Self {
            date_pattern: String::new(),
            am_label: String::new(),
            pm_label: String::new()
        };
        formats.refresh();
        formats
    }

    /// Re-derive the date formatter and meridiem labels.
    pub fn refresh(&mut self) {
        self.date_pattern = "%a, %b %d %Y".to_string();
        self.am_label = "AM".to_string();
        self.pm_label = "PM".to_string();
    }

    /// Zero-padded in 24-hour style; unpadded with midnight shown as 12 in
    /// 12-hour style.
    pub fn hour_text(&self, snapshot: &ClockSnapshot, use_24_hour: bool) -> String {
        if use_24_hour {
            format!("{:02}", snapshot.hour())
        } else {
            let hour = match snapshot.hour() % 12 {
                0 => 12,
                h => h
            };
            hour.to_string()
        }
    }

    pub fn minute_text(&self, snapshot: &ClockSnapshot) -> String {
        format!("{:02}", snapshot.minute())
    }

    /// The meridiem label, or `None` in 24-hour style (the element is not
    /// drawn at all).
    pub fn am_pm_text(&self, snapshot: &ClockSnapshot, use_24_hour: bool) -> Option<String> {
        if use_24_hour {
            None
        } else if snapshot.hour() < 12 {
            Some(self.am_label.clone())
        } else {
            Some(self.pm_label.clone())
        }
    }

    pub fn date_text(&self, snapshot: &ClockSnapshot) -> String {
        snapshot.when.format(&self.date_pattern).to_string()
    }
}

/// Whole degrees with a degree sign, the same shape the phone app shows.
pub fn temperature_text(temp: f64) -> String {
    format!("{:.0}°", temp)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn snapshot(h: u32, m: u32, s: u32) -> ClockSnapshot {
        let when = Local.with_ymd_and_hms(2014, 8, 12, h, m, s).unwrap();
        ClockSnapshot::at(when)
    }

    #[test]
    fn twenty_four_hour_time_is_padded_without_meridiem() {
        let formats = ClockFormats::new();
        let snap = snapshot(14, 7, 5);

        assert_eq!(formats.hour_text(&snap, true), "14");
        assert_eq!(formats.minute_text(&snap), "07");
        assert_eq!(formats.am_pm_text(&snap, true), None);
    }

    #[test]
    fn twelve_hour_time_is_unpadded_with_meridiem() {
        let formats = ClockFormats::new();
        let snap = snapshot(14, 7, 5);

        assert_eq!(formats.hour_text(&snap, false), "2");
        assert_eq!(formats.am_pm_text(&snap, false), Some("PM".to_string()));
    }

    #[test]
    fn midnight_renders_as_twelve() {
        let formats = ClockFormats::new();
        let snap = snapshot(0, 30, 0);

        assert_eq!(formats.hour_text(&snap, false), "12");
        assert_eq!(formats.am_pm_text(&snap, false), Some("AM".to_string()));
        assert_eq!(formats.hour_text(&snap, true), "00");
    }

    #[test]
    fn noon_is_pm() {
        let formats = ClockFormats::new();
        let snap = snapshot(12, 0, 0);

        assert_eq!(formats.hour_text(&snap, false), "12");
        assert_eq!(formats.am_pm_text(&snap, false), Some("PM".to_string()));
    }

    #[test]
    fn date_row_shows_weekday_month_day_year() {
        let formats = ClockFormats::new();
        assert_eq!(formats.date_text(&snapshot(14, 7, 5)), "Tue, Aug 12 2014");
    }

    #[test]
    fn temperatures_round_to_whole_degrees() {
        assert_eq!(temperature_text(75.3), "75°");
        assert_eq!(temperature_text(58.1), "58°");
        assert_eq!(temperature_text(0.0), "0°");
    }
}
