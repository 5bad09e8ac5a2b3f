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

use std::{fs, path::Path, time::Duration};

use anyhow::Result;
use serde::Deserialize;

mod config_de;

use crate::{face::FaceMetrics, theme::ThemeConfig};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub channel: ChannelConfig,
    pub display: DisplayConfig,
    pub locale: LocaleConfig,
    pub theme: ThemeConfig
}

impl Config {
    pub fn load<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let toml_src = fs::read_to_string(file_path)?;
        let config = toml::from_str(&toml_src)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            display: DisplayConfig::default(),
            locale: LocaleConfig::default(),
            theme: ThemeConfig::default()
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ChannelConfig {
    /// Address the data-link listener binds to for pushes from the phone
    pub listen_addr: String
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:7735".to_string()
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Physical watch shape; selects the dimension set for layout
    pub shape: Shape,

    /// Interactive redraw interval. Once a minute is enough since the face
    /// shows no seconds.
    #[serde(deserialize_with = "config_de::duration")]
    pub update_rate: Duration
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            shape: Shape::Square,
            update_rate: Duration::from_secs(60)
        }
    }
}

impl DisplayConfig {
    pub fn metrics(&self) -> FaceMetrics {
        match self.shape {
            // round faces need the stack pulled toward the centre so the
            // corners of the rows stay inside the bezel
            Shape::Round => FaceMetrics {
                y_offset: 110,
                line_height: 36,
                divider_half_width: 24
            },
            Shape::Square => FaceMetrics {
                y_offset: 96,
                line_height: 38,
                divider_half_width: 28
            }
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Round,
    Square
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LocaleConfig {
    /// Hour style the simulated host locale reports
    pub use_24_hour: bool
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self { use_24_hour: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.channel.listen_addr, "0.0.0.0:7735");
        assert_eq!(config.display.shape, Shape::Square);
        assert_eq!(config.display.update_rate, Duration::from_secs(60));
        assert!(!config.locale.use_24_hour);
    }

    #[test]
    fn full_config_parses() {
        let src = r##"
            [channel]
            listen_addr = "127.0.0.1:9000"

            [display]
            shape = "round"
            update_rate = "30s"

            [locale]
            use_24_hour = true

            [theme]
            background = "#000080"
            time = [255, 255, 255]
        "##;

        let config: Config = toml::from_str(src).expect("parse");
        assert_eq!(config.channel.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.display.shape, Shape::Round);
        assert_eq!(config.display.update_rate, Duration::from_secs(30));
        assert!(config.locale.use_24_hour);
    }

    #[test]
    fn duration_accepts_minutes_suffix() {
        let src = "[display]\nupdate_rate = \"2m\"";
        let config: Config = toml::from_str(src).expect("parse");
        assert_eq!(config.display.update_rate, Duration::from_secs(120));
    }

    #[test]
    fn round_and_square_metrics_differ() {
        let round = DisplayConfig { shape: Shape::Round, ..Default::default() };
        let square = DisplayConfig { shape: Shape::Square, ..Default::default() };
        assert_ne!(round.metrics().y_offset, square.metrics().y_offset);
    }
}
