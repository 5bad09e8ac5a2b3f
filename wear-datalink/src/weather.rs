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

//! The weather data item pushed by the paired phone.

use crate::{DataItem, DataLinkError, Result};

pub const WEATHER_PATH: &str = "/weather";

const KEY_TEMP_MAX: &str = "temp_max";
const KEY_TEMP_MIN: &str = "temp_min";
const KEY_CONDITION: &str = "condition_image";

/// Typed view of a weather push: forecast high/low plus the raw bytes of
/// the condition icon asset.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherItem {
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition: Vec<u8>
}

impl WeatherItem {
    pub fn to_item(&self) -> DataItem {
        let mut item = DataItem::new(WEATHER_PATH);
        item.put_float(KEY_TEMP_MAX, self.max_temp);
        item.put_float(KEY_TEMP_MIN, self.min_temp);
        item.put_asset(KEY_CONDITION, self.condition.clone());
        item
    }
}

impl TryFrom<&DataItem> for WeatherItem {
    type Error = DataLinkError;

    fn try_from(item: &DataItem) -> Result<Self> {
        Ok(Self {
            max_temp: item.get_float(KEY_TEMP_MAX)
                .ok_or(DataLinkError::MissingEntry(KEY_TEMP_MAX))?,
            min_temp: item.get_float(KEY_TEMP_MIN)
                .ok_or(DataLinkError::MissingEntry(KEY_TEMP_MIN))?,
            condition: item.get_asset(KEY_CONDITION)
                .ok_or(DataLinkError::MissingEntry(KEY_CONDITION))?
                .to_vec()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_item_round_trip() {
        let weather = WeatherItem {
            max_temp: 75.3,
            min_temp: 58.1,
            condition: vec![1, 2, 3]
        };

        let item = weather.to_item();
        assert_eq!(item.path, WEATHER_PATH);
        assert_eq!(WeatherItem::try_from(&item).expect("weather"), weather);
    }

    #[test]
    fn missing_field_rejected() {
        let mut item = DataItem::new(WEATHER_PATH);
        item.put_float(KEY_TEMP_MAX, 1.0);

        match WeatherItem::try_from(&item) {
            Err(DataLinkError::MissingEntry(KEY_TEMP_MIN)) => {}
            other => panic!("expected missing entry, got {:?}", other)
        }
    }
}
