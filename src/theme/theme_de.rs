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

use embedded_graphics::pixelcolor::Bgr888;
use serde::{Deserializer, de::{self, SeqAccess, Visitor}};

pub fn colour<'de, D>(deserializer: D) -> Result<Bgr888, D::Error>
    where D: Deserializer<'de>
{
    struct ColourVisitor;

    impl<'de> Visitor<'de> for ColourVisitor {
        type Value = Bgr888;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a hex color string or [r, g, b]")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where E: de::Error
        {
            let v = v.strip_prefix('#').unwrap_or(v);

            let val = u32::from_str_radix(v, 16)
                .map_err(E::custom)?;

            Ok(Bgr888::new(
                ((val >> 16) & 0xff) as u8,
                ((val >> 8) & 0xff) as u8,
                (val & 0xff) as u8
            ))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where A: SeqAccess<'de>
        {
            let r: u8 = seq.next_element()?
                .ok_or_else(|| de::Error::invalid_length(0, &self))?;
            let g: u8 = seq.next_element()?
                .ok_or_else(|| de::Error::invalid_length(1, &self))?;
            let b: u8 = seq.next_element()?
                .ok_or_else(|| de::Error::invalid_length(2, &self))?;

            Ok(Bgr888::new(r, g, b))
        }
    }

    deserializer.deserialize_any(ColourVisitor)
}

#[cfg(test)]
mod tests {
    use embedded_graphics::prelude::*;
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "colour")]
        c: Bgr888
    }

    #[test]
    fn hex_string_colour() {
        let w: Wrapper = toml::from_str(r##"c = "#03a9f4""##).expect("parse");
        assert_eq!((w.c.r(), w.c.g(), w.c.b()), (0x03, 0xa9, 0xf4));
    }

    #[test]
    fn rgb_triple_colour() {
        let w: Wrapper = toml::from_str("c = [1, 2, 3]").expect("parse");
        assert_eq!((w.c.r(), w.c.g(), w.c.b()), (1, 2, 3));
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(toml::from_str::<Wrapper>(r#"c = "zzz""#).is_err());
    }
}
