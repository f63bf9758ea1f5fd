use crate::error::Error;
use std::str::FromStr;

/// A colour, expressed in the RGB or grey colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// The colour as RGB components in the 0.0 to 1.0 range
    pub fn to_rgb(self) -> (f32, f32, f32) {
        match self {
            Colour::RGB { r, g, b } => (r, g, b),
            Colour::Grey { g } => (g, g, g),
        }
    }
}

impl From<[u8; 3]> for Colour {
    fn from(c: [u8; 3]) -> Self {
        let [r, g, b] = c;
        Colour::new_rgb_bytes(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Colour {
    fn from(c: (u8, u8, u8)) -> Self {
        Colour::new_rgb_bytes(c.0, c.1, c.2)
    }
}

/// Parses `"r,g,b"` triples with components from 0 to 255. Components above 255
/// are clamped, which is how the usual `"80,80,260"` style strings are meant.
impl FromStr for Colour {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAttribute {
            tag: "colour".to_string(),
            attribute: "rgb".to_string(),
            value: s.to_string(),
        };

        let components: Vec<u8> = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u16>()
                    .map(|v| v.min(255) as u8)
                    .map_err(|_| invalid())
            })
            .collect::<Result<_, _>>()?;

        match components.as_slice() {
            [r, g, b] => Ok(Colour::new_rgb_bytes(*r, *g, *b)),
            [g] => Ok(Colour::Grey {
                g: *g as f32 / 255.0,
            }),
            _ => Err(invalid()),
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GREEN: Colour = Colour::RGB {
        r: 0.0,
        g: 1.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_strings() {
        let c: Colour = "203,0,48".parse().unwrap();
        assert_eq!(c, Colour::new_rgb_bytes(203, 0, 48));

        // out of range components clamp rather than fail
        let c: Colour = "80, 80, 260".parse().unwrap();
        assert_eq!(c, Colour::new_rgb_bytes(80, 80, 255));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("red".parse::<Colour>().is_err());
        assert!("1,2".parse::<Colour>().is_err());
        assert!(matches!(
            "1,2,x".parse::<Colour>(),
            Err(Error::InvalidAttribute { .. })
        ));
    }
}
