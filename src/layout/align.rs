use crate::error::Error;
use std::str::FromStr;

/// Horizontal alignment of lines within a text box
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch the gaps between words so every line but the last of each
    /// paragraph spans the full width
    Justify,
}

/// Vertical alignment of content within a table cell
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

fn invalid(attribute: &str, value: &str) -> Error {
    Error::InvalidAttribute {
        tag: "align".to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

impl Align {
    fn from_code(code: char) -> Option<Align> {
        match code.to_ascii_uppercase() {
            'L' => Some(Align::Left),
            'C' => Some(Align::Center),
            'R' => Some(Align::Right),
            'J' => Some(Align::Justify),
            _ => None,
        }
    }
}

impl VAlign {
    fn from_code(code: char) -> Option<VAlign> {
        match code.to_ascii_uppercase() {
            'T' => Some(VAlign::Top),
            'M' => Some(VAlign::Middle),
            'B' => Some(VAlign::Bottom),
            _ => None,
        }
    }
}

/// Accepts the single letter codes `L`, `C`, `R`, `J` as well as the full
/// words, in any case
impl FromStr for Align {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return Align::from_code(code).ok_or_else(|| invalid("align", s));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" | "centre" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            "justify" => Ok(Align::Justify),
            _ => Err(invalid("align", s)),
        }
    }
}

impl FromStr for VAlign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return VAlign::from_code(code).ok_or_else(|| invalid("vertical_align", s));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "top" => Ok(VAlign::Top),
            "middle" => Ok(VAlign::Middle),
            "bottom" => Ok(VAlign::Bottom),
            _ => Err(invalid("vertical_align", s)),
        }
    }
}

/// A combined alignment code such as `"RT"`, `"MC"` or `"BL"`: one optional
/// horizontal letter (`L`, `C`, `R`, `J`) and one optional vertical letter
/// (`T`, `M`, `B`), in either order
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellAlignment {
    pub horizontal: Option<Align>,
    pub vertical: Option<VAlign>,
}

impl FromStr for CellAlignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut alignment = CellAlignment::default();
        for code in s.trim().chars() {
            // 'B' is bottom here; there is no horizontal 'B'
            if let Some(v) = VAlign::from_code(code).filter(|_| alignment.vertical.is_none()) {
                alignment.vertical = Some(v);
            } else if let Some(h) = Align::from_code(code).filter(|_| alignment.horizontal.is_none()) {
                alignment.horizontal = Some(h);
            } else {
                return Err(invalid("align", s));
            }
        }
        Ok(alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_words_and_letters() {
        assert_eq!("c".parse::<Align>().unwrap(), Align::Center);
        assert_eq!("Right".parse::<Align>().unwrap(), Align::Right);
        assert_eq!("justify".parse::<Align>().unwrap(), Align::Justify);
        assert!("middle".parse::<Align>().is_err());
        assert_eq!("M".parse::<VAlign>().unwrap(), VAlign::Middle);
    }

    #[test]
    fn combined_cell_codes() {
        let rt: CellAlignment = "RT".parse().unwrap();
        assert_eq!(rt.horizontal, Some(Align::Right));
        assert_eq!(rt.vertical, Some(VAlign::Top));

        let tr: CellAlignment = "TR".parse().unwrap();
        assert_eq!(tr, rt);

        let mj: CellAlignment = "MJ".parse().unwrap();
        assert_eq!(mj.horizontal, Some(Align::Justify));
        assert_eq!(mj.vertical, Some(VAlign::Middle));

        let c: CellAlignment = "C".parse().unwrap();
        assert_eq!(c.horizontal, Some(Align::Center));
        assert_eq!(c.vertical, None);

        assert!("LRX".parse::<CellAlignment>().is_err());
    }
}
