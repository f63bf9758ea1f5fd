//! Named text styles shared by the flow and table engines.
//!
//! A [`StyleRegistry`] maps style names to partial [`StyleDef`]initions. Unset
//! attributes are inherited from a named parent style, then from the reserved
//! `default` style, and finally from built-in values. Style names double as
//! markup tags: registering `h1` makes `<h1>…</h1>` available in flowed text.

use crate::colour::{colours, Colour};
use crate::error::{Error, Result};
use crate::units::Pt;
use std::collections::HashMap;
use std::str::FromStr;

/// Name of the root style every other style falls back to
pub const DEFAULT_STYLE: &str = "default";

const BUILTIN_FAMILY: &str = "helvetica";
const BUILTIN_SIZE: Pt = Pt(11.0);

/// Weight, slant and underline flags of a style
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
    };
    pub const BOLD: FontStyle = FontStyle {
        bold: true,
        italic: false,
        underline: false,
    };
    pub const ITALIC: FontStyle = FontStyle {
        bold: false,
        italic: true,
        underline: false,
    };
    pub const UNDERLINE: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: true,
    };

    /// Combine the flags of two styles, keeping every flag set in either
    pub fn union(self, other: FontStyle) -> FontStyle {
        FontStyle {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }
}

/// Parses the letter codes `B`, `I` and `U` in any order and case; the empty
/// string is the regular style
impl FromStr for FontStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut style = FontStyle::REGULAR;
        for ch in s.trim().chars() {
            match ch.to_ascii_uppercase() {
                'B' => style.bold = true,
                'I' => style.italic = true,
                'U' => style.underline = true,
                _ => {
                    return Err(Error::InvalidAttribute {
                        tag: "style".to_string(),
                        attribute: "font_style".to_string(),
                        value: s.to_string(),
                    })
                }
            }
        }
        Ok(style)
    }
}

/// A partial set of text attributes. Every `None` is inherited from somewhere
/// else: a parent style, an enclosing tag or a table cell's defaults
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyleOverride {
    pub family: Option<String>,
    pub size: Option<Pt>,
    pub font_style: Option<FontStyle>,
    pub colour: Option<Colour>,
}

impl StyleOverride {
    pub fn with_family<S: ToString>(mut self, family: S) -> Self {
        self.family = Some(family.to_string());
        self
    }

    pub fn with_size<P: Into<Pt>>(mut self, size: P) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_font_style(mut self, font_style: FontStyle) -> Self {
        self.font_style = Some(font_style);
        self
    }

    pub fn with_colour<C: Into<Colour>>(mut self, colour: C) -> Self {
        self.colour = Some(colour.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.family.is_none()
            && self.size.is_none()
            && self.font_style.is_none()
            && self.colour.is_none()
    }

    /// Fill every unset attribute from `parent`, keeping what is already set
    pub(crate) fn inherit_from(&mut self, parent: &StyleOverride) {
        if self.family.is_none() {
            self.family.clone_from(&parent.family);
        }
        self.size = self.size.or(parent.size);
        self.font_style = self.font_style.or(parent.font_style);
        self.colour = self.colour.or(parent.colour);
    }
}

/// A registered style: its own attributes plus the style it inherits from.
/// Without an explicit parent a style inherits from [`DEFAULT_STYLE`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyleDef {
    pub attributes: StyleOverride,
    pub inherits: Option<String>,
}

impl StyleDef {
    pub fn new() -> StyleDef {
        StyleDef::default()
    }

    pub fn size<P: Into<Pt>>(mut self, size: P) -> Self {
        self.attributes.size = Some(size.into());
        self
    }

    pub fn font_style(mut self, font_style: FontStyle) -> Self {
        self.attributes.font_style = Some(font_style);
        self
    }

    pub fn colour<C: Into<Colour>>(mut self, colour: C) -> Self {
        self.attributes.colour = Some(colour.into());
        self
    }

    pub fn family<S: ToString>(mut self, family: S) -> Self {
        self.attributes.family = Some(family.to_string());
        self
    }

    pub fn inherits<S: ToString>(mut self, parent: S) -> Self {
        self.inherits = Some(parent.to_string());
        self
    }
}

/// A style with every attribute filled in, ready to draw with
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub family: String,
    pub size: Pt,
    pub font_style: FontStyle,
    pub colour: Colour,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        ResolvedStyle {
            family: BUILTIN_FAMILY.to_string(),
            size: BUILTIN_SIZE,
            font_style: FontStyle::REGULAR,
            colour: colours::BLACK,
        }
    }
}

impl ResolvedStyle {
    /// Layer a nested style on top of this one. Family, size and colour are
    /// replaced when set; font flags accumulate, so bold inside italic text
    /// renders bold italic.
    pub fn apply(&self, over: &StyleOverride) -> ResolvedStyle {
        ResolvedStyle {
            family: over.family.clone().unwrap_or_else(|| self.family.clone()),
            size: over.size.unwrap_or(self.size),
            font_style: over
                .font_style
                .map(|fs| self.font_style.union(fs))
                .unwrap_or(self.font_style),
            colour: over.colour.unwrap_or(self.colour),
        }
    }

    /// Fill from a fully inherited attribute set, where set attributes replace
    /// rather than accumulate
    fn from_attributes(attributes: StyleOverride) -> ResolvedStyle {
        let builtin = ResolvedStyle::default();
        ResolvedStyle {
            family: attributes.family.unwrap_or(builtin.family),
            size: attributes.size.unwrap_or(builtin.size),
            font_style: attributes.font_style.unwrap_or(builtin.font_style),
            colour: attributes.colour.unwrap_or(builtin.colour),
        }
    }
}

/// The set of named styles available to a document
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: HashMap<String, StyleDef>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        StyleRegistry::new()
    }
}

impl StyleRegistry {
    /// Create a registry holding only the `default` style, which resolves to
    /// 11pt regular black helvetica
    pub fn new() -> StyleRegistry {
        let mut styles = HashMap::new();
        styles.insert(DEFAULT_STYLE.to_string(), StyleDef::new());
        StyleRegistry { styles }
    }

    /// Register a style, replacing any earlier definition with the same name.
    /// Names are case-insensitive. Fails with [`Error::StyleCycle`] if the new
    /// definition would make the style its own ancestor.
    pub fn set_style<S: AsRef<str>>(&mut self, name: S, def: StyleDef) -> Result<()> {
        let name = name.as_ref().to_lowercase();
        let mut def = def;
        def.inherits = def.inherits.map(|parent| parent.to_lowercase());

        if name == DEFAULT_STYLE {
            if let Some(parent) = def.inherits.take() {
                log::warn!("the default style cannot inherit (from `{parent}`), ignoring parent");
            }
        } else {
            let mut ancestor = def.inherits.clone();
            let mut steps = 0;
            while let Some(current) = ancestor {
                if current == name {
                    return Err(Error::StyleCycle { name });
                }
                steps += 1;
                if steps > self.styles.len() {
                    break;
                }
                ancestor = self
                    .styles
                    .get(&current)
                    .and_then(|parent| parent.inherits.clone());
            }
        }

        log::debug!("registering style `{name}`: {def:?}");
        self.styles.insert(name, def);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<&StyleDef> {
        self.styles.get(&name.to_lowercase())
    }

    /// Resolve a style to concrete attributes, walking the inheritance chain
    /// down to `default` and the built-in values
    pub fn resolve(&self, name: &str) -> Result<ResolvedStyle> {
        let attributes = self.inherited_attributes(name, true)?;
        Ok(ResolvedStyle::from_attributes(attributes))
    }

    /// The attributes a style sets through its own chain of parents, without
    /// the `default` style. This is what a nested tag layers onto the text
    /// around it, so `<b>` inside `<h1>` keeps the heading's size.
    pub fn tag_override(&self, name: &str) -> Result<StyleOverride> {
        self.inherited_attributes(name, false)
    }

    fn inherited_attributes(&self, name: &str, include_default: bool) -> Result<StyleOverride> {
        let mut attributes = StyleOverride::default();
        let mut current = name.to_lowercase();

        // set_style guarantees chains are acyclic, so every chain reaches
        // default within styles.len() steps
        for _ in 0..=self.styles.len() {
            if current == DEFAULT_STYLE && !include_default {
                return Ok(attributes);
            }
            let def = self
                .styles
                .get(&current)
                .ok_or_else(|| Error::UnknownStyle {
                    name: current.clone(),
                })?;
            attributes.inherit_from(&def.attributes);
            if current == DEFAULT_STYLE {
                return Ok(attributes);
            }
            current = def
                .inherits
                .clone()
                .unwrap_or_else(|| DEFAULT_STYLE.to_string());
        }

        Err(Error::StyleCycle {
            name: name.to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> StyleRegistry {
        let mut styles = StyleRegistry::new();
        styles
            .set_style(
                "default",
                StyleDef::new()
                    .size(Pt(11.0))
                    .font_style(FontStyle::REGULAR)
                    .colour(Colour::new_rgb_bytes(0, 0, 77))
                    .family("helvetica"),
            )
            .unwrap();
        styles
            .set_style("b", StyleDef::new().font_style(FontStyle::BOLD))
            .unwrap();
        styles
            .set_style(
                "h",
                StyleDef::new()
                    .font_style(FontStyle::BOLD)
                    .colour(Colour::new_rgb_bytes(203, 0, 48)),
            )
            .unwrap();
        styles
            .set_style(
                "title",
                StyleDef::new().size(Pt(14.0)).colour(Colour::new_rgb_bytes(102, 0, 0)).inherits("h"),
            )
            .unwrap();
        styles
            .set_style("h1", StyleDef::new().size(Pt(16.0)).inherits("h"))
            .unwrap();
        styles
    }

    #[test]
    fn unset_attributes_come_from_the_parent_chain() {
        let styles = registry();
        let h1 = styles.resolve("h1").unwrap();
        assert_eq!(h1.size, Pt(16.0));
        assert_eq!(h1.colour, Colour::new_rgb_bytes(203, 0, 48));
        assert!(h1.font_style.bold);
        assert_eq!(h1.family, "helvetica");

        let title = styles.resolve("TITLE").unwrap();
        assert_eq!(title.colour, Colour::new_rgb_bytes(102, 0, 0));
        assert!(title.font_style.bold);
    }

    #[test]
    fn resolving_is_idempotent() {
        let styles = registry();
        assert_eq!(styles.resolve("title").unwrap(), styles.resolve("title").unwrap());
    }

    #[test]
    fn dropping_an_override_exposes_the_parent_value() {
        let mut styles = registry();
        assert_eq!(styles.resolve("title").unwrap().colour, Colour::new_rgb_bytes(102, 0, 0));

        styles
            .set_style("title", StyleDef::new().size(Pt(14.0)).inherits("h"))
            .unwrap();
        assert_eq!(styles.resolve("title").unwrap().colour, Colour::new_rgb_bytes(203, 0, 48));
    }

    #[test]
    fn unknown_styles_and_parents_fail() {
        let mut styles = registry();
        assert!(matches!(styles.resolve("nope"), Err(Error::UnknownStyle { name }) if name == "nope"));

        styles
            .set_style("orphan", StyleDef::new().inherits("missing"))
            .unwrap();
        assert!(matches!(
            styles.resolve("orphan"),
            Err(Error::UnknownStyle { name }) if name == "missing"
        ));
    }

    #[test]
    fn cycles_are_rejected_on_registration() {
        let mut styles = registry();
        assert!(matches!(
            styles.set_style("h", StyleDef::new().inherits("title")),
            Err(Error::StyleCycle { .. })
        ));
        assert!(matches!(
            styles.set_style("loop", StyleDef::new().inherits("loop")),
            Err(Error::StyleCycle { .. })
        ));
        // the rejected definition did not replace the old one
        assert!(styles.resolve("h").unwrap().font_style.bold);
    }

    #[test]
    fn default_style_ignores_a_parent() {
        let mut styles = registry();
        styles
            .set_style("default", StyleDef::new().size(Pt(9.0)).inherits("h1"))
            .unwrap();
        let resolved = styles.resolve("default").unwrap();
        assert_eq!(resolved.size, Pt(9.0));
        assert!(!resolved.font_style.bold);
    }

    #[test]
    fn builtin_values_fill_an_empty_default() {
        let styles = StyleRegistry::new();
        assert_eq!(styles.resolve("default").unwrap(), ResolvedStyle::default());
    }

    #[test]
    fn nested_styles_compose() {
        let styles = registry();
        let outer = styles.resolve("h1").unwrap();
        let italic = StyleOverride::default().with_font_style(FontStyle::ITALIC);
        let nested = outer.apply(&italic);
        assert!(nested.font_style.bold && nested.font_style.italic);
        assert_eq!(nested.size, Pt(16.0));
        assert_eq!(nested.colour, outer.colour);

        // tag overrides skip the default style so sizes of the outer text survive
        let b = styles.tag_override("b").unwrap();
        assert_eq!(b.size, None);
        assert_eq!(outer.apply(&b).size, Pt(16.0));
    }

    #[test]
    fn font_style_codes() {
        assert_eq!("BI".parse::<FontStyle>().unwrap(), FontStyle::BOLD.union(FontStyle::ITALIC));
        assert_eq!("".parse::<FontStyle>().unwrap(), FontStyle::REGULAR);
        assert!("u".parse::<FontStyle>().unwrap().underline);
        assert!("X".parse::<FontStyle>().is_err());
    }
}
