use crate::canvas::FontMetrics;
use crate::error::Result;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use owned_ttf_parser::{AsFaceRef, Face, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};

/// A parsed TrueType / OpenType font. Fonts are embedded in their entirety in
/// the generated PDF, so large fonts dramatically increase the output size.
///
/// Text is encoded as raw glyph ids (`Identity-H`), with a `ToUnicode` map so
/// that the text in the PDF stays searchable and copyable.
pub struct Font {
    pub face: OwnedFace,
}

/// Advance and height of every glyph reachable from a unicode code point,
/// keyed by glyph id
struct GlyphTable {
    glyphs: BTreeMap<u16, Glyph>,
}

#[derive(Clone, Copy)]
struct Glyph {
    ch: char,
    advance: u16,
    height: i16,
}

impl Font {
    /// Load a font from raw bytes, returning an error if it could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font { face })
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn name_entry(&self, name_id: u16) -> Option<String> {
        self.face()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Full name of the font, if the font carries one
    pub fn name(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FULL_NAME)
    }

    /// Family name of the font, if the font carries one
    pub fn family(&self) -> Option<String> {
        self.name_entry(owned_ttf_parser::name_id::FAMILY)
    }

    pub fn is_bold(&self) -> bool {
        self.face().is_bold() || self.weight() >= 600
    }

    pub fn is_italic(&self) -> bool {
        self.face().is_italic() || self.face().is_oblique()
    }

    /// Obtain the weight of the font, from 100 (thin) through 400 (normal) and
    /// 700 (bold) to 900 (black)
    pub fn weight(&self) -> u16 {
        self.face().weight().to_number()
    }

    fn scaling(&self, size: Pt) -> Pt {
        size / self.face().units_per_em() as f32
    }

    /// Distance from the baseline to the top of the font at `size`
    pub fn ascent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face().ascender() as f32
    }

    /// Distance from the baseline to the bottom of the font at `size`. Usually negative
    pub fn descent(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face().descender() as f32
    }

    /// Extra space the font asks for between lines at `size`
    pub fn leading(&self, size: Pt) -> Pt {
        self.scaling(size) * self.face().line_gap() as f32
    }

    pub fn metrics(&self, size: Pt) -> FontMetrics {
        FontMetrics {
            ascent: self.ascent(size),
            descent: self.descent(size),
        }
    }

    /// Advance width of `text` at `size`. Characters without a glyph are drawn
    /// with the replacement glyph, and measured as such.
    pub fn width_of_text(&self, text: &str, size: Pt) -> Pt {
        let scaling = self.scaling(size);
        text.chars()
            .map(|ch| self.glyph_id_or_replacement(ch))
            .map(|gid| {
                scaling
                    * self
                        .face()
                        .glyph_hor_advance(GlyphId(gid))
                        .unwrap_or_default() as f32
            })
            .sum()
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.glyph_id('\u{FFFD}')
    }

    /// The glyph drawn for `ch`: its own, the replacement glyph, or `.notdef`
    pub fn glyph_id_or_replacement(&self, ch: char) -> u16 {
        self.glyph_id(ch)
            .or_else(|| self.replacement_glyph_id())
            .unwrap_or(0)
    }

    fn glyph_table(&self) -> GlyphTable {
        let face = self.face();
        let mut glyphs = BTreeMap::new();

        let Some(cmap) = face.tables().cmap else {
            return GlyphTable { glyphs };
        };

        for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
            subtable.codepoints(|codepoint| {
                let Ok(ch) = char::try_from(codepoint) else {
                    return;
                };
                let Some(gid) = subtable.glyph_index(codepoint).filter(|gid| gid.0 > 0) else {
                    return;
                };
                if glyphs.contains_key(&gid.0) {
                    return;
                }
                let Some(advance) = face.glyph_hor_advance(gid) else {
                    return;
                };
                let height = face
                    .glyph_bounding_box(gid)
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                glyphs.insert(gid.0, Glyph { ch, advance, height });
            });
        }

        GlyphTable { glyphs }
    }

    /// Write the font as a Type0 font with an embedded CID font program.
    pub(crate) fn write(&self, refs: &mut ObjectReferences, index: usize, writer: &mut Pdf) {
        let table = self.glyph_table();
        let base_font = format!("F{index}");

        let descriptor_id = self.write_descriptor(refs, index, &table, writer);
        let cid_font_id = self.write_cid(refs, index, &base_font, descriptor_id, &table, writer);
        let to_unicode_id = self.write_to_unicode(refs, index, &table, writer);

        let mut font = writer.type0_font(refs.alloc(RefType::Font(index)));
        font.base_font(Name(base_font.as_bytes()));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);
    }

    fn write_cid(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        base_font: &str,
        descriptor_id: Ref,
        table: &GlyphTable,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.alloc(RefType::CidFont(index));
        let scaling = 1000.0 / self.face().units_per_em() as f32;

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(base_font.as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(descriptor_id);

        // the most common advance makes the smallest default width
        let mut counts: HashMap<u16, usize> = HashMap::new();
        for glyph in table.glyphs.values() {
            *counts.entry(glyph.advance).or_insert(0) += 1;
        }
        let default_width = counts
            .iter()
            .max_by_key(|(advance, count)| (**count, **advance))
            .map(|(advance, _)| *advance as f32 * scaling)
            .unwrap_or(1000.0);

        // runs of consecutive glyph ids share one `[w1 w2 ...]` entry
        let mut widths = cid_font.widths();
        let mut run: Option<(u16, Vec<f32>)> = None;
        for (&gid, glyph) in table.glyphs.iter() {
            let width = glyph.advance as f32 * scaling;
            let extends = matches!(&run, Some((start, ws)) if *start as usize + ws.len() == gid as usize);
            if extends {
                if let Some((_, ws)) = run.as_mut() {
                    ws.push(width);
                }
            } else if let Some((start, ws)) = run.replace((gid, vec![width])) {
                widths.consecutive(start, ws);
            }
        }
        if let Some((start, run_widths)) = run {
            widths.consecutive(start, run_widths);
        }
        widths.finish();

        cid_font.default_width(default_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        id
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        table: &GlyphTable,
        writer: &mut Pdf,
    ) -> Ref {
        let face = self.face();
        let scaling = 1000.0 / face.units_per_em() as f32;

        let font_data_id = refs.alloc(RefType::FontData(index));
        writer
            .stream(font_data_id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let max_width = table.glyphs.values().map(|g| g.advance).max().unwrap_or_default();
        let max_height = table.glyphs.values().map(|g| g.height).max().unwrap_or_default();
        let avg_width = if table.glyphs.is_empty() {
            0.0
        } else {
            table.glyphs.values().map(|g| g.advance as f32).sum::<f32>()
                / table.glyphs.len() as f32
        };

        let name = self.name().unwrap_or_else(|| format!("F{index}"));
        let family = self.family().unwrap_or_else(|| name.clone());

        let id = refs.alloc(RefType::FontDescriptor(index));
        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.as_bytes()));
        descriptor.family(Str(family.as_bytes()));
        descriptor.weight(self.weight());

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.insert(FontFlags::FIXED_PITCH);
        }
        if self.is_italic() {
            flags.insert(FontFlags::ITALIC);
        }
        descriptor.flags(flags);

        let global = face.global_bounding_box();
        descriptor.bbox(pdf_writer::Rect {
            x1: global.x_min as f32 * scaling,
            y1: global.y_min as f32 * scaling,
            x2: global.x_max as f32 * scaling,
            y2: (global.y_max.max(max_height)) as f32 * scaling,
        });
        descriptor.italic_angle(if self.is_italic() { -12.0 } else { 0.0 });
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        let cap_height = face
            .capital_height()
            .map(|h| h as f32 * scaling)
            .unwrap_or(face.ascender() as f32 * scaling);
        descriptor.cap_height(cap_height);
        descriptor.x_height(
            face.x_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(cap_height),
        );
        // not recorded in TrueType fonts; 80 is what most writers fall back to
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);
        descriptor.font_file2(font_data_id);

        id
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        table: &GlyphTable,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.alloc(RefType::ToUnicode(index));
        let cmap = to_unicode_cmap(table.glyphs.iter().map(|(gid, glyph)| (*gid, glyph.ch)));

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            cmap.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultLevel as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        id
    }
}

/// Build a `ToUnicode` CMap. `bfchar` blocks hold at most 100 entries and
/// never cross a change of high byte.
fn to_unicode_cmap<I: IntoIterator<Item = (u16, char)>>(glyphs: I) -> String {
    let mut map = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo\n\
         << /Registry (Adobe)\n\
         /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let mut blocks: Vec<Vec<(u16, char)>> = Vec::new();
    for (gid, ch) in glyphs {
        match blocks.last_mut() {
            Some(block)
                if block.len() < 100 && block.first().map(|(g, _)| g >> 8) == Some(gid >> 8) =>
            {
                block.push((gid, ch))
            }
            _ => blocks.push(vec![(gid, ch)]),
        }
    }

    for block in blocks {
        map.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, ch) in block {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04x}"))
                .collect();
            map.push_str(&format!("<{gid:04x}> <{hex}>\n"));
        }
        map.push_str("endbfchar\n");
    }

    map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmap_blocks_split_on_high_byte_and_size() {
        let glyphs = (1u16..=150)
            .map(|gid| (gid, 'a'))
            .chain([(0x0101, '\u{1F600}')]);
        let cmap = to_unicode_cmap(glyphs);

        assert!(cmap.contains("100 beginbfchar\n<0001> <0061>\n"));
        assert!(cmap.contains("50 beginbfchar\n<0065> <0061>\n"));
        // characters outside the BMP are written as surrogate pairs
        assert!(cmap.contains("1 beginbfchar\n<0101> <d83dde00>\n"));
        assert!(cmap.ends_with("end end\n"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(matches!(
            Font::load(b"definitely not a font".to_vec()),
            Err(crate::error::Error::FaceParsing(_))
        ));
    }
}
