//! Turns page contents into content stream operators.

use crate::canvas::Stroke;
use crate::colour::Colour;
use crate::font::Font;
use crate::page::{ImagePlacement, LineShape, PageContents, RectShape, TextRun};
use id_arena::Arena;
use std::io::Write;

#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    let mut content: Vec<u8> = Vec::default();

    for item in contents.iter() {
        match item {
            PageContents::Text(run) => render_text(&mut content, run, fonts)?,
            PageContents::Rect(rect) => render_rect(&mut content, rect)?,
            PageContents::Line(line) => render_line(&mut content, line)?,
            PageContents::Image(image) => render_image(&mut content, image)?,
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_text(
    content: &mut Vec<u8>,
    run: &TextRun,
    fonts: &Arena<Font>,
) -> Result<(), std::io::Error> {
    let Some(font) = fonts.get(run.font) else {
        log::warn!("dropping text run with an unknown font: {:?}", run.text);
        return Ok(());
    };

    write!(content, "q\n")?;
    write!(content, "/F{} {} Tf\n", run.font.index(), run.size)?;
    write_colour(content, run.colour, false)?;
    write!(content, "BT\n")?;
    write!(content, "{} {} Td\n", run.origin.0, run.origin.1)?;
    write!(content, "<")?;
    for ch in run.text.chars() {
        write!(content, "{:04x}", font.glyph_id_or_replacement(ch))?;
    }
    write!(content, "> Tj\n")?;
    write!(content, "ET\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_rect(content: &mut Vec<u8>, rect: &RectShape) -> Result<(), std::io::Error> {
    let op = match (rect.fill, rect.stroke) {
        (Some(_), Some(_)) => "B",
        (Some(_), None) => "f",
        (None, Some(_)) => "S",
        (None, None) => return Ok(()),
    };

    write!(content, "q\n")?;
    if let Some(fill) = rect.fill {
        write_colour(content, fill, false)?;
    }
    if let Some(stroke) = rect.stroke {
        write_stroke(content, &stroke)?;
    }
    write!(
        content,
        "{} {} {} {} re\n",
        rect.x, rect.y, rect.width, rect.height
    )?;
    write!(content, "{op}\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_line(content: &mut Vec<u8>, line: &LineShape) -> Result<(), std::io::Error> {
    write!(content, "q\n")?;
    write_stroke(content, &line.stroke)?;
    write!(content, "{} {} m\n", line.from.0, line.from.1)?;
    write!(content, "{} {} l\n", line.to.0, line.to.1)?;
    write!(content, "S\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_image(content: &mut Vec<u8>, image: &ImagePlacement) -> Result<(), std::io::Error> {
    write!(content, "q\n")?;
    write!(
        content,
        "{} 0 0 {} {} {} cm\n",
        image.width, image.height, image.x, image.y
    )?;
    write!(content, "/I{} Do\n", image.image.index())?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_stroke(content: &mut Vec<u8>, stroke: &Stroke) -> Result<(), std::io::Error> {
    write!(content, "{} w\n", stroke.width)?;
    write_colour(content, stroke.colour, true)
}

/// Set the fill colour, or the stroking colour when `stroking` is set
#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour, stroking: bool) -> Result<(), std::io::Error> {
    match colour {
        Colour::RGB { r, g, b } => {
            let op = if stroking { "RG" } else { "rg" };
            write!(content, "{r} {g} {b} {op}\n")
        }
        Colour::Grey { g } => {
            let op = if stroking { "G" } else { "g" };
            write!(content, "{g} {op}\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::image::Image;
    use crate::units::Pt;

    fn render(item: PageContents) -> String {
        let fonts = Arena::new();
        String::from_utf8(render_contents(&[item], &fonts).unwrap()).unwrap()
    }

    #[test]
    fn filled_and_stroked_rects() {
        let out = render(PageContents::Rect(RectShape {
            x: Pt(10.0),
            y: Pt(20.0),
            width: Pt(30.0),
            height: Pt(5.5),
            fill: Some(colours::RED),
            stroke: Some(Stroke::default()),
        }));
        assert_eq!(out, "q\n1 0 0 rg\n0.5 w\n0 G\n10 20 30 5.5 re\nB\nQ\n");

        let out = render(PageContents::Rect(RectShape {
            x: Pt(0.0),
            y: Pt(0.0),
            width: Pt(1.0),
            height: Pt(1.0),
            fill: None,
            stroke: None,
        }));
        assert!(out.is_empty());
    }

    #[test]
    fn lines_and_images() {
        let out = render(PageContents::Line(LineShape {
            from: (Pt(1.0), Pt(2.0)),
            to: (Pt(3.0), Pt(2.0)),
            stroke: Stroke {
                width: Pt(1.0),
                colour: Colour::new_grey(0.5),
            },
        }));
        assert_eq!(out, "q\n1 w\n0.5 G\n1 2 m\n3 2 l\nS\nQ\n");

        let mut images: Arena<Image> = Arena::new();
        let id = images.alloc(Image::from_image(image::DynamicImage::new_rgb8(1, 1)));
        let out = render(PageContents::Image(ImagePlacement {
            image: id,
            x: Pt(5.0),
            y: Pt(6.0),
            width: Pt(40.0),
            height: Pt(20.0),
        }));
        assert_eq!(out, "q\n40 0 0 20 5 6 cm\n/I0 Do\nQ\n");
    }
}
