//! WordprocessingML document part writer.
//!
//! Emits `word/document.xml` event-by-event with `quick-xml`, so every piece of user
//! text passes through the library's escaping. The structure is kept deliberately small:
//! paragraphs, runs, text, an optional page break and one inline drawing.

use crate::document::SynopsisDocument;
use crate::DocxError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Relationship id used for the embedded chart image.
pub(crate) const IMAGE_REL_ID: &str = "rId1";

/// Display size of the embedded figure in EMUs (600 x 400 px at 96 dpi).
const FIGURE_CX_EMU: u64 = 5_715_000;
const FIGURE_CY_EMU: u64 = 3_810_000;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Paragraph styling applied to a single text paragraph.
#[derive(Clone, Copy)]
struct ParaStyle {
    bold: bool,
    centred: bool,
    justified: bool,
    /// Half-point font size override (`w:sz`), if any.
    half_points: Option<u32>,
}

impl ParaStyle {
    const TITLE: Self = Self {
        bold: true,
        centred: true,
        justified: false,
        half_points: Some(32),
    };
    const SUBTITLE: Self = Self {
        bold: false,
        centred: true,
        justified: false,
        half_points: None,
    };
    const HEADING: Self = Self {
        bold: true,
        centred: false,
        justified: false,
        half_points: Some(26),
    };
    const BODY: Self = Self {
        bold: false,
        centred: false,
        justified: true,
        half_points: None,
    };
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Write one event, folding the writer's error into [`DocxError::Xml`].
fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), DocxError> {
    writer
        .write_event(event)
        .map_err(|e| DocxError::Xml(e.to_string()))
}

/// Render the complete `word/document.xml` part.
pub(crate) fn document_xml(doc: &SynopsisDocument) -> Result<Vec<u8>, DocxError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", NS_W));
    root.push_attribute(("xmlns:r", NS_R));
    root.push_attribute(("xmlns:wp", NS_WP));
    root.push_attribute(("xmlns:a", NS_A));
    root.push_attribute(("xmlns:pic", NS_PIC));
    emit(&mut writer, Event::Start(root))?;
    emit(&mut writer, Event::Start(BytesStart::new("w:body")))?;

    write_paragraph(&mut writer, doc.title.as_str(), ParaStyle::TITLE)?;
    for line in &doc.subtitle_lines {
        write_paragraph(&mut writer, line, ParaStyle::SUBTITLE)?;
    }

    for section in &doc.sections {
        write_paragraph(&mut writer, section.heading.as_str(), ParaStyle::HEADING)?;
        // Blank-line-separated blocks become separate justified paragraphs.
        for block in section.body.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }
            write_paragraph(&mut writer, block, ParaStyle::BODY)?;
        }
    }

    if let Some(figure) = &doc.figure {
        write_page_break(&mut writer)?;
        write_figure(&mut writer)?;
        if let Some(caption) = &figure.caption {
            write_paragraph(&mut writer, caption, ParaStyle::SUBTITLE)?;
        }
    }

    // A4 page geometry for the single section of the document.
    emit(&mut writer, Event::Start(BytesStart::new("w:sectPr")))?;
    let mut pg_sz = BytesStart::new("w:pgSz");
    pg_sz.push_attribute(("w:w", "11906"));
    pg_sz.push_attribute(("w:h", "16838"));
    emit(&mut writer, Event::Empty(pg_sz))?;
    emit(&mut writer, Event::End(BytesEnd::new("w:sectPr")))?;

    emit(&mut writer, Event::End(BytesEnd::new("w:body")))?;
    emit(&mut writer, Event::End(BytesEnd::new("w:document")))?;

    Ok(writer.into_inner().into_inner())
}

/// Write one paragraph containing the given text.
///
/// Line breaks inside `text` become `w:br` elements within the paragraph rather than new
/// paragraphs, preserving the author's line structure.
fn write_paragraph(writer: &mut XmlWriter, text: &str, style: ParaStyle) -> Result<(), DocxError> {
    emit(writer, Event::Start(BytesStart::new("w:p")))?;

    if style.centred || style.justified {
        emit(writer, Event::Start(BytesStart::new("w:pPr")))?;
        let mut jc = BytesStart::new("w:jc");
        jc.push_attribute(("w:val", if style.centred { "center" } else { "both" }));
        emit(writer, Event::Empty(jc))?;
        emit(writer, Event::End(BytesEnd::new("w:pPr")))?;
    }

    for (i, line) in text.lines().enumerate() {
        emit(writer, Event::Start(BytesStart::new("w:r")))?;
        if style.bold || style.half_points.is_some() {
            emit(writer, Event::Start(BytesStart::new("w:rPr")))?;
            if style.bold {
                emit(writer, Event::Empty(BytesStart::new("w:b")))?;
            }
            if let Some(sz) = style.half_points {
                let mut size = BytesStart::new("w:sz");
                size.push_attribute(("w:val", sz.to_string().as_str()));
                emit(writer, Event::Empty(size))?;
            }
            emit(writer, Event::End(BytesEnd::new("w:rPr")))?;
        }
        if i > 0 {
            emit(writer, Event::Empty(BytesStart::new("w:br")))?;
        }
        let mut text_start = BytesStart::new("w:t");
        text_start.push_attribute(("xml:space", "preserve"));
        emit(writer, Event::Start(text_start))?;
        emit(writer, Event::Text(BytesText::new(line)))?;
        emit(writer, Event::End(BytesEnd::new("w:t")))?;
        emit(writer, Event::End(BytesEnd::new("w:r")))?;
    }

    emit(writer, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// Write an empty paragraph whose run forces a page break.
fn write_page_break(writer: &mut XmlWriter) -> Result<(), DocxError> {
    emit(writer, Event::Start(BytesStart::new("w:p")))?;
    emit(writer, Event::Start(BytesStart::new("w:r")))?;
    let mut br = BytesStart::new("w:br");
    br.push_attribute(("w:type", "page"));
    emit(writer, Event::Empty(br))?;
    emit(writer, Event::End(BytesEnd::new("w:r")))?;
    emit(writer, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

/// Write the inline drawing referencing the packaged chart image.
fn write_figure(writer: &mut XmlWriter) -> Result<(), DocxError> {
    emit(writer, Event::Start(BytesStart::new("w:p")))?;
    emit(writer, Event::Start(BytesStart::new("w:r")))?;
    emit(writer, Event::Start(BytesStart::new("w:drawing")))?;

    let mut inline = BytesStart::new("wp:inline");
    for side in ["distT", "distB", "distL", "distR"] {
        inline.push_attribute((side, "0"));
    }
    emit(writer, Event::Start(inline))?;

    let cx = FIGURE_CX_EMU.to_string();
    let cy = FIGURE_CY_EMU.to_string();

    let mut extent = BytesStart::new("wp:extent");
    extent.push_attribute(("cx", cx.as_str()));
    extent.push_attribute(("cy", cy.as_str()));
    emit(writer, Event::Empty(extent))?;

    let mut doc_pr = BytesStart::new("wp:docPr");
    doc_pr.push_attribute(("id", "1"));
    doc_pr.push_attribute(("name", "Pharmacokinetic profile"));
    emit(writer, Event::Empty(doc_pr))?;

    let mut graphic = BytesStart::new("a:graphic");
    graphic.push_attribute(("xmlns:a", NS_A));
    emit(writer, Event::Start(graphic))?;

    let mut graphic_data = BytesStart::new("a:graphicData");
    graphic_data.push_attribute(("uri", NS_PIC));
    emit(writer, Event::Start(graphic_data))?;

    let mut pic = BytesStart::new("pic:pic");
    pic.push_attribute(("xmlns:pic", NS_PIC));
    emit(writer, Event::Start(pic))?;

    emit(writer, Event::Start(BytesStart::new("pic:nvPicPr")))?;
    let mut c_nv_pr = BytesStart::new("pic:cNvPr");
    c_nv_pr.push_attribute(("id", "1"));
    c_nv_pr.push_attribute(("name", "chart.png"));
    emit(writer, Event::Empty(c_nv_pr))?;
    emit(writer, Event::Empty(BytesStart::new("pic:cNvPicPr")))?;
    emit(writer, Event::End(BytesEnd::new("pic:nvPicPr")))?;

    emit(writer, Event::Start(BytesStart::new("pic:blipFill")))?;
    let mut blip = BytesStart::new("a:blip");
    blip.push_attribute(("r:embed", IMAGE_REL_ID));
    emit(writer, Event::Empty(blip))?;
    emit(writer, Event::Start(BytesStart::new("a:stretch")))?;
    emit(writer, Event::Empty(BytesStart::new("a:fillRect")))?;
    emit(writer, Event::End(BytesEnd::new("a:stretch")))?;
    emit(writer, Event::End(BytesEnd::new("pic:blipFill")))?;

    emit(writer, Event::Start(BytesStart::new("pic:spPr")))?;
    emit(writer, Event::Start(BytesStart::new("a:xfrm")))?;
    let mut off = BytesStart::new("a:off");
    off.push_attribute(("x", "0"));
    off.push_attribute(("y", "0"));
    emit(writer, Event::Empty(off))?;
    let mut ext = BytesStart::new("a:ext");
    ext.push_attribute(("cx", cx.as_str()));
    ext.push_attribute(("cy", cy.as_str()));
    emit(writer, Event::Empty(ext))?;
    emit(writer, Event::End(BytesEnd::new("a:xfrm")))?;
    let mut geom = BytesStart::new("a:prstGeom");
    geom.push_attribute(("prst", "rect"));
    emit(writer, Event::Start(geom))?;
    emit(writer, Event::Empty(BytesStart::new("a:avLst")))?;
    emit(writer, Event::End(BytesEnd::new("a:prstGeom")))?;
    emit(writer, Event::End(BytesEnd::new("pic:spPr")))?;

    emit(writer, Event::End(BytesEnd::new("pic:pic")))?;
    emit(writer, Event::End(BytesEnd::new("a:graphicData")))?;
    emit(writer, Event::End(BytesEnd::new("a:graphic")))?;
    emit(writer, Event::End(BytesEnd::new("wp:inline")))?;
    emit(writer, Event::End(BytesEnd::new("w:drawing")))?;
    emit(writer, Event::End(BytesEnd::new("w:r")))?;
    emit(writer, Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}
