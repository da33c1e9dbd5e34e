//! OOXML package assembly.
//!
//! DOCX files are ZIP archives. This module lays out the minimal set of parts Word
//! requires: content types, the package relationships, the document part and, when a
//! figure is present, the document relationships and the media entry.

use crate::document::SynopsisDocument;
use crate::{xml, DocxError};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package path of the embedded chart image.
pub(crate) const MEDIA_ENTRY: &str = "word/media/chart.png";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>
"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#;

const DOCUMENT_RELS_EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
</Relationships>
"#;

/// Assemble the complete package and return its bytes.
pub(crate) fn write_package(doc: &SynopsisDocument) -> Result<Vec<u8>, DocxError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let document_xml = xml::document_xml(doc)?;

    write_entry(&mut zip, options, "[Content_Types].xml", CONTENT_TYPES.as_bytes())?;
    write_entry(&mut zip, options, "_rels/.rels", ROOT_RELS.as_bytes())?;
    write_entry(&mut zip, options, "word/document.xml", &document_xml)?;

    match &doc.figure {
        Some(figure) => {
            let rels = document_rels_with_image();
            write_entry(&mut zip, options, "word/_rels/document.xml.rels", rels.as_bytes())?;
            write_entry(&mut zip, options, MEDIA_ENTRY, &figure.png)?;
        }
        None => {
            write_entry(
                &mut zip,
                options,
                "word/_rels/document.xml.rels",
                DOCUMENT_RELS_EMPTY.as_bytes(),
            )?;
        }
    }

    let cursor = zip.finish().map_err(DocxError::Finish)?;
    Ok(cursor.into_inner())
}

fn write_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    name: &'static str,
    bytes: &[u8],
) -> Result<(), DocxError> {
    zip.start_file(name, options)
        .map_err(|source| DocxError::Package { name, source })?;
    zip.write_all(bytes)
        .map_err(|source| DocxError::Io { name, source })?;
    Ok(())
}

fn document_rels_with_image() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/chart.png"/>
</Relationships>
"#,
        xml::IMAGE_REL_ID
    )
}
