use crate::cancel::CancelToken;
use crate::error::ExtractError;
use crate::extractors::ContainerExtractor;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild};
use std::io::{Cursor, Read};

const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const OLE_SIGNATURE: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

// Word binary file format, FIB offsets and flags.
const FIB_MAGIC: u16 = 0xa5ec;
const FIB_FLAGS_OFFSET: usize = 0x0a;
const FIB_FC_MIN_OFFSET: usize = 0x18;
const FIB_FC_MAC_OFFSET: usize = 0x1c;
const FLAG_COMPLEX: u16 = 0x0004;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_EXTENDED_CHARSET: u16 = 0x1000;

#[derive(Debug, Default)]
pub struct WordExtractor;

impl ContainerExtractor for WordExtractor {
    fn extract(&self, bytes: &[u8], cancel: &CancelToken) -> Result<String, ExtractError> {
        cancel.bail_if_cancelled()?;

        if bytes.starts_with(&ZIP_SIGNATURE) {
            extract_docx_body(bytes)
        } else if bytes.starts_with(&OLE_SIGNATURE) {
            extract_legacy_doc(bytes)
        } else {
            Err(ExtractError::UnsupportedContainer(
                "word document is neither an OOXML archive nor an OLE compound file".to_string(),
            ))
        }
    }
}

fn extract_docx_body(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|error| ExtractError::MalformedContainer(format!("docx: {error}")))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => collect_table_text(table, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

fn collect_table_text(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
                    TableCellContent::Table(nested) => collect_table_text(nested, lines),
                    _ => {}
                }
            }
        }
    }
}

fn extract_legacy_doc(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut compound = cfb::CompoundFile::open(Cursor::new(bytes))
        .map_err(|error| ExtractError::MalformedContainer(format!("ole container: {error}")))?;

    let mut stream = compound.open_stream("WordDocument").map_err(|error| {
        ExtractError::MalformedContainer(format!("missing WordDocument stream: {error}"))
    })?;
    let mut word_stream = Vec::new();
    stream
        .read_to_end(&mut word_stream)
        .map_err(|error| ExtractError::MalformedContainer(format!("ole stream: {error}")))?;

    if word_stream.len() < FIB_FC_MAC_OFFSET + 4 {
        return Err(ExtractError::MalformedContainer(
            "WordDocument stream is shorter than the file information block".to_string(),
        ));
    }

    let magic = u16::from_le_bytes([word_stream[0], word_stream[1]]);
    if magic != FIB_MAGIC {
        return Err(ExtractError::MalformedContainer(
            "WordDocument stream has no valid file information block".to_string(),
        ));
    }

    let flags = u16::from_le_bytes([
        word_stream[FIB_FLAGS_OFFSET],
        word_stream[FIB_FLAGS_OFFSET + 1],
    ]);
    if flags & FLAG_ENCRYPTED != 0 {
        return Err(ExtractError::MalformedContainer(
            "legacy document is encrypted".to_string(),
        ));
    }
    // Piece-table documents store text non-contiguously; no partial recovery.
    if flags & FLAG_COMPLEX != 0 {
        return Err(ExtractError::MalformedContainer(
            "legacy document uses an unsupported complex layout".to_string(),
        ));
    }

    let fc_min = read_u32(&word_stream, FIB_FC_MIN_OFFSET) as usize;
    let fc_mac = read_u32(&word_stream, FIB_FC_MAC_OFFSET) as usize;
    if fc_min > fc_mac || fc_mac > word_stream.len() {
        return Err(ExtractError::MalformedContainer(
            "legacy document text range is out of bounds".to_string(),
        ));
    }

    let raw = &word_stream[fc_min..fc_mac];
    let text = if flags & FLAG_EXTENDED_CHARSET != 0 {
        decode_utf16_le(raw)?
    } else {
        encoding_rs::WINDOWS_1252.decode(raw).0.into_owned()
    };

    // Word's paragraph marks, cell marks, and soft line breaks become plain
    // newlines so the normalizer does not glue adjacent words together.
    let text: String = text
        .chars()
        .map(|c| match c {
            '\r' | '\u{7}' | '\u{b}' => '\n',
            other => other,
        })
        .collect();

    Ok(text.trim().to_string())
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn decode_utf16_le(raw: &[u8]) -> Result<String, ExtractError> {
    if raw.len() % 2 != 0 {
        return Err(ExtractError::MalformedContainer(
            "legacy document utf-16 text range has odd length".to_string(),
        ));
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};
    use std::io::Write;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for paragraph in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*paragraph)));
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build()
            .pack(&mut cursor)
            .expect("docx should serialize");
        cursor.into_inner()
    }

    fn legacy_doc_bytes(flags: u16, text_bytes: &[u8]) -> Vec<u8> {
        let mut stream = vec![0u8; 512];
        stream[0..2].copy_from_slice(&FIB_MAGIC.to_le_bytes());
        stream[FIB_FLAGS_OFFSET..FIB_FLAGS_OFFSET + 2].copy_from_slice(&flags.to_le_bytes());
        let fc_min = stream.len() as u32;
        let fc_mac = fc_min + text_bytes.len() as u32;
        stream[FIB_FC_MIN_OFFSET..FIB_FC_MIN_OFFSET + 4].copy_from_slice(&fc_min.to_le_bytes());
        stream[FIB_FC_MAC_OFFSET..FIB_FC_MAC_OFFSET + 4].copy_from_slice(&fc_mac.to_le_bytes());
        stream.extend_from_slice(text_bytes);

        let mut compound =
            cfb::CompoundFile::create(Cursor::new(Vec::new())).expect("compound file");
        {
            let mut word_stream = compound
                .create_stream("WordDocument")
                .expect("WordDocument stream");
            word_stream.write_all(&stream).expect("stream write");
        }
        compound.into_inner().into_inner()
    }

    #[test]
    fn docx_body_paragraphs_are_extracted_in_order() {
        let bytes = docx_bytes(&["First paragraph", "Second paragraph"]);
        let text = WordExtractor.extract(&bytes, &CancelToken::new()).unwrap();
        assert_eq!(text, "First paragraph\nSecond paragraph");
    }

    #[test]
    fn docx_with_no_text_extracts_to_empty_string() {
        let bytes = docx_bytes(&[]);
        let text = WordExtractor.extract(&bytes, &CancelToken::new()).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn corrupt_zip_is_malformed() {
        let mut bytes = ZIP_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"this is not a real archive");
        let error = WordExtractor
            .extract(&bytes, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(error, ExtractError::MalformedContainer(_)));
    }

    #[test]
    fn unrecognized_signature_is_unsupported() {
        let error = WordExtractor
            .extract(b"neither zip nor ole", &CancelToken::new())
            .unwrap_err();
        assert!(matches!(error, ExtractError::UnsupportedContainer(_)));
    }

    #[test]
    fn legacy_doc_text_range_is_decoded_as_windows_1252() {
        let bytes = legacy_doc_bytes(0, b"Legacy body text.\rNext paragraph.");
        let text = WordExtractor.extract(&bytes, &CancelToken::new()).unwrap();
        assert_eq!(text, "Legacy body text.\nNext paragraph.");
    }

    #[test]
    fn legacy_doc_extended_charset_is_decoded_as_utf16() {
        let wide: Vec<u8> = "Wide text."
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        let bytes = legacy_doc_bytes(FLAG_EXTENDED_CHARSET, &wide);
        let text = WordExtractor.extract(&bytes, &CancelToken::new()).unwrap();
        assert_eq!(text, "Wide text.");
    }

    #[test]
    fn encrypted_legacy_doc_is_malformed() {
        let bytes = legacy_doc_bytes(FLAG_ENCRYPTED, b"secret");
        let error = WordExtractor
            .extract(&bytes, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(error, ExtractError::MalformedContainer(_)));
    }

    #[test]
    fn ole_file_without_word_stream_is_malformed() {
        let compound = cfb::CompoundFile::create(Cursor::new(Vec::new())).expect("compound file");
        let bytes = compound.into_inner().into_inner();
        let error = WordExtractor
            .extract(&bytes, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(error, ExtractError::MalformedContainer(_)));
    }
}
