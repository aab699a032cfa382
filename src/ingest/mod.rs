//! CSV ingestion: bytes in, `Frame` out.
//!
//! Headers are trimmed and resolved through the configured alias table so the
//! joiner and the validator only ever see canonical column names. Cells are
//! typed with `Cell::parse`; no schema is enforced here.
use crate::config::{CoreConfig, InputEncoding};
use crate::error::{CoreError, Result, Side};
use crate::store::{Cell, Frame};
use std::io::Read;
use std::path::Path;

/// Code points for bytes 0x80..=0x9F in windows-1252. The five bytes the
/// code page leaves undefined keep their own value, as WHATWG decoders do.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decodes "latin1" text the way spreadsheet exports mean it: windows-1252,
/// which agrees with ISO-8859-1 outside 0x80..=0x9F and puts `€` at 0x80.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => char::from(b),
        })
        .collect()
}

fn decode(bytes: Vec<u8>, encoding: InputEncoding) -> Result<String> {
    match encoding {
        InputEncoding::Latin1 => Ok(decode_latin1(&bytes)),
        InputEncoding::Utf8 => String::from_utf8(bytes)
            .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))),
    }
}

/// Parses delimited text into a frame, resolving headers through `config`.
pub fn parse_frame(text: &str, side: Side, config: &CoreConfig) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| config.canonical_column(h.trim()).to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect::<Vec<_>>());
    }

    let frame = Frame::from_rows(header, rows).map_err(|source| CoreError::Frame { side, source })?;
    tracing::debug!(
        %side,
        rows = frame.row_count(),
        columns = frame.column_names().len(),
        "parsed input table"
    );
    Ok(frame)
}

pub fn read_frame(mut reader: impl Read, side: Side, config: &CoreConfig) -> Result<Frame> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode(bytes, config.encoding)?;
    parse_frame(&text, side, config)
}

pub fn load_frame(path: impl AsRef<Path>, side: Side, config: &CoreConfig) -> Result<Frame> {
    let path = path.as_ref();
    tracing::info!(%side, path = %path.display(), "loading input table");
    let file = std::fs::File::open(path)?;
    read_frame(std::io::BufReader::new(file), side, config)
}
