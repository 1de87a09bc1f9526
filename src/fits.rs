//! Minimal FITS reader for the extinction map files.
//!
//! Only what the SFD rasters need: the primary HDU header (80-byte cards in
//! 2880-byte blocks) and a two-dimensional floating-point image payload.
//! Binary tables, extensions and tile compression are out of scope here.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{DustError, DustResult};

const CARD_SIZE: usize = 80;
const BLOCK_SIZE: usize = 2880;
const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CardValue {
    pub fn as_logical(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Parsed primary-HDU header with keyed access to card values.
#[derive(Debug, Clone, Default)]
pub struct Header {
    cards: Vec<(String, CardValue)>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CardValue) {
        let name = name.into();
        self.index.insert(name.clone(), self.cards.len());
        self.cards.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&CardValue> {
        self.index.get(name).map(|&i| &self.cards[i].1)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_real()
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_integer()
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_text()
    }

    pub fn require_float(&self, name: &str) -> DustResult<f64> {
        self.get_float(name)
            .ok_or_else(|| DustError::missing_keyword(name))
    }

    pub fn require_int(&self, name: &str) -> DustResult<i64> {
        self.get_int(name)
            .ok_or_else(|| DustError::missing_keyword(name))
    }

    pub fn require_string(&self, name: &str) -> DustResult<&str> {
        self.get_string(name)
            .ok_or_else(|| DustError::missing_keyword(name))
    }

    /// Reads header blocks until the END card, leaving the reader positioned
    /// at the start of the data payload (block-aligned per the standard).
    pub fn read_from<R: Read>(reader: &mut R) -> DustResult<Self> {
        let mut header = Self::new();
        let mut block = [0u8; BLOCK_SIZE];

        loop {
            reader.read_exact(&mut block).map_err(|_| {
                DustError::invalid_format("unexpected end of file inside FITS header")
            })?;

            for i in 0..CARDS_PER_BLOCK {
                let card = &block[i * CARD_SIZE..(i + 1) * CARD_SIZE];
                match parse_card(card)? {
                    ParsedCard::End => return Ok(header),
                    ParsedCard::Value(name, value) => header.insert(name, value),
                    ParsedCard::Commentary => {}
                }
            }
        }
    }
}

enum ParsedCard {
    Value(String, CardValue),
    Commentary,
    End,
}

fn parse_card(raw: &[u8]) -> DustResult<ParsedCard> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| DustError::invalid_format("non-ASCII bytes in header card"))?;

    let keyword = text[..8].trim();
    if keyword == "END" {
        return Ok(ParsedCard::End);
    }
    if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" || &text[8..10] != "= " {
        return Ok(ParsedCard::Commentary);
    }

    let value = parse_value(keyword, &text[10..])?;
    Ok(ParsedCard::Value(keyword.to_string(), value))
}

fn parse_value(keyword: &str, field: &str) -> DustResult<CardValue> {
    let trimmed = field.trim_start();

    if let Some(rest) = trimmed.strip_prefix('\'') {
        let close = rest.find('\'').ok_or_else(|| {
            DustError::invalid_keyword(keyword, "unterminated string value")
        })?;
        return Ok(CardValue::Text(rest[..close].trim_end().to_string()));
    }

    let value_part = match trimmed.find('/') {
        Some(pos) => trimmed[..pos].trim(),
        None => trimmed.trim(),
    };

    match value_part {
        "T" => Ok(CardValue::Logical(true)),
        "F" => Ok(CardValue::Logical(false)),
        _ => {
            if let Ok(i) = value_part.parse::<i64>() {
                return Ok(CardValue::Integer(i));
            }
            // FITS real values may carry a FORTRAN-style D exponent
            let normalized = value_part.replace(['D', 'd'], "E");
            normalized.parse::<f64>().map(CardValue::Real).map_err(|_| {
                DustError::invalid_keyword(
                    keyword,
                    format!("unparseable value '{}'", value_part),
                )
            })
        }
    }
}

/// Reads the two-dimensional image payload following `header`.
///
/// Accepts BITPIX -32 and -64; integer images with BSCALE/BZERO are not
/// produced by the SFD pipeline and are rejected. Returns the samples in
/// row-major order together with (width, height).
pub fn read_image<R: Read>(reader: &mut R, header: &Header) -> DustResult<(Vec<f32>, usize, usize)> {
    let naxis = header.require_int("NAXIS")?;
    if naxis != 2 {
        return Err(DustError::invalid_format(format!(
            "expected a 2-dimensional image, got NAXIS = {}",
            naxis
        )));
    }

    let width = positive_axis(header, "NAXIS1")?;
    let height = positive_axis(header, "NAXIS2")?;
    let count = width.checked_mul(height).ok_or_else(|| {
        DustError::invalid_format("image dimensions overflow")
    })?;

    let bitpix = header.require_int("BITPIX")?;
    let mut data = vec![0f32; count];
    match bitpix {
        -32 => reader
            .read_f32_into::<BigEndian>(&mut data)
            .map_err(|_| DustError::invalid_format("truncated image payload"))?,
        -64 => {
            let mut wide = vec![0f64; count];
            reader
                .read_f64_into::<BigEndian>(&mut wide)
                .map_err(|_| DustError::invalid_format("truncated image payload"))?;
            for (dst, src) in data.iter_mut().zip(&wide) {
                *dst = *src as f32;
            }
        }
        other => {
            return Err(DustError::invalid_format(format!(
                "unsupported BITPIX {} (expected -32 or -64)",
                other
            )))
        }
    }

    Ok((data, width, height))
}

fn positive_axis(header: &Header, name: &str) -> DustResult<usize> {
    let value = header.require_int(name)?;
    if value <= 0 {
        return Err(DustError::invalid_keyword(
            name,
            format!("axis length must be positive, got {}", value),
        ));
    }
    Ok(value as usize)
}

/// Opens a FITS file and reads its primary header and image in one pass.
pub fn open_image(path: impl AsRef<Path>) -> DustResult<(Header, Vec<f32>, usize, usize)> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    let header = Header::read_from(&mut reader)?;
    let (data, width, height) = read_image(&mut reader, &header)?;
    Ok((header, data, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn card(text: &str) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        assert!(bytes.len() <= CARD_SIZE);
        bytes.resize(CARD_SIZE, b' ');
        bytes
    }

    fn header_block(cards: &[&str]) -> Vec<u8> {
        let mut block = Vec::new();
        for c in cards {
            block.extend(card(c));
        }
        block.extend(card("END"));
        while block.len() % BLOCK_SIZE != 0 {
            block.push(b' ');
        }
        block
    }

    #[test]
    fn test_parse_logical_and_integer() {
        let bytes = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                  -32",
            "NAXIS   =                    2",
        ]);
        let header = Header::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.get("SIMPLE").unwrap().as_logical(), Some(true));
        assert_eq!(header.get_int("BITPIX"), Some(-32));
        assert_eq!(header.get_int("NAXIS"), Some(2));
    }

    #[test]
    fn test_parse_real_with_comment() {
        let bytes = header_block(&["CD1_1   =      -0.0395646818624 / degrees/pixel"]);
        let header = Header::read_from(&mut Cursor::new(bytes)).unwrap();
        let v = header.get_float("CD1_1").unwrap();
        assert!((v - (-0.0395646818624)).abs() < 1e-15);
    }

    #[test]
    fn test_parse_fortran_exponent() {
        let bytes = header_block(&["LAM_SCAL=            1.0000D+03"]);
        let header = Header::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.get_float("LAM_SCAL"), Some(1000.0));
    }

    #[test]
    fn test_parse_string_value() {
        let bytes = header_block(&["CTYPE1  = 'GLON-ZEA'           / projection"]);
        let header = Header::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.get_string("CTYPE1"), Some("GLON-ZEA"));
    }

    #[test]
    fn test_commentary_cards_skipped() {
        let bytes = header_block(&[
            "COMMENT this card carries no value",
            "HISTORY neither does this one",
            "NAXIS   =                    2",
        ]);
        let header = Header::read_from(&mut Cursor::new(bytes)).unwrap();
        assert!(header.get("COMMENT").is_none());
        assert_eq!(header.get_int("NAXIS"), Some(2));
    }

    #[test]
    fn test_missing_end_is_fatal() {
        let mut bytes = Vec::new();
        bytes.extend(card("SIMPLE  =                    T"));
        while bytes.len() % BLOCK_SIZE != 0 {
            bytes.push(b' ');
        }
        let result = Header::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(DustError::InvalidFormat { .. })));
    }

    #[test]
    fn test_require_missing_keyword() {
        let header = Header::new();
        assert!(matches!(
            header.require_float("CRVAL1"),
            Err(DustError::MissingKeyword { .. })
        ));
    }

    #[test]
    fn test_read_image_f32() {
        let mut bytes = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                  -32",
            "NAXIS   =                    2",
            "NAXIS1  =                    3",
            "NAXIS2  =                    2",
        ]);
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            bytes.extend(v.to_be_bytes());
        }
        let mut cursor = Cursor::new(bytes);
        let header = Header::read_from(&mut cursor).unwrap();
        let (data, width, height) = read_image(&mut cursor, &header).unwrap();
        assert_eq!((width, height), (3, 2));
        assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_read_image_rejects_integer_bitpix() {
        let bytes = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                   16",
            "NAXIS   =                    2",
            "NAXIS1  =                    2",
            "NAXIS2  =                    2",
        ]);
        let mut cursor = Cursor::new(bytes);
        let header = Header::read_from(&mut cursor).unwrap();
        assert!(matches!(
            read_image(&mut cursor, &header),
            Err(DustError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_truncated_payload_is_fatal() {
        let mut bytes = header_block(&[
            "SIMPLE  =                    T",
            "BITPIX  =                  -32",
            "NAXIS   =                    2",
            "NAXIS1  =                    4",
            "NAXIS2  =                    4",
        ]);
        bytes.extend(1.0f32.to_be_bytes());
        let mut cursor = Cursor::new(bytes);
        let header = Header::read_from(&mut cursor).unwrap();
        assert!(matches!(
            read_image(&mut cursor, &header),
            Err(DustError::InvalidFormat { .. })
        ));
    }
}
