use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};

use super::checksum::{Checksum, Md5Checksum, CHECKSUM_LEN};
use super::meta::{EnvelopeMeta, META_KEY};
use crate::error::CorruptionReason;
use crate::media::bits::{pack, unpack};
use crate::media::CodecOptions;
use crate::result::Result;

/// "AURORA" tag, stored as 12 ASCII hex digits in front of every payload
pub const MAGIC_HEADER: &str = "415552524152";

/// the length header is a big endian u32 counting the JSON payload bytes
pub const LENGTH_HEADER_BITS: usize = 32;

/// The logical card record: a JSON object with arbitrary keys
pub type Record = Map<String, Value>;

/// A decoded envelope, the record with its metadata split off
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub record: Record,
    pub meta: Option<EnvelopeMeta>,
}

/// Frames records as `length header | magic | checksum | JSON`.
///
/// ## Example of usage
/// ```rust
/// use aurora_stego::media::payload::{EnvelopeCodec, EnvelopeMeta, Record};
/// use serde_json::json;
///
/// let codec = EnvelopeCodec::default();
/// let mut record = Record::new();
/// record.insert("card_id".to_string(), json!("aurora_001"));
///
/// let bits = codec.encode(&record, &EnvelopeMeta::fresh("1.0")).unwrap();
/// let envelope = codec.decode(&bits).unwrap();
///
/// assert_eq!(envelope.record, record);
/// assert_eq!(envelope.meta.unwrap().edit_count, 0);
/// ```
pub struct EnvelopeCodec {
    magic: String,
    checksum: Box<dyn Checksum>,
    verify_checksum: bool,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new(MAGIC_HEADER, Md5Checksum)
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("magic", &self.magic)
            .field("verify_checksum", &self.verify_checksum)
            .finish()
    }
}

impl EnvelopeCodec {
    pub fn new<S: Into<String>, C: Checksum + 'static>(magic: S, checksum: C) -> Self {
        Self {
            magic: magic.into(),
            checksum: Box::new(checksum),
            verify_checksum: true,
        }
    }

    pub fn from_options(opts: &CodecOptions) -> Self {
        Self::new(opts.magic.as_str(), Md5Checksum).with_verify_checksum(opts.verify_checksum)
    }

    pub fn with_verify_checksum(mut self, verify_checksum: bool) -> Self {
        self.verify_checksum = verify_checksum;
        self
    }

    /// total bits an envelope with a JSON payload of `payload_len` bytes occupies
    pub fn required_bits(&self, payload_len: usize) -> usize {
        LENGTH_HEADER_BITS + ((self.magic.len() + CHECKSUM_LEN + payload_len) << 3)
    }

    /// compact JSON of `record` with `meta` stored under the reserved key, as the last entry
    pub fn payload_json(&self, record: &Record, meta: &EnvelopeMeta) -> Result<Vec<u8>> {
        let mut payload: Record = record
            .iter()
            .filter(|(k, _)| k.as_str() != META_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        payload.insert(META_KEY.to_string(), serde_json::to_value(meta)?);

        let mut json = Vec::new();
        payload.serialize(&mut Serializer::with_formatter(&mut json, AsciiFormatter))?;

        Ok(json)
    }

    /// the envelope as bytes: length header, magic, checksum and JSON
    pub fn encode_bytes(&self, record: &Record, meta: &EnvelopeMeta) -> Result<Vec<u8>> {
        let json = self.payload_json(record, meta)?;
        let checksum = self.checksum.checksum(&json);

        let mut buffer = Vec::with_capacity(4 + self.magic.len() + CHECKSUM_LEN + json.len());
        buffer.write_u32::<BigEndian>(json.len() as u32)?;
        buffer.extend_from_slice(self.magic.as_bytes());
        buffer.extend_from_slice(checksum.as_bytes());
        buffer.extend_from_slice(&json);
        debug!(
            "encoded envelope with {} payload bytes, checksum {checksum}",
            json.len()
        );

        Ok(buffer)
    }

    /// the envelope expanded into bits, ready to be packed into a region
    pub fn encode(&self, record: &Record, meta: &EnvelopeMeta) -> Result<Vec<bool>> {
        Ok(pack(&self.encode_bytes(record, meta)?))
    }

    /// Parses an envelope from the bits of a region.
    ///
    /// Every check fails closed: a length header pointing past the available
    /// bits is `IncompleteData`, nothing is ever read out of bounds.
    pub fn decode(&self, bits: &[bool]) -> Result<Envelope> {
        if bits.len() < LENGTH_HEADER_BITS {
            return Err(CorruptionReason::IncompleteData {
                needed: LENGTH_HEADER_BITS,
                available: bits.len(),
            }
            .into());
        }
        let header = unpack(&bits[..LENGTH_HEADER_BITS])?;
        let declared = header.as_slice().read_u32::<BigEndian>()? as usize;

        let needed = (self.magic.len() + CHECKSUM_LEN)
            .checked_add(declared)
            .and_then(|frame_len| frame_len.checked_mul(8))
            .and_then(|frame_bits| frame_bits.checked_add(LENGTH_HEADER_BITS))
            .unwrap_or(usize::MAX);
        if bits.len() < needed {
            return Err(CorruptionReason::IncompleteData {
                needed,
                available: bits.len(),
            }
            .into());
        }

        let frame = unpack(&bits[LENGTH_HEADER_BITS..needed])?;
        let (magic, rest) = frame.split_at(self.magic.len());
        if magic != self.magic.as_bytes() {
            return Err(CorruptionReason::InvalidMagic.into());
        }

        let (stored, json) = rest.split_at(CHECKSUM_LEN);
        if self.verify_checksum {
            let computed = self.checksum.checksum(json);
            if stored != computed.as_bytes() {
                return Err(CorruptionReason::ChecksumMismatch {
                    stored: String::from_utf8_lossy(stored).into_owned(),
                    computed,
                }
                .into());
            }
        }
        trace!("envelope with {declared} payload bytes passed magic and checksum");

        parse_payload(json)
    }
}

/// Compact JSON that stays 7-bit clean.
///
/// Everything from U+007F up is written as `\uXXXX` (lowercase hex, surrogate
/// pairs above the BMP), so byte length and character count of a payload agree.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (c as u32) < 0x7f {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + c.len_utf8();
        }

        writer.write_all(&fragment.as_bytes()[start..])
    }
}

fn parse_payload(json: &[u8]) -> Result<Envelope> {
    let text = std::str::from_utf8(json)
        .map_err(|e| CorruptionReason::MalformedPayload(format!("payload is not UTF-8: {e}")))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CorruptionReason::MalformedPayload(format!("payload is not JSON: {e}")))?;
    let Value::Object(payload) = value else {
        return Err(
            CorruptionReason::MalformedPayload("payload is not a JSON object".to_string()).into(),
        );
    };

    let mut meta = None;
    let mut record = Record::with_capacity(payload.len());
    for (key, value) in payload {
        if key == META_KEY {
            meta = Some(serde_json::from_value::<EnvelopeMeta>(value).map_err(|e| {
                CorruptionReason::MalformedPayload(format!("invalid metadata: {e}"))
            })?);
        } else {
            record.insert(key, value);
        }
    }

    Ok(Envelope { record, meta })
}
