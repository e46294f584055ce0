//! Entry serialization with optional compression.

use std::fmt;
use std::str::FromStr;

use crate::types::CachedEntry;
use crate::{CacheError, Result};

/// Compression applied to an encoded entry before it reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Snappy,
}

impl FromStr for Compression {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" | "" => Ok(Compression::None),
            "snappy" => Ok(Compression::Snappy),
            other => Err(CacheError::Configuration(format!(
                "unsupported compression codec {other:?} (expected \"none\" or \"snappy\")"
            ))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::Snappy => f.write_str("snappy"),
        }
    }
}

/// Serializes cached entries to the opaque payload the backend stores.
///
/// The body is JSON; each extent's response carries its own `kind`
/// discriminator, so one entry format holds heterogeneous response shapes.
/// A payload that fails decompression, fails to parse, or names an unknown
/// discriminator yields [`CacheError::Decode`] and the caller discards the
/// entry as a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryCodec {
    compression: Compression,
}

impl EntryCodec {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }

    pub fn encode(&self, entry: &CachedEntry) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(entry)?;
        match self.compression {
            Compression::None => Ok(body),
            Compression::Snappy => snap::raw::Encoder::new()
                .compress_vec(&body)
                .map_err(|e| CacheError::Compression(e.to_string())),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<CachedEntry> {
        let body = match self.compression {
            Compression::None => bytes.to_vec(),
            Compression::Snappy => snap::raw::Decoder::new()
                .decompress_vec(bytes)
                .map_err(|e| CacheError::Decode(e.to_string()))?,
        };
        serde_json::from_slice(&body).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extent, QueryResponse, Sample};

    fn entry() -> CachedEntry {
        CachedEntry::new(
            "tenant:up:10:0",
            vec![Extent::new(
                0,
                100,
                String::new(),
                QueryResponse::Instant(Sample::new(0, 1.0)),
            )],
        )
    }

    #[test]
    fn round_trip_uncompressed() {
        let codec = EntryCodec::new(Compression::None);
        let bytes = codec.encode(&entry()).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), entry());
    }

    #[test]
    fn round_trip_snappy() {
        let codec = EntryCodec::new(Compression::Snappy);
        let bytes = codec.encode(&entry()).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), entry());
    }

    #[test]
    fn decode_garbage_fails() {
        let codec = EntryCodec::new(Compression::None);
        assert!(matches!(
            codec.decode(b"not an entry"),
            Err(CacheError::Decode(_))
        ));
    }

    #[test]
    fn decode_unknown_discriminator_fails() {
        let codec = EntryCodec::new(Compression::None);
        let payload = br#"{"key":"k","extents":[{"start":0,"end":1,"trace_id":"","response":{"kind":"histogram","data":[]}}]}"#;
        assert!(matches!(
            codec.decode(payload),
            Err(CacheError::Decode(_))
        ));
    }

    #[test]
    fn snappy_decoder_rejects_plain_json() {
        let codec = EntryCodec::new(Compression::Snappy);
        let plain = serde_json::to_vec(&entry()).unwrap();
        assert!(codec.decode(&plain).is_err());
    }

    #[test]
    fn compression_parses() {
        assert_eq!("none".parse::<Compression>().unwrap(), Compression::None);
        assert_eq!(
            "snappy".parse::<Compression>().unwrap(),
            Compression::Snappy
        );
        assert!("lz4".parse::<Compression>().is_err());
    }
}
