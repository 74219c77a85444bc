//! # AMLX Codec
//!
//! Encoder and decoder for AMLX, the compact binary distribution form of AMLL lyric documents.
//!
//! A payload is laid out as:
//!
//! ```text
//! "AMLX" | version (0x01) | global flags | header_size varint
//! header section      : metadata entries, string ids only
//! string pool section : deduplicated UTF-8 strings
//! lyric data section  : lines and words, delta-encoded times, bit-packed flags
//! ```
//!
//! Every integer above the byte level is an unsigned LEB128 varint and every piece of text is
//! referenced through the string pool. Decoding validates progressively and fails with a single
//! [`AmlxError`] naming the offending field (for example `line[3].word[1].text_string_id`).
//!
//! ## Example
//!
//! ```rust
//! use amll_core::{LyricDocument, LyricLine, LyricWord, MetadataEntry};
//!
//! let document = LyricDocument::new(
//!     vec![MetadataEntry::new("album", ["1989", "Deluxe"])],
//!     vec![LyricLine::new(
//!         1000.0,
//!         1300.0,
//!         vec![
//!             LyricWord::new("Hel", 900.0, 1100.0),
//!             LyricWord::new("lo", 1100.0, 1500.0),
//!         ],
//!     )],
//! );
//!
//! let bytes = amlx_codec::encode(&document)?;
//! let decoded = amlx_codec::decode(&bytes)?;
//!
//! // The line envelope is widened to cover its words.
//! assert_eq!(decoded.lines[0].start_time_ms, 900.0);
//! assert_eq!(decoded.lines[0].end_time_ms, 1500.0);
//! assert_eq!(decoded.metadata, document.metadata);
//! # Ok::<(), amlx_codec::AmlxError>(())
//! ```

pub mod bridge;
pub mod container;
pub mod error;
pub mod flags;
pub mod header;
pub mod inspect;
pub mod lyric_data;
pub mod pool;
pub mod reader;
pub mod timing;
pub mod varint;

pub use bridge::{binary_to_markup, markup_to_binary};
pub use container::{MAGIC, VERSION, decode, encode};
pub use error::{AmlxError, AmlxErrorKind, BridgeError, FieldPath, Scope};
pub use flags::{LineFlags, WordFlags};
pub use inspect::{PayloadLayout, inspect};
pub use timing::MAX_TIME_MS;
