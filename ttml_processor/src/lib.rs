//! # TTML Processor: The Markup Layer for AMLL Lyrics
//!
//! This crate parses and generates TTML (Timed Text Markup Language) lyrics in the
//! dialect used by Apple Music and AMLL, converting between markup text and the
//! [`LyricDocument`] model from `amll_core`.
//!
//! The two primary functions are:
//! - [`parse_ttml`]: Converts a TTML string into a [`LyricDocument`].
//! - [`generate_ttml`]: Creates a TTML string from a [`LyricDocument`].
//!
//! [`TtmlMarkup`] bundles both behind the [`LyricMarkup`] trait so the AMLX
//! codec bridges can consume it.
//!
//! ## Not a General-Purpose Parser
//!
//! This library is **not** designed for generic TTML subtitle files. It understands
//! the conventions of AMLL lyrics such as `amll:meta`, `ttm:role="x-bg"` background
//! vocals and the `<iTunesMetadata>` block.
//!
//! ## Example
//!
//! ```rust
//! use amll_core::{TtmlGenerationOptions, TtmlParsingOptions};
//! use ttml_processor::{generate_ttml, parse_ttml};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ttml_content = r#"
//!     <tt xmlns="http://www.w3.org/ns/ttml" itunes:timing="Word">
//!       <body>
//!         <div>
//!           <p begin="5.0s" end="10.0s"><span begin="5.1s" end="5.5s">Hello</span> <span begin="5.6s" end="6.0s">world</span></p>
//!         </div>
//!       </body>
//!     </tt>
//!     "#;
//!
//!     let document = parse_ttml(ttml_content, &TtmlParsingOptions::default())?;
//!     let line = &document.lines[0];
//!     assert_eq!(line.start_time_ms, 5000.0);
//!
//!     // The space between the spans is kept as a blank gap word.
//!     let texts: Vec<&str> = line.words.iter().map(|w| w.text.as_str()).collect();
//!     assert_eq!(texts, ["Hello", " ", "world"]);
//!
//!     let generated = generate_ttml(&document, &TtmlGenerationOptions::default())?;
//!     assert!(generated.contains(r#"<span begin="00:05.100" end="00:05.500">Hello</span>"#));
//!
//!     Ok(())
//! }
//! ```

pub mod generator;
pub mod parser;

use amll_core::{
    ConvertError, LyricDocument, LyricMarkup, TtmlGenerationOptions, TtmlParsingOptions,
};

pub use generator::{format_ttml_time, generate_ttml};
pub use parser::parse_ttml;

/// 基于 TTML 的标记层实现。
#[derive(Debug, Clone, Default)]
pub struct TtmlMarkup {
    pub parsing: TtmlParsingOptions,
    pub generation: TtmlGenerationOptions,
}

impl TtmlMarkup {
    #[must_use]
    pub const fn new(parsing: TtmlParsingOptions, generation: TtmlGenerationOptions) -> Self {
        Self {
            parsing,
            generation,
        }
    }
}

impl LyricMarkup for TtmlMarkup {
    fn to_document(&self, text: &str) -> Result<LyricDocument, ConvertError> {
        parse_ttml(text, &self.parsing)
    }

    fn from_document(
        &self,
        document: &LyricDocument,
        pretty: bool,
    ) -> Result<String, ConvertError> {
        let options = TtmlGenerationOptions {
            format: pretty,
            ..self.generation.clone()
        };
        generate_ttml(document, &options)
    }
}
