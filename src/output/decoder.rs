//! Conversion of raw child-process output into displayable text.
//!
//! Console programs write in the legacy OEM codepage, not UTF-8, so output
//! is decoded with a fixed single-byte table (IBM437 by default). Any other
//! encoding known to `encoding_rs` can be selected by its WHATWG label.
//!
//! Every read event is decoded on its own. A multi-byte sequence that is
//! split across two reads is NOT reassembled, so the halves decode to
//! replacement characters. This is a known limitation and is kept because
//! fixing it would change transcript content.

use encoding_rs::Encoding;

/// IBM437 glyphs for bytes 0x80..=0xFF. The lower half is plain ASCII.
const IBM437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// The character set used to interpret child output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codepage {
    /// IBM PC console codepage 437.
    Ibm437,
    /// Any encoding from the WHATWG Encoding Standard.
    Whatwg(&'static Encoding),
}

/// Stateless bytes-to-text converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteDecoder {
    codepage: Codepage,
}

impl Default for ByteDecoder {
    fn default() -> Self {
        Self::new(Codepage::Ibm437)
    }
}

impl ByteDecoder {
    pub fn new(codepage: Codepage) -> Self {
        Self { codepage }
    }

    /// Resolve a decoder from an encoding label such as `ibm437`, `utf-8`
    /// or `windows-1252`. Returns `None` for unknown labels.
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if ["ibm437", "cp437", "437"]
            .iter()
            .any(|alias| label.eq_ignore_ascii_case(alias))
        {
            return Some(Self::new(Codepage::Ibm437));
        }
        Encoding::for_label(label.as_bytes()).map(|encoding| Self::new(Codepage::Whatwg(encoding)))
    }

    /// Canonical name of the active encoding.
    pub fn name(&self) -> &'static str {
        match self.codepage {
            Codepage::Ibm437 => "IBM437",
            Codepage::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Decode one read's worth of bytes. Never fails: malformed input is
    /// replaced according to the encoding's replacement policy.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.codepage {
            Codepage::Ibm437 => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        b as char
                    } else {
                        IBM437_HIGH[usize::from(b - 0x80)]
                    }
                })
                .collect(),
            Codepage::Whatwg(encoding) => {
                let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
                text.into_owned()
            }
        }
    }
}
