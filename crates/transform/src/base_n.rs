//! Base16, Base32 and Base64 transformers.
//!
//! Each radix is described by an alphabet whose first character is the
//! padding character; the remaining `2^bits_per_char` characters form the
//! data alphabet. Data is processed in blocks: the smallest byte count whose
//! bit length is a multiple of `bits_per_char`.
//!
//! | radix | bits/char | block bytes | chars/block |
//! |-------|-----------|-------------|-------------|
//! | 16    | 4         | 1           | 2           |
//! | 32    | 5         | 5           | 8           |
//! | 64    | 6         | 3           | 4           |
//!
//! A partially filled final block is zero padded. The encoder remembers
//! where real data ended and emits the padding character for every output
//! character whose bit window starts at or after that point, which yields
//! RFC 4648 `=` padding without a separate padding pass.

use crate::bits::{read_bits, write_bits};
use crate::debug_transform::{trace_failure, trace_open};
use crate::error::{Result, TransformError};
use crate::transformer::{BufferSizes, Progress, TransformMode, TransformRequest, Transformer};

const MAX_BLOCK_SIZE: usize = 5;
const MAX_CHARS_PER_BLOCK: usize = 8;

const BASE16_ALPHABET: &[u8] = b"=0123456789ABCDEF";
const BASE32_ALPHABET: &[u8] = b"=ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const BASE64_ALPHABET: &[u8] =
    b"=ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const INVALID: u8 = 0xFF;
const PADDING: u8 = 0xFE;

const BASE16_LOOKUP: [u8; 256] = reverse_table(BASE16_ALPHABET, true);
const BASE32_LOOKUP: [u8; 256] = reverse_table(BASE32_ALPHABET, true);
const BASE64_LOOKUP: [u8; 256] = reverse_table(BASE64_ALPHABET, false);

const fn reverse_table(alphabet: &[u8], fold_case: bool) -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut index = 1;
    while index < alphabet.len() {
        let symbol = alphabet[index];
        table[symbol as usize] = (index - 1) as u8;
        if fold_case {
            table[symbol.to_ascii_lowercase() as usize] = (index - 1) as u8;
        }
        index += 1;
    }
    table[alphabet[0] as usize] = PADDING;
    table
}

/// Supported Base-N radices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Radix {
    /// Hexadecimal, upper case on output, case-insensitive on input.
    Base16,
    /// RFC 4648 Base32, upper case on output, case-insensitive on input.
    Base32,
    /// RFC 4648 Base64, case-sensitive.
    Base64,
}

impl Radix {
    /// Maps a numeric base (16, 32 or 64) to a radix.
    #[must_use]
    pub const fn from_base(base: u32) -> Option<Self> {
        match base {
            16 => Some(Self::Base16),
            32 => Some(Self::Base32),
            64 => Some(Self::Base64),
            _ => None,
        }
    }

    /// Returns the kind tag of this radix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Base16 => "base16",
            Self::Base32 => "base32",
            Self::Base64 => "base64",
        }
    }

    /// Number of bits carried by one output character.
    #[must_use]
    pub const fn bits_per_char(self) -> usize {
        match self {
            Self::Base16 => 4,
            Self::Base32 => 5,
            Self::Base64 => 6,
        }
    }

    /// Number of input bytes per block.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Base16 => 1,
            Self::Base32 => 5,
            Self::Base64 => 3,
        }
    }

    /// Number of output characters per block.
    #[must_use]
    pub const fn chars_per_block(self) -> usize {
        self.block_size() * 8 / self.bits_per_char()
    }

    /// Full alphabet; the first character is the padding character.
    #[must_use]
    pub const fn alphabet(self) -> &'static [u8] {
        match self {
            Self::Base16 => BASE16_ALPHABET,
            Self::Base32 => BASE32_ALPHABET,
            Self::Base64 => BASE64_ALPHABET,
        }
    }

    /// The padding character.
    #[must_use]
    pub const fn padding(self) -> u8 {
        self.alphabet()[0]
    }

    /// Whether decoding folds lower case onto the alphabet.
    #[must_use]
    pub const fn is_case_insensitive(self) -> bool {
        !matches!(self, Self::Base64)
    }

    /// Length of the encoding of `len` input bytes, padding included.
    #[must_use]
    pub const fn encoded_len(self, len: usize) -> usize {
        len.div_ceil(self.block_size()) * self.chars_per_block()
    }

    fn data_symbol(self, value: usize) -> u8 {
        self.alphabet()[value + 1]
    }

    fn lookup(self, byte: u8) -> u8 {
        let table = match self {
            Self::Base16 => &BASE16_LOOKUP,
            Self::Base32 => &BASE32_LOOKUP,
            Self::Base64 => &BASE64_LOOKUP,
        };
        table[usize::from(byte)]
    }
}

/// Small fixed-capacity queue of output bytes that did not fit into the
/// caller's destination yet.
#[derive(Clone, Debug, Default)]
struct Pending {
    bytes: [u8; MAX_CHARS_PER_BLOCK],
    start: usize,
    end: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn fill(&mut self, bytes: &[u8]) {
        self.bytes[..bytes.len()].copy_from_slice(bytes);
        self.start = 0;
        self.end = bytes.len();
    }

    fn drain_into(&mut self, dest: &mut [u8]) -> usize {
        let count = (self.end - self.start).min(dest.len());
        dest[..count].copy_from_slice(&self.bytes[self.start..self.start + count]);
        self.start += count;
        count
    }

    fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

/// Encodes bytes into Base16/32/64 text.
#[derive(Clone, Debug)]
pub struct BaseNEncoder {
    radix: Radix,
    block: [u8; MAX_BLOCK_SIZE],
    filled: usize,
    pending: Pending,
    sizes: Option<BufferSizes>,
}

impl BaseNEncoder {
    /// Creates a closed encoder for `radix`.
    #[must_use]
    pub fn new(radix: Radix) -> Self {
        Self {
            radix,
            block: [0; MAX_BLOCK_SIZE],
            filled: 0,
            pending: Pending::default(),
            sizes: None,
        }
    }

    /// Returns the configured radix.
    #[must_use]
    pub const fn radix(&self) -> Radix {
        self.radix
    }

    /// Emits one block; characters whose bit window starts at or after
    /// `data_bits` become padding.
    fn encode_block(&mut self, data_bits: usize) {
        let radix = self.radix;
        let bits = radix.bits_per_char();
        let block_size = radix.block_size();
        self.block[self.filled..block_size].fill(0);

        let mut chars = [0u8; MAX_CHARS_PER_BLOCK];
        for (index, slot) in chars.iter_mut().take(radix.chars_per_block()).enumerate() {
            let start = index * bits;
            *slot = if start >= data_bits {
                radix.padding()
            } else {
                radix.data_symbol(read_bits(&self.block[..block_size], start, bits))
            };
        }

        self.pending.fill(&chars[..radix.chars_per_block()]);
        self.filled = 0;
    }

    fn clear_state(&mut self) {
        self.block = [0; MAX_BLOCK_SIZE];
        self.filled = 0;
        self.pending.clear();
    }
}

impl Transformer for BaseNEncoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Encode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(self.radix.block_size(), self.radix.chars_per_block());
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.clear_state();
        self.sizes = Some(sizes);
        trace_open(self.radix.name(), TransformMode::Encode.name(), sizes.source, sizes.dest);
        Ok(())
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        if self.sizes.is_none() {
            return Err(TransformError::NotOpen);
        }

        let TransformRequest {
            source,
            dest,
            flush,
        } = request;
        let block_size = self.radix.block_size();
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            produced += self.pending.drain_into(&mut dest[produced..]);
            if !self.pending.is_empty() {
                break;
            }

            if consumed < source.len() {
                let take = (block_size - self.filled).min(source.len() - consumed);
                self.block[self.filled..self.filled + take]
                    .copy_from_slice(&source[consumed..consumed + take]);
                self.filled += take;
                consumed += take;
                if self.filled == block_size {
                    self.encode_block(block_size * 8);
                }
            } else if flush && self.filled > 0 {
                self.encode_block(self.filled * 8);
            } else {
                break;
            }
        }

        Ok(Progress::new(consumed, produced))
    }

    fn close(&mut self) {
        self.clear_state();
        self.sizes = None;
    }

    fn reset(&mut self) -> Result<()> {
        let sizes = self.sizes.ok_or(TransformError::NotOpen)?;
        self.open(sizes)
    }

    fn is_open(&self) -> bool {
        self.sizes.is_some()
    }
}

/// Decodes Base16/32/64 text into bytes.
#[derive(Clone, Debug)]
pub struct BaseNDecoder {
    radix: Radix,
    values: [u8; MAX_CHARS_PER_BLOCK],
    filled: usize,
    first_padding: Option<usize>,
    pending: Pending,
    sizes: Option<BufferSizes>,
}

impl BaseNDecoder {
    /// Creates a closed decoder for `radix`.
    #[must_use]
    pub fn new(radix: Radix) -> Self {
        Self {
            radix,
            values: [0; MAX_CHARS_PER_BLOCK],
            filled: 0,
            first_padding: None,
            pending: Pending::default(),
            sizes: None,
        }
    }

    /// Returns the configured radix.
    #[must_use]
    pub const fn radix(&self) -> Radix {
        self.radix
    }

    fn push_char(&mut self, byte: u8) -> Result<()> {
        let value = self.radix.lookup(byte);
        match value {
            INVALID => {
                let err = TransformError::InvalidCharacter {
                    alphabet: self.radix.name(),
                    byte,
                };
                trace_failure(self.radix.name(), &err);
                return Err(err);
            }
            PADDING => {
                self.first_padding.get_or_insert(self.filled);
                self.values[self.filled] = 0;
            }
            value => self.values[self.filled] = value,
        }
        self.filled += 1;
        Ok(())
    }

    /// Packs the collected characters; output stops at the first padding
    /// character.
    fn decode_block(&mut self) {
        let radix = self.radix;
        let bits = radix.bits_per_char();
        let chars = radix.chars_per_block();
        self.values[self.filled..chars].fill(0);

        let mut bytes = [0u8; MAX_BLOCK_SIZE];
        for (index, value) in self.values[..chars].iter().enumerate() {
            write_bits(&mut bytes, index * bits, bits, usize::from(*value));
        }

        let valid = self
            .first_padding
            .map_or(radix.block_size(), |index| index * bits / 8);
        self.pending.fill(&bytes[..valid]);
        self.filled = 0;
        self.first_padding = None;
    }

    fn clear_state(&mut self) {
        self.values = [0; MAX_CHARS_PER_BLOCK];
        self.filled = 0;
        self.first_padding = None;
        self.pending.clear();
    }
}

impl Transformer for BaseNDecoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Decode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(self.radix.chars_per_block(), self.radix.block_size());
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.clear_state();
        self.sizes = Some(sizes);
        trace_open(self.radix.name(), TransformMode::Decode.name(), sizes.source, sizes.dest);
        Ok(())
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        if self.sizes.is_none() {
            return Err(TransformError::NotOpen);
        }

        let TransformRequest {
            source,
            dest,
            flush,
        } = request;
        let chars = self.radix.chars_per_block();
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            produced += self.pending.drain_into(&mut dest[produced..]);
            if !self.pending.is_empty() {
                break;
            }

            if consumed < source.len() {
                self.push_char(source[consumed])?;
                consumed += 1;
                if self.filled == chars {
                    self.decode_block();
                }
            } else if flush && self.filled > 0 {
                // Unpadded tail: the missing characters count as padding.
                self.first_padding.get_or_insert(self.filled);
                self.decode_block();
            } else {
                break;
            }
        }

        Ok(Progress::new(consumed, produced))
    }

    fn close(&mut self) {
        self.clear_state();
        self.sizes = None;
    }

    fn reset(&mut self) -> Result<()> {
        let sizes = self.sizes.ok_or(TransformError::NotOpen)?;
        self.open(sizes)
    }

    fn is_open(&self) -> bool {
        self.sizes.is_some()
    }
}
