use super::{CODE_POINT_SIZE, Charset, REPLACEMENT_CHARACTER, from_internal};
use crate::debug_transform::trace_open;
use crate::error::{Result, TransformError};
use crate::transformer::{BufferSizes, Progress, TransformMode, TransformRequest, Transformer};

/// Encodes internal 32-bit code points into an external encoding.
///
/// Code points without a representation (surrogates, values above U+10FFFF)
/// are written as U+FFFD. When the encoded character does not fit into the
/// remaining destination the call returns early without consuming it.
#[derive(Clone, Debug)]
pub struct UnicodeEncoder {
    charset: Charset,
    stash: [u8; CODE_POINT_SIZE],
    stash_len: usize,
    sizes: Option<BufferSizes>,
}

impl UnicodeEncoder {
    /// Creates a closed encoder.
    #[must_use]
    pub fn new(charset: Charset) -> Self {
        Self {
            charset,
            stash: [0; CODE_POINT_SIZE],
            stash_len: 0,
            sizes: None,
        }
    }

    /// Returns the target encoding.
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }
}

impl Transformer for UnicodeEncoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Encode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(CODE_POINT_SIZE, self.charset.max_char_len());
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.stash_len = 0;
        self.sizes = Some(sizes);
        trace_open(self.charset.name(), TransformMode::Encode.name(), sizes.source, sizes.dest);
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
        let mut consumed = 0;
        let mut produced = 0;

        loop {
            let stashed = self.stash_len;
            let take = (CODE_POINT_SIZE - stashed).min(source.len() - consumed);
            let available = stashed + take;
            if available == 0 {
                break;
            }

            let mut unit = self.stash;
            unit[stashed..available].copy_from_slice(&source[consumed..consumed + take]);
            if available < CODE_POINT_SIZE {
                if flush {
                    return Err(TransformError::Truncated { encoding: "UTF-32" });
                }
                self.stash = unit;
                self.stash_len = available;
                consumed += take;
                break;
            }

            let c = char::from_u32(from_internal(unit)).unwrap_or(REPLACEMENT_CHARACTER);
            let mut encoded = [0u8; 4];
            let len = self.charset.encode(c, &mut encoded);
            if len > dest.len() - produced {
                break;
            }

            dest[produced..produced + len].copy_from_slice(&encoded[..len]);
            produced += len;
            consumed += take;
            self.stash_len = 0;
        }

        Ok(Progress::new(consumed, produced))
    }

    fn close(&mut self) {
        self.stash_len = 0;
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
