use super::{CODE_POINT_SIZE, Charset, Decoded, MalformedPolicy, REPLACEMENT_CHARACTER};
use crate::debug_transform::trace_open;
use crate::error::{Result, TransformError};
use crate::transformer::{BufferSizes, Progress, TransformMode, TransformRequest, Transformer};

/// Longest encoded unit any supported charset can produce.
const MAX_UNIT: usize = 4;

/// Decodes an external encoding into internal 32-bit code points.
///
/// A partial trailing unit is kept internally between calls, so callers may
/// split the input at any byte. The destination must have room for at least
/// one code point ([`CODE_POINT_SIZE`] bytes) for the call to make progress.
#[derive(Clone, Debug)]
pub struct UnicodeDecoder {
    charset: Charset,
    policy: MalformedPolicy,
    stash: [u8; MAX_UNIT],
    stash_len: usize,
    sizes: Option<BufferSizes>,
}

impl UnicodeDecoder {
    /// Creates a closed decoder that fails on malformed input.
    #[must_use]
    pub fn new(charset: Charset) -> Self {
        Self::with_policy(charset, MalformedPolicy::Fail)
    }

    /// Creates a closed decoder with an explicit malformed-input policy.
    #[must_use]
    pub fn with_policy(charset: Charset, policy: MalformedPolicy) -> Self {
        Self {
            charset,
            policy,
            stash: [0; MAX_UNIT],
            stash_len: 0,
            sizes: None,
        }
    }

    /// Returns the source encoding.
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Returns the malformed-input policy.
    #[must_use]
    pub const fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    fn malformed(&self, err: TransformError, len: usize) -> Result<(u32, usize)> {
        match self.policy {
            MalformedPolicy::Fail => Err(err),
            MalformedPolicy::Replace => Ok((u32::from(REPLACEMENT_CHARACTER), len)),
        }
    }
}

impl Transformer for UnicodeDecoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Decode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(MAX_UNIT, CODE_POINT_SIZE);
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.stash_len = 0;
        self.sizes = Some(sizes);
        trace_open(self.charset.name(), TransformMode::Decode.name(), sizes.source, sizes.dest);
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
        let encoding = self.charset.name();
        let mut consumed = 0;
        let mut produced = 0;

        while dest.len() - produced >= CODE_POINT_SIZE {
            let stashed = self.stash_len;
            let take = (MAX_UNIT - stashed).min(source.len() - consumed);
            let mut window = [0u8; MAX_UNIT];
            window[..stashed].copy_from_slice(&self.stash[..stashed]);
            window[stashed..stashed + take].copy_from_slice(&source[consumed..consumed + take]);
            let available = stashed + take;
            if available == 0 {
                break;
            }

            let (code_point, used) = match self.charset.decode(&window[..available]) {
                Decoded::Char { code_point, len } => (code_point, len),
                Decoded::Incomplete if !flush => {
                    self.stash[..available].copy_from_slice(&window[..available]);
                    self.stash_len = available;
                    consumed += take;
                    break;
                }
                Decoded::Incomplete => {
                    self.malformed(TransformError::Truncated { encoding }, available)?
                }
                Decoded::Illegal { len } => self.malformed(
                    TransformError::IllegalSequence {
                        encoding,
                        offset: consumed,
                    },
                    len,
                )?,
            };

            dest[produced..produced + CODE_POINT_SIZE].copy_from_slice(&code_point.to_ne_bytes());
            produced += CODE_POINT_SIZE;

            if used >= stashed {
                consumed += used - stashed;
                self.stash_len = 0;
            } else {
                self.stash.copy_within(used..stashed, 0);
                self.stash_len = stashed - used;
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::transform_to_vec;
    use crate::unicode::{ByteOrder, internal_to_string};

    fn decode(charset: Charset, policy: MalformedPolicy, input: &[u8]) -> Result<String> {
        let mut decoder = UnicodeDecoder::with_policy(charset, policy);
        decoder.open(BufferSizes::default())?;
        let internal = transform_to_vec(&mut decoder, input, 64)?;
        Ok(internal_to_string(&internal))
    }

    #[test]
    fn utf8_text_decodes() {
        let text = "h\u{e9}llo \u{20ac} \u{1f600}";
        assert_eq!(
            decode(Charset::Utf8, MalformedPolicy::Fail, text.as_bytes()).unwrap(),
            text
        );
    }

    #[test]
    fn split_sequences_are_stitched_across_calls() {
        let text = "\u{20ac}\u{1f600}";
        let bytes = text.as_bytes();
        let mut decoder = UnicodeDecoder::new(Charset::Utf8);
        decoder.open(BufferSizes::default()).unwrap();

        let mut internal = Vec::new();
        let mut dest = [0u8; 16];
        for byte in bytes {
            let progress = decoder
                .transform(TransformRequest::new(std::slice::from_ref(byte), &mut dest))
                .unwrap();
            assert_eq!(progress.consumed, 1);
            internal.extend_from_slice(&dest[..progress.produced]);
        }
        let progress = decoder
            .transform(TransformRequest::finishing(b"", &mut dest))
            .unwrap();
        assert_eq!(progress.produced, 0);
        assert_eq!(internal_to_string(&internal), text);
    }

    #[test]
    fn strict_policy_reports_offset() {
        let err = decode(Charset::Utf8, MalformedPolicy::Fail, b"ab\xFFcd").unwrap_err();
        assert_eq!(
            err,
            TransformError::IllegalSequence {
                encoding: "UTF-8",
                offset: 2
            }
        );
    }

    #[test]
    fn strict_policy_reports_truncation_on_flush() {
        let err = decode(Charset::Utf8, MalformedPolicy::Fail, b"ab\xE2\x82").unwrap_err();
        assert_eq!(err, TransformError::Truncated { encoding: "UTF-8" });
    }

    #[test]
    fn replace_policy_substitutes() {
        let decoded = decode(Charset::Utf8, MalformedPolicy::Replace, b"a\xFFb\xE2\x82").unwrap();
        assert_eq!(decoded, "a\u{fffd}b\u{fffd}");

        let decoded = decode(
            Charset::Utf16(ByteOrder::Little),
            MalformedPolicy::Replace,
            &[0x00, 0xDC, 0x41, 0x00],
        )
        .unwrap();
        assert_eq!(decoded, "\u{fffd}A");
    }

    #[test]
    fn destination_smaller_than_a_code_point_makes_no_progress() {
        let mut decoder = UnicodeDecoder::new(Charset::Latin1);
        decoder.open(BufferSizes::default()).unwrap();
        let mut dest = [0u8; 3];
        let progress = decoder
            .transform(TransformRequest::new(b"abc", &mut dest))
            .unwrap();
        assert!(progress.is_stalled());
    }
}
