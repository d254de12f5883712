use std::fmt;
use std::io::{self, Read, Write};
use std::mem;

use transform::unicode::{
    CODE_POINT_SIZE, MalformedPolicy, UnicodeDecoder, UnicodeEncoder, from_internal, to_internal,
};
use transform_io::{TransformReader, TransformWriter};

use crate::debug_text::{
    trace_char_flush, trace_direction, trace_encoding_detected, trace_line_ending,
};
use crate::{LineFormat, TextEncoding, TextError, TextFormat};

/// Characters buffered by a writing streamer unless configured otherwise.
pub const DEFAULT_CHAR_BUFFER: usize = 256;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Behaviour switches for a [`TextStreamer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StreamerOptions {
    /// Never write a byte-order mark, even for encodings that define one.
    pub suppress_byte_order_mark: bool,
    /// Push buffered characters to the stream, and flush it, after every
    /// line terminator.
    pub flush_on_newline: bool,
    /// Number of characters buffered before they are encoded.
    pub buffer_capacity: usize,
    /// How the read path treats malformed input.
    pub policy: MalformedPolicy,
}

impl StreamerOptions {
    /// Sets [`suppress_byte_order_mark`](Self::suppress_byte_order_mark).
    #[must_use]
    pub const fn with_suppressed_byte_order_mark(mut self, suppress: bool) -> Self {
        self.suppress_byte_order_mark = suppress;
        self
    }

    /// Sets [`flush_on_newline`](Self::flush_on_newline).
    #[must_use]
    pub const fn with_flush_on_newline(mut self, flush: bool) -> Self {
        self.flush_on_newline = flush;
        self
    }

    /// Sets [`buffer_capacity`](Self::buffer_capacity). Zero is treated as one.
    #[must_use]
    pub const fn with_buffer_capacity(mut self, chars: usize) -> Self {
        self.buffer_capacity = chars;
        self
    }

    /// Sets [`policy`](Self::policy).
    #[must_use]
    pub const fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for StreamerOptions {
    fn default() -> Self {
        Self {
            suppress_byte_order_mark: false,
            flush_on_newline: false,
            buffer_capacity: DEFAULT_CHAR_BUFFER,
            policy: MalformedPolicy::Fail,
        }
    }
}

enum Channel<S> {
    Idle(S),
    Reading(TransformReader<UnicodeDecoder, S>),
    Writing(TransformWriter<UnicodeEncoder, S>),
    Detached,
}

impl<S> Channel<S> {
    const fn name(&self) -> &'static str {
        match self {
            Self::Idle(_) => "idle",
            Self::Reading(_) => "reading",
            Self::Writing(_) => "writing",
            Self::Detached => "detached",
        }
    }
}

/// Character and line oriented access to a byte stream.
///
/// A streamer commits to one direction on first use. Reading sniffs a
/// byte-order mark, decodes through a [`TransformReader`] and keeps one
/// character of lookahead. Writing buffers characters, encodes them through
/// a [`TransformWriter`] and emits a byte-order mark once when the encoding
/// has one.
///
/// Buffered characters are not written on drop; call
/// [`finish`](Self::finish) when done writing.
///
/// ```
/// use text::{LineFormat, TextStreamer};
///
/// let mut reader = TextStreamer::new(&b"\xEF\xBB\xBFone\r\ntwo"[..]);
/// assert_eq!(reader.read_line().unwrap().as_deref(), Some("one"));
/// assert_eq!(reader.format().line_format, LineFormat::CrLf);
/// assert_eq!(reader.read_line().unwrap().as_deref(), Some("two"));
/// assert_eq!(reader.read_line().unwrap(), None);
/// ```
pub struct TextStreamer<S> {
    format: TextFormat,
    options: StreamerOptions,
    channel: Channel<S>,
    lookahead: Option<char>,
    pending: Vec<u8>,
}

impl<S> TextStreamer<S> {
    /// Wraps `stream` with an undecided format and default options.
    pub fn new(stream: S) -> Self {
        Self::with_options(stream, TextFormat::default(), StreamerOptions::default())
    }

    /// Wraps `stream` with an explicit format.
    pub fn with_format(stream: S, format: TextFormat) -> Self {
        Self::with_options(stream, format, StreamerOptions::default())
    }

    /// Wraps `stream` with an explicit format and options.
    pub fn with_options(stream: S, format: TextFormat, options: StreamerOptions) -> Self {
        Self {
            format,
            options,
            channel: Channel::Idle(stream),
            lookahead: None,
            pending: Vec::new(),
        }
    }

    /// Current format. After reading starts this reflects the detected
    /// encoding and the style of the last line terminator read.
    pub const fn format(&self) -> TextFormat {
        self.format
    }

    /// Replaces the format.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::FormatLocked`] once the streamer has started
    /// reading or writing.
    pub fn set_format(&mut self, format: TextFormat) -> Result<(), TextError> {
        if !matches!(self.channel, Channel::Idle(_)) {
            return Err(TextError::FormatLocked);
        }
        self.format = format;
        Ok(())
    }

    /// Options in effect.
    pub const fn options(&self) -> StreamerOptions {
        self.options
    }

    /// Returns the byte stream, if still attached.
    pub fn get_ref(&self) -> Option<&S> {
        match &self.channel {
            Channel::Idle(stream) => Some(stream),
            Channel::Reading(reader) => Some(reader.get_ref()),
            Channel::Writing(writer) => Some(writer.get_ref()),
            Channel::Detached => None,
        }
    }

    /// Releases the byte stream. Characters still buffered for writing and
    /// bytes read ahead are discarded.
    pub fn into_inner(self) -> Option<S> {
        match self.channel {
            Channel::Idle(stream) => Some(stream),
            Channel::Reading(reader) => Some(reader.into_parts().1),
            Channel::Writing(writer) => Some(writer.into_parts().1),
            Channel::Detached => None,
        }
    }
}

impl<S: Read> TextStreamer<S> {
    /// Returns the next character without consuming it.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, malformed input under
    /// [`MalformedPolicy::Fail`], or when the streamer is writing.
    pub fn peek_char(&mut self) -> io::Result<Option<char>> {
        self.begin_reading()?;
        Ok(self.lookahead)
    }

    /// Consumes and returns the next character, `None` at end of stream.
    ///
    /// # Errors
    ///
    /// As for [`peek_char`](Self::peek_char).
    pub fn read_char(&mut self) -> io::Result<Option<char>> {
        self.begin_reading()?;
        let current = self.lookahead;
        if current.is_some() {
            self.lookahead = self.decode_next()?;
        }
        Ok(current)
    }

    /// Reads one line without its terminator.
    ///
    /// `CR`, `LF` and `CR LF` all end a line; the style seen becomes the
    /// streamer's line format. The last line may end without a terminator.
    /// Returns `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// As for [`peek_char`](Self::peek_char).
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.read_line_with_ending()?.map(|(line, _)| line))
    }

    /// Like [`read_line`](Self::read_line), also returning the terminator
    /// style, or `None` for a final unterminated line.
    ///
    /// # Errors
    ///
    /// As for [`peek_char`](Self::peek_char).
    pub fn read_line_with_ending(&mut self) -> io::Result<Option<(String, Option<LineFormat>)>> {
        self.begin_reading()?;
        if self.lookahead.is_none() {
            return Ok(None);
        }

        let mut line = String::new();
        while let Some(c) = self.read_char()? {
            let ending = match c {
                '\n' => LineFormat::Lf,
                '\r' if self.lookahead == Some('\n') => {
                    self.read_char()?;
                    LineFormat::CrLf
                }
                '\r' => LineFormat::Cr,
                _ => {
                    line.push(c);
                    continue;
                }
            };
            self.format.line_format = ending;
            trace_line_ending(ending.label());
            return Ok(Some((line, Some(ending))));
        }
        Ok(Some((line, None)))
    }

    fn begin_reading(&mut self) -> io::Result<()> {
        let mut stream = match mem::replace(&mut self.channel, Channel::Detached) {
            Channel::Idle(stream) => stream,
            Channel::Reading(reader) => {
                self.channel = Channel::Reading(reader);
                return Ok(());
            }
            other => {
                let err = direction_error(&other, "reading");
                self.channel = other;
                return Err(err.into());
            }
        };

        let (prefix, len) = match sniff(&mut stream) {
            Ok(sniffed) => sniffed,
            Err(err) => {
                self.channel = Channel::Idle(stream);
                return Err(err);
            }
        };
        let prefix = &prefix[..len];

        let detected = if self.format.encoding.sniffs_byte_order_mark() {
            TextEncoding::detect(prefix)
        } else {
            None
        };
        let (encoding, mark_len) = detected.unwrap_or((self.format.encoding.resolved(), 0));
        self.format.encoding = encoding;
        trace_encoding_detected(encoding.label(), mark_len);

        let decoder = UnicodeDecoder::with_policy(encoding.charset(), self.options.policy);
        let mut reader = TransformReader::new(decoder, stream).map_err(TextError::from)?;
        reader.preload_source_data(&prefix[mark_len..]);
        self.channel = Channel::Reading(reader);
        trace_direction("reading", encoding.label());

        self.lookahead = self.decode_next()?;
        Ok(())
    }

    fn decode_next(&mut self) -> io::Result<Option<char>> {
        let Channel::Reading(reader) = &mut self.channel else {
            return Ok(None);
        };

        let mut unit = [0u8; CODE_POINT_SIZE];
        let mut filled = 0;
        while filled < CODE_POINT_SIZE {
            let count = reader.read(&mut unit[filled..])?;
            if count == 0 {
                break;
            }
            filled += count;
        }

        match filled {
            0 => Ok(None),
            CODE_POINT_SIZE => {
                let code_point = from_internal(unit);
                char::from_u32(code_point)
                    .map(Some)
                    .ok_or_else(|| TextError::InvalidCodePoint(code_point).into())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "decoder stopped inside a code point",
            )),
        }
    }
}

impl<S: Write> TextStreamer<S> {
    /// Appends one character.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors from a triggered flush, or when the streamer is
    /// reading.
    pub fn write_char(&mut self, c: char) -> io::Result<()> {
        self.write_str(c.encode_utf8(&mut [0; 4]))
    }

    /// Appends `text` verbatim; embedded terminators are not rewritten.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.begin_writing()?;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            self.push_char(c)?;
            if self.options.flush_on_newline && ends_line(c, chars.peek().copied()) {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Appends the terminator of the configured line format.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_newline(&mut self) -> io::Result<()> {
        self.write_str(self.format.line_format.sequence())
    }

    /// Appends `text` followed by the configured terminator.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write_str(text)?;
        self.write_newline()
    }

    /// Encodes buffered characters and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns the first error from the encoder or the stream.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true)?;
        if let Channel::Writing(writer) = &mut self.channel {
            writer.flush()?;
        }
        Ok(())
    }

    /// Encodes buffered characters, drains the encoder and flushes the
    /// stream. The streamer can keep writing afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first error from the encoder or the stream.
    pub fn finish(&mut self) -> io::Result<()> {
        self.flush_pending(true)?;
        if let Channel::Writing(writer) = &mut self.channel {
            writer.finish()?;
        }
        Ok(())
    }

    fn begin_writing(&mut self) -> io::Result<()> {
        let stream = match mem::replace(&mut self.channel, Channel::Detached) {
            Channel::Idle(stream) => stream,
            Channel::Writing(writer) => {
                self.channel = Channel::Writing(writer);
                return Ok(());
            }
            other => {
                let err = direction_error(&other, "writing");
                self.channel = other;
                return Err(err.into());
            }
        };

        let encoding = self.format.encoding.resolved();
        self.format.encoding = encoding;
        let charset = encoding.charset();
        let writer =
            TransformWriter::new(UnicodeEncoder::new(charset), stream).map_err(TextError::from)?;
        self.channel = Channel::Writing(writer);
        self.pending = Vec::with_capacity(self.capacity_bytes());
        trace_direction("writing", encoding.label());

        if !self.options.suppress_byte_order_mark && !charset.byte_order_mark().is_empty() {
            self.pending.extend_from_slice(&to_internal(BYTE_ORDER_MARK));
        }
        Ok(())
    }

    fn push_char(&mut self, c: char) -> io::Result<()> {
        self.pending.extend_from_slice(&to_internal(c));
        if self.pending.len() >= self.capacity_bytes() {
            self.flush_pending(false)?;
        }
        Ok(())
    }

    fn flush_pending(&mut self, forced: bool) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let Channel::Writing(writer) = &mut self.channel else {
            return Ok(());
        };
        trace_char_flush(self.pending.len() / CODE_POINT_SIZE, forced);
        let result = writer.write_all(&self.pending);
        self.pending.clear();
        result
    }

    const fn capacity_bytes(&self) -> usize {
        let chars = if self.options.buffer_capacity == 0 {
            1
        } else {
            self.options.buffer_capacity
        };
        chars * CODE_POINT_SIZE
    }
}

impl<S: fmt::Debug> fmt::Debug for TextStreamer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStreamer")
            .field("format", &self.format)
            .field("options", &self.options)
            .field("channel", &self.channel.name())
            .field("stream", &self.get_ref())
            .field("lookahead", &self.lookahead)
            .field("pending_chars", &(self.pending.len() / CODE_POINT_SIZE))
            .finish()
    }
}

fn direction_error<S>(channel: &Channel<S>, attempted: &'static str) -> TextError {
    match channel {
        Channel::Detached => TextError::Detached,
        other => TextError::WrongDirection {
            active: other.name(),
            attempted,
        },
    }
}

/// Reads up to three bytes, enough to recognise any supported mark.
fn sniff<R: Read>(stream: &mut R) -> io::Result<([u8; 3], usize)> {
    let mut prefix = [0u8; 3];
    let mut len = 0;
    while len < prefix.len() {
        match stream.read(&mut prefix[len..]) {
            Ok(0) => break,
            Ok(count) => len += count,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok((prefix, len))
}

const fn ends_line(c: char, next: Option<char>) -> bool {
    match c {
        '\n' => true,
        '\r' => !matches!(next, Some('\n')),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut streamer = TextStreamer::new(&b"xy"[..]);
        assert_eq!(streamer.peek_char().unwrap(), Some('x'));
        assert_eq!(streamer.read_char().unwrap(), Some('x'));
        assert_eq!(streamer.read_char().unwrap(), Some('y'));
        assert_eq!(streamer.read_char().unwrap(), None);
        assert_eq!(streamer.read_char().unwrap(), None);
    }

    #[test]
    fn format_locks_after_first_use() {
        let mut streamer = TextStreamer::new(Vec::new());
        let latin1 = TextFormat::new(TextEncoding::Latin1, LineFormat::Lf);
        streamer.set_format(latin1).unwrap();
        streamer.write_char('\u{e9}').unwrap();
        assert_eq!(streamer.set_format(TextFormat::default()), Err(TextError::FormatLocked));
        streamer.finish().unwrap();
        assert_eq!(streamer.into_inner().unwrap(), b"\xE9");
    }

    #[test]
    fn unknown_encoding_writes_utf8() {
        let mut streamer = TextStreamer::new(Vec::new());
        streamer.write_str("\u{20ac}").unwrap();
        streamer.finish().unwrap();
        assert_eq!(streamer.format().encoding, TextEncoding::Utf8);
        assert_eq!(streamer.into_inner().unwrap(), b"\xEF\xBB\xBF\xE2\x82\xAC");
    }

    #[test]
    fn zero_capacity_still_writes() {
        let options = StreamerOptions::default()
            .with_buffer_capacity(0)
            .with_suppressed_byte_order_mark(true);
        let mut streamer = TextStreamer::with_options(Vec::new(), TextFormat::default(), options);
        streamer.write_str("abc").unwrap();
        assert_eq!(streamer.get_ref().unwrap(), b"abc");
    }

    #[test]
    fn direction_is_fixed() {
        let mut streamer = TextStreamer::new(io::Cursor::new(b"abc".to_vec()));
        assert_eq!(streamer.read_char().unwrap(), Some('a'));
        let err = streamer.write_char('z').unwrap_err();
        let inner = err.get_ref().and_then(|e| e.downcast_ref::<TextError>());
        assert_eq!(
            inner,
            Some(&TextError::WrongDirection {
                active: "reading",
                attempted: "writing",
            })
        );
        assert_eq!(streamer.read_char().unwrap(), Some('b'));
    }

    #[test]
    fn terminator_detection() {
        assert!(ends_line('\n', None));
        assert!(ends_line('\r', Some('x')));
        assert!(!ends_line('\r', Some('\n')));
        assert!(!ends_line('a', Some('\n')));
    }
}
