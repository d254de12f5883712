use std::io::{self, Read, Write};

use crate::{LineFormat, StreamerOptions, TextFormat, TextStreamer};

/// Totals reported by [`transcode`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TranscodeSummary {
    /// Lines copied, counting a final unterminated line.
    pub lines: u64,
    /// Characters copied, terminators excluded.
    pub chars: u64,
    /// Format of the input after detection.
    pub source: TextFormat,
    /// Format written.
    pub target: TextFormat,
}

/// Copies text from `input` to `output`, converting the encoding and
/// optionally the line terminators.
///
/// When `to.line_format` is [`LineFormat::Unknown`] each terminator is
/// written in the style it was read; otherwise every terminator is rewritten.
/// `options.policy` governs malformed input, the remaining options shape the
/// output.
///
/// # Errors
///
/// Returns the first error from reading, decoding, encoding or writing.
pub fn transcode<R: Read, W: Write>(
    input: R,
    output: W,
    from: TextFormat,
    to: TextFormat,
    options: StreamerOptions,
) -> io::Result<TranscodeSummary> {
    let mut reader = TextStreamer::with_options(input, from, options);
    let mut writer = TextStreamer::with_options(output, to, options);
    let mut summary = TranscodeSummary::default();

    while let Some((line, ending)) = reader.read_line_with_ending()? {
        summary.lines += 1;
        summary.chars += line.chars().count() as u64;
        writer.write_str(&line)?;
        if let Some(ending) = ending {
            let style = match to.line_format {
                LineFormat::Unknown => ending,
                configured => configured,
            };
            writer.write_str(style.sequence())?;
        }
    }

    writer.finish()?;
    summary.source = reader.format();
    summary.target = writer.format();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextEncoding;

    #[test]
    fn preserves_mixed_terminators_by_default() {
        let mut output = Vec::new();
        let to = TextFormat::new(TextEncoding::Latin1, LineFormat::Unknown);
        let summary = transcode(
            &b"a\r\nb\nc\rd"[..],
            &mut output,
            TextFormat::default(),
            to,
            StreamerOptions::default(),
        )
        .unwrap();
        assert_eq!(output, b"a\r\nb\nc\rd");
        assert_eq!(summary.lines, 4);
        assert_eq!(summary.chars, 4);
        assert_eq!(summary.source.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn rewrites_terminators_when_configured() {
        let mut output = Vec::new();
        let to = TextFormat::new(TextEncoding::Utf8, LineFormat::CrLf);
        let options = StreamerOptions::default().with_suppressed_byte_order_mark(true);
        transcode(&b"a\nb\rc\n"[..], &mut output, TextFormat::default(), to, options).unwrap();
        assert_eq!(output, b"a\r\nb\r\nc\r\n");
    }

    #[test]
    fn empty_input_writes_nothing() {
        let mut output = Vec::new();
        let to = TextFormat::new(TextEncoding::Utf16Be, LineFormat::Lf);
        let summary = transcode(
            io::empty(),
            &mut output,
            TextFormat::default(),
            to,
            StreamerOptions::default(),
        )
        .unwrap();
        assert_eq!(summary.lines, 0);
        assert!(output.is_empty());
    }
}
