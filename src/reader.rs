use std::io::BufRead;

use tracing::debug;

use crate::grok::GrokMatcher;
use crate::message::{LogLevel, LogMessage, LogRecord};

/// Splits a line stream into messages.
///
/// A line matched by the header matcher starts a new message; the lines that
/// follow it, up to the next header, form its body. Lines before the first
/// header make up one message without a header.
#[derive(Debug, Clone, Copy)]
pub struct MessageReader<'a> {
    matcher: &'a GrokMatcher,
    default_level: LogLevel,
}

impl<'a> MessageReader<'a> {
    pub fn new(matcher: &'a GrokMatcher, default_level: LogLevel) -> Self {
        Self {
            matcher,
            default_level,
        }
    }

    /// Read every message from `input`, handing each finalized record to
    /// `on_record`. Returns the number of records produced.
    pub fn read<R, F>(&self, input: R, mut on_record: F) -> std::io::Result<usize>
    where
        R: BufRead,
        F: FnMut(LogRecord),
    {
        let mut count = 0;
        let mut message = LogMessage::new();

        for line in lossy_lines(input) {
            let line = line?;
            if self.matcher.is_match(&line) {
                let finished = std::mem::take(&mut message);
                count += self.emit(finished, &mut on_record);
                if let Some(raw) = self.matcher.parse(&line) {
                    message.add_properties(raw);
                }
            }
            message.add_line(&line);
        }
        count += self.emit(message, &mut on_record);

        debug!(records = count, "finished reading messages");
        Ok(count)
    }

    /// Read `input` into a vector of records
    pub fn read_all<R: BufRead>(&self, input: R) -> std::io::Result<Vec<LogRecord>> {
        let mut records = Vec::new();
        self.read(input, |record| records.push(record))?;
        Ok(records)
    }

    fn emit<F: FnMut(LogRecord)>(&self, message: LogMessage, on_record: &mut F) -> usize {
        if message.is_empty() {
            return 0;
        }
        on_record(message.finalize(self.matcher.schema(), self.default_level));
        1
    }
}

/// Lines of `input` with `\n` or `\r\n` endings removed.
///
/// Invalid UTF-8 is replaced with U+FFFD so one bad line does not end the read.
pub fn lossy_lines<R: BufRead>(input: R) -> LossyLines<R> {
    LossyLines {
        input,
        buf: Vec::new(),
    }
}

#[derive(Debug)]
pub struct LossyLines<R> {
    input: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.input.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
