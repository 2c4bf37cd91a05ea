//! Caption segmentation.
//!
//! Turns an ordered caption stream into punctuation-terminated sentences, a
//! timestamped log with one line per entry, and a subtitle track.

use crate::{
    format::format_log_line,
    types::{CaptionEntry, Cue, SegmentedCaptions},
};

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Accumulates caption text until a sentence boundary is seen.
#[derive(Debug, Default)]
struct SentenceBuffer {
    pending: String,
    sentences: Vec<String>,
}

impl SentenceBuffer {
    fn push(&mut self, text: &str) {
        self.pending.push(' ');
        self.pending.push_str(text);
        if text.ends_with(SENTENCE_TERMINATORS) {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let sentence = self.pending.trim();
        if !sentence.is_empty() {
            self.sentences.push(sentence.to_string());
        }
        self.pending.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.sentences
    }
}

/// Non-speech annotations such as `[Music]` never reach the sentence text.
fn is_annotation(text: &str) -> bool {
    text.starts_with('[')
}

pub fn segment_captions(entries: &[CaptionEntry]) -> SegmentedCaptions {
    let mut buffer = SentenceBuffer::default();
    let mut timestamped_log = Vec::with_capacity(entries.len());
    let mut subtitles = Vec::with_capacity(entries.len());

    for entry in entries {
        timestamped_log.push(format_log_line(entry));
        subtitles.push(Cue {
            start: entry.start,
            end: entry.start + entry.duration,
            text: entry.text.replace('\n', " ").trim().to_string(),
        });

        let text = entry.text.trim();
        if text.is_empty() || is_annotation(text) {
            continue;
        }
        buffer.push(text);
    }

    SegmentedCaptions {
        sentences: buffer.finish(),
        timestamped_log,
        subtitles,
    }
}
