//! Provider detection and the streaming adapter contract (spec §4.3, §4.4, §9).
//!
//! The two export formats are modeled as a closed, statically dispatched
//! variant — [`ProviderKind`] — rather than a trait object. Every adapter
//! operation (`stream_conversations`, `get_conversation_by_id`,
//! `get_message_by_id`, `search`) is a method on [`Adapter`] that matches on
//! the kind once and calls into `openai`/`claude`. Adapters are stateless: a
//! pure function of `(path, options)`, each call opening its own file
//! handle, safe to call concurrently from multiple threads as long as each
//! thread owns its iterator (spec §9, §11).

pub mod claude;
pub mod openai;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use struson::reader::{JsonReader, JsonStreamReader, ValueType};

use crate::error::{Error, ParseError, SkipReason};
use crate::model::{Conversation, Message, SearchQuery, SearchResult};
use crate::search;

/// Which wire format an export uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Claude,
}

/// A non-fatal failure encountered while streaming a single record
/// (spec §7: validation and malformed-record failures are skipped, not
/// fatal).
#[derive(Debug, Clone)]
pub struct SkipEvent {
    pub index: usize,
    pub reason: SkipReason,
}

pub type SkipCallback<'a> = Box<dyn FnMut(SkipEvent) + 'a>;
pub type ProgressCallback<'a> = Box<dyn FnMut(usize) + 'a>;

impl ProviderKind {
    /// Classify an export file by peeking at its first array element
    /// (spec §4.3). Reads O(1) bytes proportional to the first record: an
    /// empty array is JSON-syntax-detectable without materializing any
    /// element, and a non-empty array only requires the first element.
    pub fn detect(path: &Path) -> Result<Self, Error> {
        let file = open(path)?;
        let mut reader = JsonStreamReader::new(BufReader::new(file));
        reader
            .begin_array()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?;

        let has_first = reader
            .has_next()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
        if !has_first {
            // Empty array: default to OpenAI (spec §4.3 rule 1).
            return Ok(ProviderKind::OpenAi);
        }

        let value_type = reader
            .peek()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
        if value_type != ValueType::Object {
            return Err(Error::UnsupportedFormat);
        }

        reader
            .begin_object()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
        let mut saw_mapping = false;
        let mut saw_chat_messages = false;
        while reader
            .has_next()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?
        {
            let name = reader
                .next_name()
                .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
            match name {
                "mapping" => saw_mapping = true,
                "chat_messages" => saw_chat_messages = true,
                _ => {}
            }
            reader
                .skip_value()
                .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
        }

        let detected = if saw_chat_messages {
            Ok(ProviderKind::Claude)
        } else if saw_mapping {
            Ok(ProviderKind::OpenAi)
        } else {
            Err(Error::UnsupportedFormat)
        };
        if let Ok(kind) = detected {
            tracing::debug!(file = %path.display(), provider = ?kind, "detected provider format");
        }
        detected
    }
}

/// Stateless entry point for every per-provider operation (spec §4.4, §9).
#[derive(Debug, Clone, Copy)]
pub struct Adapter {
    provider: ProviderKind,
}

impl Adapter {
    pub fn new(provider: ProviderKind) -> Self {
        Self { provider }
    }

    /// Detect the provider from `path` and build the matching adapter.
    pub fn detect(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(ProviderKind::detect(path)?))
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Lazily stream every valid [`Conversation`] in the export, in file
    /// order (spec §4.4). Records that fail model validation are reported
    /// through `on_skip` and omitted from the sequence rather than failing
    /// the whole stream; JSON syntax errors are fatal and surface on the
    /// next call to `next()`, after which the iterator is exhausted.
    pub fn stream_conversations<'a>(
        &self,
        path: &Path,
        on_skip: Option<SkipCallback<'a>>,
        progress: Option<ProgressCallback<'a>>,
    ) -> Result<ConversationStream<'a>, Error> {
        let file = open(path)?;
        let mut reader = JsonStreamReader::new(BufReader::new(file));
        reader
            .begin_array()
            .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
        Ok(ConversationStream {
            reader,
            provider: self.provider,
            path: path.to_path_buf(),
            on_skip,
            progress,
            index: 0,
            seen: 0,
            done: false,
            error: None,
        })
    }

    /// Fetch a single conversation by id without materializing the rest of
    /// the export (spec §4.4). Still O(file size) in the worst case, but
    /// O(1) memory: at most one conversation is held at a time.
    pub fn get_conversation_by_id(
        &self,
        path: &Path,
        id: &str,
    ) -> Result<Option<Conversation>, Error> {
        let mut stream = self.stream_conversations(path, None, None)?;
        for conv in &mut stream {
            if conv.id() == id {
                return Ok(Some(conv));
            }
        }
        stream.into_error().map_or(Ok(None), Err)
    }

    /// Fetch a single message (and its owning conversation) by message id
    /// (spec §4.4). `conversation_id` narrows the search when known.
    pub fn get_message_by_id(
        &self,
        path: &Path,
        message_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<Option<(Message, Conversation)>, Error> {
        let mut stream = self.stream_conversations(path, None, None)?;
        for conv in &mut stream {
            if let Some(cid) = conversation_id
                && conv.id() != cid
            {
                continue;
            }
            if let Some(msg) = conv.message_by_id(message_id) {
                let msg = msg.clone();
                return Ok(Some((msg, conv)));
            }
        }
        stream.into_error().map_or(Ok(None), Err)
    }

    /// Run a search over every conversation in the export (spec §4.6).
    pub fn search(&self, path: &Path, query: &SearchQuery) -> Result<Vec<SearchResult>, Error> {
        let stream = self.stream_conversations(path, None, None)?;
        search::run(stream, query)
    }
}

/// Lazy sequence of [`Conversation`]s pulled from a single export file.
/// Yields only records that pass model validation; a fatal parse error
/// ends iteration and is retrievable via [`ConversationStream::into_error`].
pub struct ConversationStream<'a> {
    reader: JsonStreamReader<BufReader<File>>,
    provider: ProviderKind,
    path: std::path::PathBuf,
    on_skip: Option<SkipCallback<'a>>,
    progress: Option<ProgressCallback<'a>>,
    index: usize,
    seen: usize,
    done: bool,
    error: Option<Error>,
}

impl<'a> ConversationStream<'a> {
    /// The fatal error that ended iteration, if any. `None` means either
    /// the stream is still live or it ran to completion successfully.
    pub fn into_error(self) -> Option<Error> {
        self.error
    }

    fn fail(&mut self, err: Error) -> Option<Conversation> {
        self.done = true;
        self.error = Some(err);
        None
    }
}

impl<'a> Iterator for ConversationStream<'a> {
    type Item = Conversation;

    fn next(&mut self) -> Option<Conversation> {
        loop {
            if self.done {
                return None;
            }

            let has_next = match self.reader.has_next() {
                Ok(v) => v,
                Err(e) => {
                    let err = parse_err(&self.path, ParseError::Reader(e));
                    return self.fail(err);
                }
            };
            if !has_next {
                self.done = true;
                if let Err(e) = self.reader.end_array() {
                    return self.fail(parse_err(&self.path, ParseError::Reader(e)));
                }
                return None;
            }

            let index = self.index;
            self.index += 1;

            let normalized = match self.provider {
                ProviderKind::OpenAi => openai::next_conversation(&mut self.reader, &self.path),
                ProviderKind::Claude => claude::next_conversation(&mut self.reader, &self.path),
            };

            match normalized {
                Ok(Ok(conv)) => {
                    self.seen += 1;
                    if let Some(progress) = &mut self.progress {
                        progress(self.seen);
                    }
                    return Some(conv);
                }
                Ok(Err(reason)) => {
                    tracing::warn!(
                        file = %self.path.display(),
                        index,
                        %reason,
                        "skipping invalid conversation record"
                    );
                    if let Some(on_skip) = &mut self.on_skip {
                        on_skip(SkipEvent { index, reason });
                    }
                    continue;
                }
                Err(err) => return self.fail(err),
            }
        }
    }
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn parse_err(path: &Path, source: ParseError) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        source,
    }
}
