use crate::errors::{ExportError, ExportResult};
use crate::model::{Channel, ChannelId, Message, MessageId};
use crate::render::{RenderOptions, TranscriptRenderer};
use crate::utils;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Chat-service collaborator: channel/message resolution and history
/// pagination. The exporter never speaks the wire protocol itself.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn resolve_channel(&self, channel_id: ChannelId) -> ExportResult<Channel>;

    async fn fetch_message(
        &self,
        channel: &Channel,
        message_id: MessageId,
    ) -> ExportResult<Message>;

    /// All messages with creation time strictly between `lo` and `hi`,
    /// ascending, consumed to exhaustion. Pagination is the implementation's
    /// concern; the boundary messages themselves must not be included.
    async fn messages_between(
        &self,
        channel: &Channel,
        lo: &Message,
        hi: &Message,
    ) -> ExportResult<Vec<Message>>;
}

/// One export invocation. The two boundary ids delimit the range inclusively;
/// their order carries no meaning.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub channel_id: ChannelId,
    pub start_id: MessageId,
    pub end_id: MessageId,
    pub output_path: PathBuf,
    pub options: RenderOptions,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Transcript written; holds the absolute output path.
    Written(PathBuf),
    /// Renderer produced no document. Reported, not fatal; no file written.
    EmptyTranscript,
}

/// Drives one boundary-to-boundary export: resolve, fetch, order, render,
/// persist. Owns its client for the duration of the call, so the connection
/// is released on every exit path.
pub struct Exporter<C, R> {
    client: C,
    renderer: R,
}

impl<C: ChatClient, R: TranscriptRenderer> Exporter<C, R> {
    pub fn new(client: C, renderer: R) -> Self {
        Self { client, renderer }
    }

    pub async fn export(&self, request: &ExportRequest) -> ExportResult<ExportOutcome> {
        let channel = self.client.resolve_channel(request.channel_id).await?;
        debug!("resolved channel {}", channel.label());

        // The two boundary fetches are independent I/O.
        let (start, end) = tokio::try_join!(
            self.client.fetch_message(&channel, request.start_id),
            self.client.fetch_message(&channel, request.end_id),
        )?;

        // Chronology decides which boundary is which, not argument order.
        let (lo, hi) = if start.timestamp <= end.timestamp {
            (start, end)
        } else {
            (end, start)
        };

        let interior = self.client.messages_between(&channel, &lo, &hi).await?;
        debug!(
            "fetched {} interior messages between {} and {}",
            interior.len(),
            lo.id,
            hi.id
        );

        let sequence = renderer_sequence(lo, interior, hi);
        let Some(document) = self
            .renderer
            .render(&channel, &sequence, &request.options)?
        else {
            warn!("renderer produced no document for channel {}", channel.id);
            return Ok(ExportOutcome::EmptyTranscript);
        };

        let path = persist(&request.output_path, &document)?;
        info!("transcript saved to {}", path.display());
        Ok(ExportOutcome::Written(path))
    }
}

/// Build the sequence handed to the renderer: boundaries plus interior,
/// deduplicated by id, stable-sorted ascending by creation time, then
/// reversed.
///
/// The renderer reverses its input internally (see [`TranscriptRenderer`]),
/// so this final reversal cancels out and the document comes out ascending.
/// Dropping the reversal, or reversing twice, silently yields a descending
/// transcript.
fn renderer_sequence(lo: Message, interior: Vec<Message>, hi: Message) -> Vec<Message> {
    let mut working = Vec::with_capacity(interior.len() + 2);
    working.push(lo);
    working.extend(interior);
    working.push(hi);

    // The interior fetch is exclusive of the boundaries, but if the service
    // ever hands one back anyway it must not render twice. First occurrence
    // wins, so boundaries stay adjacent to their original position.
    let mut seen = HashSet::with_capacity(working.len());
    working.retain(|m| seen.insert(m.id));

    // Stable sort: equal timestamps keep fetch order.
    working.sort_by_key(|m| m.timestamp);
    working.reverse();
    working
}

fn persist(path: &Path, document: &str) -> ExportResult<PathBuf> {
    utils::atomic_write(path, document).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::canonicalize(path).map_err(|e| ExportError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
