use crate::model::{ChannelId, MessageId};
use std::path::PathBuf;
use thiserror::Error;

/// Typed error hierarchy for chatslice.
///
/// Each variant names the operation that failed and the ids involved, so a
/// failed export is diagnosable from the one-line error alone. Leaf plumbing
/// can keep using `anyhow::Result` — the `Internal` variant converts via `?`.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to resolve channel {channel_id}: {reason}")]
    ChannelResolution {
        channel_id: ChannelId,
        reason: String,
    },

    #[error("Failed to resolve message {message_id} in channel {channel_id}: {reason}")]
    MessageResolution {
        channel_id: ChannelId,
        message_id: MessageId,
        reason: String,
    },

    #[error("Failed to fetch history for channel {channel_id}: {reason}")]
    HistoryFetch {
        channel_id: ChannelId,
        reason: String,
    },

    #[error("Failed to render transcript: {0}")]
    Render(String),

    #[error("Failed to write transcript to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using ExportError.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
