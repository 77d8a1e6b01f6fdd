use crate::discord::DiscordClient;
use crate::export::{ExportOutcome, ExportRequest, Exporter};
use crate::model::{ChannelId, MessageId};
use crate::render::{HtmlRenderer, RenderOptions};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Parser)]
#[command(name = "chatslice", version)]
#[command(about = "Export a range of Discord channel messages to an HTML transcript")]
pub struct Cli {
    /// Bot token used to authenticate against the Discord API
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// Channel containing the message range
    #[arg(long)]
    channel_id: ChannelId,

    /// One boundary message id (inclusive; order relative to --end does not matter)
    #[arg(long)]
    start: MessageId,

    /// The other boundary message id (inclusive)
    #[arg(long)]
    end: MessageId,

    /// Output file path; parent directories are created as needed
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// IANA timezone for message timestamps
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Use 24-hour time format
    #[arg(long)]
    military_time: bool,
}

impl Cli {
    fn into_request(self) -> (String, ExportRequest) {
        let request = ExportRequest {
            channel_id: self.channel_id,
            start_id: self.start,
            end_id: self.end,
            output_path: self.output,
            options: RenderOptions {
                timezone: self.timezone,
                military_time: self.military_time,
                fancy_times: true,
            },
        };
        (self.token, request)
    }
}

pub async fn run() -> Result<()> {
    let (token, request) = Cli::parse().into_request();
    let exporter = Exporter::new(DiscordClient::new(token), HtmlRenderer);

    match exporter.export(&request).await {
        Ok(ExportOutcome::Written(path)) => {
            println!("{}", path.display());
            Ok(())
        }
        Ok(ExportOutcome::EmptyTranscript) => {
            warn!("transcript generation returned no content; nothing written");
            Ok(())
        }
        Err(err) => {
            error!("export failed: {err}");
            Err(err.into())
        }
    }
}
