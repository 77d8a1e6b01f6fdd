use crate::errors::{ExportError, ExportResult};
use crate::model::{Channel, Message};
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

/// Rendering options passed through from the CLI surface. The timezone is
/// only validated here, at render time, when it is parsed as an IANA name.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// IANA timezone name used for all message timestamps.
    pub timezone: String,
    /// 24-hour time format instead of 12-hour.
    pub military_time: bool,
    /// Day-separator headings with time-only stamps per message.
    pub fancy_times: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            military_time: false,
            fancy_times: true,
        }
    }
}

/// Converts an ordered message sequence into a document.
///
/// Contract: implementations reverse the given sequence before rendering.
/// A caller that needs ascending output must hand over a descending
/// sequence — the exporter's compensating pre-reversal depends on exactly
/// one internal reversal happening here, and the export tests guard the
/// contract with a recording double.
pub trait TranscriptRenderer: Send + Sync {
    /// Render the (descending) sequence into a document. `Ok(None)` means
    /// there was nothing to render; it is not an error.
    fn render(
        &self,
        channel: &Channel,
        messages: &[Message],
        options: &RenderOptions,
    ) -> ExportResult<Option<String>>;
}

/// Built-in renderer producing a self-contained HTML document.
pub struct HtmlRenderer;

const STYLE: &str = "\
body{font-family:sans-serif;max-width:46rem;margin:0 auto;padding:1rem;background:#313338;color:#dbdee1}\
header{border-bottom:1px solid #3f4147;margin-bottom:1rem}\
h1{font-size:1.3rem}.meta{color:#949ba4;font-size:.85rem}\
.day{color:#949ba4;font-size:.8rem;text-align:center;border-bottom:1px solid #3f4147;margin:1rem 0 .5rem}\
.message{margin:.6rem 0}.author{font-weight:600;margin-right:.5rem}\
.time{color:#949ba4;font-size:.8rem}.edited{color:#949ba4;font-size:.75rem;margin-left:.3rem}\
.content{margin:.15rem 0;white-space:pre-wrap}\
.attachments{list-style:none;padding-left:0;font-size:.85rem}\
.attachments a{color:#00a8fc}";

impl HtmlRenderer {
    fn time_format(options: &RenderOptions) -> &'static str {
        match (options.fancy_times, options.military_time) {
            (true, true) => "%H:%M",
            (true, false) => "%-I:%M %p",
            (false, true) => "%Y-%m-%d %H:%M",
            (false, false) => "%Y-%m-%d %-I:%M %p",
        }
    }
}

impl TranscriptRenderer for HtmlRenderer {
    fn render(
        &self,
        channel: &Channel,
        messages: &[Message],
        options: &RenderOptions,
    ) -> ExportResult<Option<String>> {
        if messages.is_empty() {
            return Ok(None);
        }

        let tz: Tz = options
            .timezone
            .parse()
            .map_err(|_| ExportError::Render(format!("unknown timezone: {}", options.timezone)))?;
        let time_format = Self::time_format(options);

        let label = html_escape::encode_text(&channel.label()).into_owned();
        let mut out = String::with_capacity(messages.len() * 256 + STYLE.len());
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{} — transcript</title>\n", label));
        out.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));
        out.push_str(&format!(
            "<header>\n<h1>{}</h1>\n<p class=\"meta\">{} messages</p>\n</header>\n<main>\n",
            label,
            messages.len()
        ));

        // The input arrives descending; this reversal is the documented
        // renderer contract and produces an ascending document.
        let mut current_day: Option<NaiveDate> = None;
        for msg in messages.iter().rev() {
            let local = msg.timestamp.with_timezone(&tz);

            if options.fancy_times {
                let day = local.date_naive();
                if current_day != Some(day) {
                    current_day = Some(day);
                    out.push_str(&format!(
                        "<div class=\"day\">{}</div>\n",
                        local.format("%A, %B %-d, %Y")
                    ));
                }
            }

            out.push_str("<div class=\"message\">");
            out.push_str(&format!(
                "<span class=\"author\">{}</span>",
                html_escape::encode_text(msg.author.display_name())
            ));
            out.push_str(&format!(
                "<span class=\"time\">{}</span>",
                local.format(time_format)
            ));
            if msg.edited_timestamp.is_some() {
                out.push_str("<span class=\"edited\">(edited)</span>");
            }
            if !msg.content.is_empty() {
                out.push_str(&format!(
                    "<p class=\"content\">{}</p>",
                    html_escape::encode_text(&msg.content)
                ));
            }
            if !msg.attachments.is_empty() {
                out.push_str("<ul class=\"attachments\">");
                for att in &msg.attachments {
                    out.push_str(&format!(
                        "<li><a href=\"{}\">{}</a></li>",
                        html_escape::encode_double_quoted_attribute(&att.url),
                        html_escape::encode_text(&att.filename)
                    ));
                }
                out.push_str("</ul>");
            }
            out.push_str("</div>\n");
        }

        out.push_str("</main>\n</body>\n</html>\n");
        debug!(
            "rendered {} messages for channel {}",
            messages.len(),
            channel.id
        );
        Ok(Some(out))
    }
}
