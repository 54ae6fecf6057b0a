//! HTML fragment renderers for the transcript, summary, and statistics
//! tabs. Every server-provided string is escaped before insertion; the
//! server is not trusted to hand back markup-safe text.

use crate::api::{StatsPayload, SummaryPayload};

const SUMMARY_MISMATCH_MESSAGE: &str = "Summary data is inconsistent. Please try again.";
const STATS_MALFORMED_MESSAGE: &str = "Statistics data is inconsistent. Please try again.";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One `<div>` per speaker turn, in conversation order.
pub fn render_transcript(conversation: &[String]) -> String {
    let mut out = String::new();
    for entry in conversation {
        out.push_str("<div class=\"transcript-line\">");
        out.push_str(&escape_html(entry));
        out.push_str("</div>\n");
    }
    out
}

/// Two-column table (Speaker, Summary) zipped positionally. A server error
/// renders as a plain message; mismatched column lengths are treated as an
/// error rather than silently truncated.
pub fn render_summary(payload: &SummaryPayload) -> String {
    if let Some(error) = payload.error.as_deref() {
        return error_paragraph(error);
    }

    if payload.speakers.len() != payload.summaries.len() {
        tracing::warn!(
            "Summary columns differ in length: {} speakers, {} summaries",
            payload.speakers.len(),
            payload.summaries.len()
        );
        return error_paragraph(SUMMARY_MISMATCH_MESSAGE);
    }

    let mut out = String::from("<table>\n<tr><th>Speaker</th><th>Summary</th></tr>\n");
    for (speaker, summary) in payload.speakers.iter().zip(&payload.summaries) {
        out.push_str("<tr><td>");
        out.push_str(&escape_html(speaker));
        out.push_str("</td><td>");
        out.push_str(&escape_html(summary));
        out.push_str("</td></tr>\n");
    }
    out.push_str("</table>\n");
    out
}

/// Duration (two decimal places), total word count, and one row per speaker
/// in the payload's own key order.
pub fn render_stats(payload: &StatsPayload) -> String {
    if let Some(error) = payload.error.as_deref() {
        return error_paragraph(error);
    }

    let Some(speaker_counts) = payload.speaker_counts() else {
        tracing::warn!("Non-integer word count in stats payload");
        return error_paragraph(STATS_MALFORMED_MESSAGE);
    };

    let mut out = String::from("<table>\n");
    out.push_str(&format!(
        "<tr><td>Audio Duration (m)</td><td>{:.2}</td></tr>\n",
        payload.audio_duration
    ));
    out.push_str(&format!(
        "<tr><td>Total Words</td><td>{}</td></tr>\n",
        payload.total_words
    ));
    for (speaker, count) in &speaker_counts {
        out.push_str(&format!(
            "<tr><td>Words by {}</td><td>{}</td></tr>\n",
            escape_html(speaker),
            count
        ));
    }
    out.push_str("</table>\n");
    out
}

fn error_paragraph(message: &str) -> String {
    format!("<p>{}</p>", escape_html(message))
}
