// src/notify/mod.rs
pub mod telegram;

pub use telegram::{Delivery, TelegramNotifier};

use chrono::{DateTime, Utc};

use crate::ingest::types::Candidate;

/// Render the ranked candidates as one Telegram-HTML message.
///
/// Header line, then one numbered block per candidate (bold title over its
/// link), blocks separated by blank lines. Feed-supplied text is escaped so
/// markup characters cannot break the message.
pub fn render_digest(title: &str, generated_at: DateTime<Utc>, items: &[Candidate]) -> String {
    let mut out = format!(
        "🗞 <b>{} ({})</b>",
        html_escape::encode_text(title),
        generated_at.format("%Y-%m-%d")
    );

    for (i, item) in items.iter().enumerate() {
        out.push_str("\n\n");
        out.push_str(&format!(
            "{}. <b>{}</b>\n{}",
            i + 1,
            html_escape::encode_text(&item.title),
            html_escape::encode_text(&item.link)
        ));
    }

    out
}
