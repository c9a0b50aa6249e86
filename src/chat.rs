//! Conversational chat feature.
//!
//! Ties the completion client and the per-user conversation log together:
//! load history, build the persona prompt, call the model, scrub any leaked
//! log formatting from the reply, enforce the platform message length, and
//! record both sides of the exchange.

use crate::chat_log::{ChatLog, LogSender};
use crate::llm_client::{LlmClient, LlmError};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

/// Chat-platform hard cap on message length.
const MESSAGE_LIMIT: usize = 2000;

const PERSONA: &str = "You are responding as a friendly, casual person in a group chat. \
Keep your response conversational, relatable, and authentic, like a real friend would talk. \
Use some casual language, emoji, or slang where appropriate, but don't overdo it. \
Avoid sounding formal or robotic. Don't mention AI, models or prompts. \
You will be given conversation history for context only; do NOT repeat or reference \
the raw log format, timestamps, or markers like [2023-01-01 12:00:00] in your response.";

/// Chat responder bound to one completion client and one log store.
#[derive(Debug, Clone)]
pub struct ChatResponder {
    llm: LlmClient,
    log: ChatLog,
}

impl ChatResponder {
    /// Creates a responder.
    pub fn new(llm: LlmClient, log: ChatLog) -> Self {
        Self { llm, log }
    }

    /// Produces a reply to `query` from `user_id`, updating their log.
    ///
    /// The user's message is logged before the model call so history is
    /// consistent even if the call fails.
    ///
    /// # Errors
    ///
    /// Propagates [`LlmError`] when the completion service is unavailable.
    #[instrument(skip(self, query))]
    pub async fn respond(
        &self,
        user_id: &str,
        context_label: &str,
        query: &str,
    ) -> Result<String, LlmError> {
        let history = self.log.load(user_id);

        if let Err(e) = self
            .log
            .append(user_id, context_label, LogSender::User, query)
        {
            warn!(error = %e, "Failed to log user message");
        }

        let user_message = format!(
            "Here is the conversation history with this user for context only:\n{history}\n\n\
             The user is currently messaging in {context_label}.\n\n\
             Respond ONLY with your direct reply to: \"{query}\"\n\
             Do not include or repeat the conversation history in your response."
        );

        let raw = self.llm.complete(PERSONA, &user_message).await?;
        let reply = truncate_reply(&scrub_log_leakage(&raw));

        if let Err(e) = self
            .log
            .append(user_id, context_label, LogSender::Bot, &reply)
        {
            warn!(error = %e, "Failed to log bot reply");
        }

        Ok(reply)
    }
}

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\]").expect("invalid regex")
});
static LOG_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*\] (USER|BOT):").expect("invalid regex"));

/// Phrases that mean a line is narrating the history rather than replying.
const HISTORY_MARKERS: [&str; 6] = [
    "conversation history",
    "chat history",
    "previous messages",
    "our conversation",
    "earlier conversation",
    "from our previous",
];

/// Removes lines that look like leaked conversation-log entries.
///
/// Models occasionally echo the history verbatim. When a reply carries a
/// `[YYYY-MM-DD HH:MM:SS]` stamp anywhere, every timestamp line,
/// `[...] USER:`/`[...] BOT:` line, and history-marker line is dropped; if
/// that removes everything, a fallback apology is returned.
pub fn scrub_log_leakage(response: &str) -> String {
    if !TIMESTAMP.is_match(response) {
        return response.to_string();
    }

    debug!("Response contained log-like content; scrubbing");
    let cleaned: Vec<&str> = response
        .lines()
        .filter(|line| !leaked_history_line(line))
        .collect();
    let cleaned = cleaned.join("\n").trim().to_string();

    if cleaned.is_empty() {
        "I understand your message, but I'm having trouble formulating a proper response. \
         Could you try asking again in a different way?"
            .to_string()
    } else {
        cleaned
    }
}

fn leaked_history_line(line: &str) -> bool {
    if TIMESTAMP.is_match(line) || LOG_ENTRY.is_match(line) {
        return true;
    }
    let lower = line.to_lowercase();
    HISTORY_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Trims a reply to the platform message limit, char-boundary safe.
pub fn truncate_reply(reply: &str) -> String {
    if reply.chars().count() <= MESSAGE_LIMIT {
        return reply.to_string();
    }
    let mut truncated: String = reply.chars().take(MESSAGE_LIMIT - 3).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_responses_pass_through() {
        let text = "hey! that sounds great 😄";
        assert_eq!(scrub_log_leakage(text), text);
    }

    #[test]
    fn timestamped_lines_are_scrubbed() {
        let text = "[2024-05-01 10:30:00] [dm] USER: hi\nsure, happy to help!";
        assert_eq!(scrub_log_leakage(text), "sure, happy to help!");
    }

    #[test]
    fn fully_leaked_response_falls_back_to_apology() {
        let text = "[2024-05-01 10:30:00] [dm] USER: hi\n[2024-05-01 10:30:05] [dm] BOT: hello";
        assert!(scrub_log_leakage(text).contains("try asking again"));
    }

    #[test]
    fn partial_stamps_do_not_trigger_scrubbing() {
        let text = "[2024-05-01] partial stamp\nall good";
        assert_eq!(scrub_log_leakage(text), text);
        assert!(!leaked_history_line("[abcd-ef-gh ij:kl:mn]"));
    }

    #[test]
    fn history_marker_lines_are_dropped_alongside_timestamps() {
        let text = "Looking at our conversation history:\n\
                    [2024-05-01 10:30:00] [dm] USER: hi\n\
                    anyway, hello!";
        assert_eq!(scrub_log_leakage(text), "anyway, hello!");
    }

    #[test]
    fn marker_phrases_alone_pass_through() {
        // Without a leaked timestamp the reply is taken at face value.
        let text = "I remember our conversation about hiking!";
        assert_eq!(scrub_log_leakage(text), text);
    }

    #[test]
    fn long_replies_are_truncated_at_the_limit() {
        let long = "x".repeat(3000);
        let trimmed = truncate_reply(&long);
        assert_eq!(trimmed.chars().count(), MESSAGE_LIMIT);
        assert!(trimmed.ends_with("..."));

        let short = "short";
        assert_eq!(truncate_reply(short), short);
    }
}
