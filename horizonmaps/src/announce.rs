//! Spoken guidance output.
//!
//! The guidance session hands instruction text to an [`AnnouncementSink`].
//! Speech synthesis lives outside this crate; the sinks here log, print, or
//! record.

use std::sync::Mutex;

/// Receives instruction text to be spoken.
///
/// Implementations must not block: the session calls this from its event
/// loop.
pub trait AnnouncementSink: Send + Sync {
    /// Speak `text` in `language` (BCP-47 tag, e.g. `"es"`).
    fn announce(&self, text: &str, language: &str);
}

/// Writes announcements to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl AnnouncementSink for TracingAnnouncer {
    fn announce(&self, text: &str, language: &str) {
        tracing::info!(language = %language, "Announcement: {}", text);
    }
}

/// One recorded announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub language: String,
}

/// Keeps every announcement in memory.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    announcements: Mutex<Vec<Announcement>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything announced so far.
    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Announced texts, in order.
    pub fn texts(&self) -> Vec<String> {
        self.announcements().into_iter().map(|a| a.text).collect()
    }
}

impl AnnouncementSink for RecordingAnnouncer {
    fn announce(&self, text: &str, language: &str) {
        if let Ok(mut announcements) = self.announcements.lock() {
            announcements.push(Announcement {
                text: text.to_string(),
                language: language.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_announcer() {
        let sink = RecordingAnnouncer::new();
        sink.announce("Turn left", "en");
        sink.announce("Gire a la derecha", "es");

        assert_eq!(sink.texts(), vec!["Turn left", "Gire a la derecha"]);
        assert_eq!(sink.announcements()[1].language, "es");
    }

    #[test]
    fn test_sinks_are_object_safe() {
        let sinks: Vec<Box<dyn AnnouncementSink>> =
            vec![Box::new(TracingAnnouncer), Box::new(RecordingAnnouncer::new())];
        for sink in &sinks {
            sink.announce("Continue straight", "en");
        }
    }
}
