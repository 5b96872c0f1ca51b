use gpui::{Pixels, ScrollHandle, point, px};

/// Distance from the tail within which new messages keep the view pinned.
const FOLLOW_THRESHOLD: Pixels = px(32.);

/// Keeps the transcript pinned to its newest message unless the reader has
/// scrolled back through history.
pub struct TranscriptScroll {
    handle: ScrollHandle,
    seen_messages: usize,
    pending_scroll_to_bottom: bool,
}

impl TranscriptScroll {
    pub fn new() -> Self {
        Self {
            handle: ScrollHandle::new(),
            seen_messages: 0,
            pending_scroll_to_bottom: true,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.handle
    }

    /// Records the transcript length seen on this pass.
    pub fn track(&mut self, message_count: usize) {
        if message_count == self.seen_messages {
            return;
        }

        let grew = message_count > self.seen_messages;
        self.seen_messages = message_count;
        if !grew || self.is_near_bottom() {
            self.pending_scroll_to_bottom = true;
        }
    }

    /// Forces the next pass to the newest message, e.g. when the chat opens.
    pub fn reset(&mut self) {
        self.seen_messages = 0;
        self.pending_scroll_to_bottom = true;
    }

    pub fn apply_pending_scroll(&mut self) {
        if !self.pending_scroll_to_bottom {
            return;
        }

        let max_offset = self.handle.max_offset().height;
        let current_x = self.handle.offset().x;
        self.handle
            .set_offset(point(current_x, bottom_offset(max_offset)));
        self.pending_scroll_to_bottom = false;
    }

    fn is_near_bottom(&self) -> bool {
        near_bottom(self.handle.offset().y, self.handle.max_offset().height)
    }
}

impl Default for TranscriptScroll {
    fn default() -> Self {
        Self::new()
    }
}

// gpui scrolls down with negative y offsets, so the tail sits at `-max_offset`.
fn bottom_offset(max_offset: Pixels) -> Pixels {
    if max_offset > Pixels::ZERO {
        -max_offset
    } else {
        Pixels::ZERO
    }
}

fn near_bottom(offset_y: Pixels, max_offset: Pixels) -> bool {
    if max_offset <= Pixels::ZERO {
        return true;
    }
    (offset_y + max_offset).abs() <= FOLLOW_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_transcripts_are_always_at_the_bottom() {
        assert!(near_bottom(Pixels::ZERO, Pixels::ZERO));
        assert_eq!(bottom_offset(Pixels::ZERO), Pixels::ZERO);
    }

    #[test]
    fn reader_scrolled_into_history_is_not_followed() {
        assert!(near_bottom(px(-390.), px(400.)));
        assert!(!near_bottom(px(-100.), px(400.)));
        assert_eq!(bottom_offset(px(400.)), px(-400.));
    }
}
