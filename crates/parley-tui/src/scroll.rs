//! Transcript scrolling.
//!
//! The view follows the newest message unless the user scrolls away. Any
//! change to the message list snaps it back to the newest entry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Keep the bottom of the transcript in view.
    FollowLatest,
    /// User scrolled manually; offset is the line index from the top.
    Anchored { offset: usize },
}

#[derive(Debug, Clone)]
pub struct ScrollAnchor {
    pub mode: ScrollMode,
    /// Transcript line count measured on the last frame.
    pub line_count: usize,
    /// Viewport height measured on the last frame.
    pub viewport_height: usize,
    /// Message list revision last observed.
    seen_revision: u64,
}

impl Default for ScrollAnchor {
    fn default() -> Self {
        Self {
            mode: ScrollMode::FollowLatest,
            line_count: 0,
            viewport_height: 0,
            seen_revision: 0,
        }
    }
}

impl ScrollAnchor {
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    /// Reacts to the message list revision; a new revision means an append or
    /// a replace, so the newest entry should be shown.
    pub fn observe(&mut self, revision: u64) {
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.mode = ScrollMode::FollowLatest;
        }
    }

    pub fn measure(&mut self, line_count: usize, viewport_height: usize) {
        self.line_count = line_count;
        self.viewport_height = viewport_height;
    }

    fn max_offset(&self) -> usize {
        self.line_count.saturating_sub(self.viewport_height)
    }

    pub fn offset(&self) -> usize {
        match self.mode {
            ScrollMode::FollowLatest => self.max_offset(),
            ScrollMode::Anchored { offset } => offset.min(self.max_offset()),
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let offset = self.offset().saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset };
    }

    /// Scrolls down, resuming follow mode at the bottom.
    pub fn scroll_down(&mut self, lines: usize) {
        if self.is_following() {
            return;
        }
        let offset = (self.offset() + lines).min(self.max_offset());
        self.mode = if offset >= self.max_offset() {
            ScrollMode::FollowLatest
        } else {
            ScrollMode::Anchored { offset }
        };
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.mode = ScrollMode::Anchored { offset: 0 };
    }

    pub fn scroll_to_bottom(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(lines: usize, height: usize) -> ScrollAnchor {
        let mut anchor = ScrollAnchor::default();
        anchor.measure(lines, height);
        anchor
    }

    #[test]
    fn test_follow_mode_shows_bottom() {
        let anchor = measured(50, 10);
        assert_eq!(anchor.offset(), 40);
    }

    #[test]
    fn test_scroll_up_anchors_and_down_resumes_follow() {
        let mut anchor = measured(50, 10);

        anchor.scroll_up(5);
        assert_eq!(anchor.mode, ScrollMode::Anchored { offset: 35 });

        anchor.scroll_down(10);
        assert!(anchor.is_following());
    }

    #[test]
    fn test_new_revision_snaps_back_to_latest() {
        let mut anchor = measured(50, 10);
        anchor.observe(1);
        anchor.page_up();
        assert!(!anchor.is_following());

        anchor.observe(1);
        assert!(!anchor.is_following());

        anchor.observe(2);
        assert!(anchor.is_following());
    }

    #[test]
    fn test_offset_clamps_when_content_shrinks() {
        let mut anchor = measured(50, 10);
        anchor.scroll_up(5);
        anchor.measure(12, 10);
        assert_eq!(anchor.offset(), 2);
    }
}
