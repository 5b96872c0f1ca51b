/// Share of the footer that must be on screen before it counts as visible.
pub const FOOTER_VISIBILITY_THRESHOLD: f32 = 0.1;

/// Vertical extent in page coordinates, `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn new(top: f32, bottom: f32) -> Self {
        if top <= bottom {
            Self { top, bottom }
        } else {
            Self {
                top: bottom,
                bottom: top,
            }
        }
    }

    pub fn from_origin(top: f32, height: f32) -> Self {
        Self::new(top, top + height.max(0.0))
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn overlap(&self, other: &Span) -> f32 {
        (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0)
    }
}

/// Returns true when `footer` intersects `viewport` by at least `threshold`
/// of its own height.
pub fn footer_intersects(viewport: Span, footer: Span, threshold: f32) -> bool {
    let height = footer.height();
    if height <= f32::EPSILON {
        return footer.top >= viewport.top && footer.top <= viewport.bottom;
    }

    let ratio = viewport.overlap(&footer) / height;
    ratio > 0.0 && ratio >= threshold
}

/// Tracks footer visibility and reports only changes, the way an
/// intersection observer delivers entries.
#[derive(Debug, Clone)]
pub struct FooterObserver {
    threshold: f32,
    last: Option<bool>,
}

impl FooterObserver {
    pub fn new() -> Self {
        Self::with_threshold(FOOTER_VISIBILITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            last: None,
        }
    }

    /// Feeds fresh geometry. Returns `Some(visible)` when visibility changed.
    pub fn observe(&mut self, viewport: Span, footer: Span) -> Option<bool> {
        let visible = footer_intersects(viewport, footer, self.threshold);
        if self.last == Some(visible) {
            return None;
        }

        self.last = Some(visible);
        Some(visible)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for FooterObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases a host listener (keyboard hook, intersection observer) on drop.
#[must_use = "dropping a subscription releases it immediately"]
pub struct Subscription {
    label: &'static str,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(label: &'static str, release: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            release: Some(Box::new(release)),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(subscription = self.label, "releasing listener");
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const VIEWPORT: Span = Span {
        top: 1000.0,
        bottom: 1800.0,
    };

    #[test]
    fn footer_below_the_fold_is_hidden() {
        let footer = Span::from_origin(2400.0, 200.0);
        assert!(!footer_intersects(VIEWPORT, footer, FOOTER_VISIBILITY_THRESHOLD));
    }

    #[test]
    fn threshold_applies_to_the_footer_height() {
        // 15px of a 200px footer is 7.5%.
        let peeking = Span::from_origin(1785.0, 200.0);
        // 25px of a 200px footer is 12.5%.
        let showing = Span::from_origin(1775.0, 200.0);

        assert!(!footer_intersects(VIEWPORT, peeking, FOOTER_VISIBILITY_THRESHOLD));
        assert!(footer_intersects(VIEWPORT, showing, FOOTER_VISIBILITY_THRESHOLD));
    }

    #[test]
    fn observer_reports_only_changes() {
        let mut observer = FooterObserver::new();
        let hidden = Span::from_origin(2400.0, 200.0);
        let visible = Span::from_origin(1700.0, 200.0);

        assert_eq!(observer.observe(VIEWPORT, hidden), Some(false));
        assert_eq!(observer.observe(VIEWPORT, hidden), None);
        assert_eq!(observer.observe(VIEWPORT, visible), Some(true));
        assert_eq!(observer.observe(VIEWPORT, visible), None);

        observer.reset();
        assert_eq!(observer.observe(VIEWPORT, visible), Some(true));
    }

    #[test]
    fn subscription_releases_exactly_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();

        let subscription = Subscription::new("keyboard", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(subscription.label(), "keyboard");
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(subscription);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
