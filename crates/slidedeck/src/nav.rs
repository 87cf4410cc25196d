//! Active-slide bookkeeping and the validity rules for navigation targets.

/// Which slide is active, out of a fixed number of slides.
///
/// The active slide is always within `1..=slide_count` or unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    active: Option<u32>,
    slide_count: u32,
}

impl NavigationState {
    pub fn new(slide_count: u32) -> Self {
        Self {
            active: None,
            slide_count,
        }
    }

    pub fn active(&self) -> Option<u32> {
        self.active
    }

    pub fn slide_count(&self) -> u32 {
        self.slide_count
    }

    pub fn in_range(&self, target: i64) -> bool {
        target >= 1 && target <= i64::from(self.slide_count)
    }

    /// Resolve a go-to target: an explicit target wins, then the locator, then
    /// the in-memory active slide.
    pub fn resolve(&self, target: Option<i64>, from_locator: Option<i64>) -> Option<i64> {
        target
            .or(from_locator)
            .or_else(|| self.active.map(i64::from))
    }

    /// Target of a relative move. With nothing active the move counts from zero.
    pub fn offset(&self, delta: i64, from_locator: Option<i64>) -> i64 {
        from_locator
            .or_else(|| self.active.map(i64::from))
            .unwrap_or(0)
            .saturating_add(delta)
    }

    /// Make `target` active if it is in range. Returns the new active slide.
    pub fn select(&mut self, target: i64) -> Option<u32> {
        if !self.in_range(target) {
            return None;
        }
        let slide = u32::try_from(target).ok()?;
        self.active = Some(slide);
        Some(slide)
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

/// Parse the leading integer of `text`, ignoring anything after it.
///
/// `"3"`, `" 3"`, `"+3"` and `"3rd"` all yield 3; text without leading digits
/// yields `None`.
pub fn parse_slide(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}
