// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block range planning for windowed `eth_getLogs` queries.
//!
//! RPC providers cap the number of blocks a single log query may span.
//! These types tile an arbitrary inclusive block range into consecutive
//! windows that respect the cap, so a scan can resume deterministically
//! if a window fails part-way through.

use serde::{Deserialize, Serialize};

/// Maximum number of blocks a single log query may span.
///
/// This prevents "query exceeds max block range" rejections from RPC
/// providers. The default of 100,000 blocks matches the cap commonly
/// enforced by public endpoints; stricter providers need a smaller value.
///
/// # Examples
///
/// ```
/// use event_history::MaxWindow;
///
/// let max_window = MaxWindow::DEFAULT;
/// assert_eq!(max_window.as_u64(), 100_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxWindow(u64);

impl MaxWindow {
    /// Cap commonly enforced by public RPC endpoints.
    pub const DEFAULT: Self = Self(100_000);

    /// Create a new window cap.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_history::MaxWindow;
    ///
    /// let max_window = MaxWindow::new(500);
    /// assert_eq!(max_window.as_u64(), 500);
    /// ```
    pub const fn new(blocks: u64) -> Self {
        Self(blocks)
    }

    /// Get the inner u64 value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Number of windows needed to cover an inclusive range.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_history::MaxWindow;
    ///
    /// let max_window = MaxWindow::new(1000);
    /// assert_eq!(max_window.windows_needed(0, 2500), 3);
    /// ```
    pub fn windows_needed(&self, start: u64, end: u64) -> usize {
        if end < start {
            return 0;
        }
        let total_blocks = end - start + 1;
        total_blocks.div_ceil(self.0) as usize
    }

    /// Tile an inclusive block range into scan windows.
    ///
    /// Windows are yielded in strictly increasing order, cover the range
    /// with no gaps and no overlaps, and each spans at most `self` blocks.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_history::{LogWindow, MaxWindow};
    ///
    /// let max_window = MaxWindow::new(1000);
    /// let windows: Vec<_> = max_window.windows(0, 2500).collect();
    ///
    /// assert_eq!(windows.len(), 3);
    /// assert_eq!(windows[0], LogWindow { start: 0, end: 999 });
    /// assert_eq!(windows[2], LogWindow { start: 2000, end: 2500 });
    /// ```
    pub fn windows(&self, start: u64, end: u64) -> WindowIterator {
        WindowIterator {
            current: start,
            end,
            span: self.0,
        }
    }
}

impl Default for MaxWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for MaxWindow {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MaxWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

/// One inclusive block sub-range scanned by a single `eth_getLogs` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogWindow {
    /// First block of the window (inclusive).
    pub start: u64,
    /// Last block of the window (inclusive).
    pub end: u64,
}

impl LogWindow {
    /// Number of blocks covered by the window.
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A window always covers at least one block.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for LogWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Iterator over scan windows.
///
/// Created by [`MaxWindow::windows`]. Yields [`LogWindow`] values in
/// increasing block order.
#[derive(Debug, Clone)]
pub struct WindowIterator {
    current: u64,
    end: u64,
    span: u64,
}

impl Iterator for WindowIterator {
    type Item = LogWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current > self.end {
            return None;
        }

        let start = self.current;
        let end = (self.current + self.span - 1).min(self.end);

        self.current = end + 1;

        Some(LogWindow { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current > self.end {
            (0, Some(0))
        } else {
            let remaining_blocks = self.end - self.current + 1;
            let windows = remaining_blocks.div_ceil(self.span) as usize;
            (windows, Some(windows))
        }
    }
}

impl ExactSizeIterator for WindowIterator {}
