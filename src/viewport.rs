use crate::errors::DebugError;

/// Minimal ordered set of line mounts/unmounts produced by one viewport
/// operation, consumed once by the renderer. `cursor` is `None` only while
/// the buffer is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewDiff {
    pub unmount: Vec<usize>,
    pub mount: Vec<usize>,
    pub cursor: Option<usize>,
}

/// The visible sub-range of a line buffer in a fixed-height window, with a
/// cursor that is always kept inside the window.
///
/// `resize` and `reload` are full recomputes; `move_cursor` slides the
/// window just far enough to keep the cursor at the edge it crossed, one
/// mount/unmount per line of overflow, so a renderer never repaints a full
/// page for a one-line move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    total: usize,
    height: usize,
    start: usize,
    end: usize,
    cursor: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Result<Self, DebugError> {
        if height == 0 {
            return Err(DebugError::ViewportUnderflow(
                "height must be positive".to_string(),
            ));
        }
        Ok(Self {
            total: 0,
            height,
            start: 0,
            end: 0,
            cursor: 0,
        })
    }

    /// Recompute the window for a new height, keeping the cursor visible.
    /// A zero height is rejected and the prior state retained.
    pub fn resize(&mut self, height: usize) -> Result<ViewDiff, DebugError> {
        if height == 0 {
            return Err(DebugError::ViewportUnderflow(
                "height must be positive".to_string(),
            ));
        }
        self.height = height;
        Ok(self.recompute())
    }

    /// Replace the buffer, e.g. when the displayed file or frame changes.
    /// A cursor past the new end is clamped rather than rejected; the buffer
    /// just changed under the caller.
    pub fn reload(&mut self, total: usize, cursor: usize) -> ViewDiff {
        self.total = total;
        self.cursor = if total == 0 { 0 } else { cursor.min(total - 1) };
        self.recompute()
    }

    // Full window recompute: everything previously mounted goes, the new
    // window comes in. start = max(0, cursor + 1 - height).
    fn recompute(&mut self) -> ViewDiff {
        let unmount: Vec<usize> = (self.start..self.end).collect();
        self.start = (self.cursor + 1).saturating_sub(self.height);
        self.end = (self.start + self.height).min(self.total);
        ViewDiff {
            unmount,
            mount: (self.start..self.end).collect(),
            cursor: self.cursor_index(),
        }
    }

    /// Move the cursor by `delta`, clamped to the buffer, sliding the window
    /// only by the amount the cursor overflowed it.
    pub fn move_cursor(&mut self, delta: isize) -> ViewDiff {
        if self.total == 0 {
            return ViewDiff::default();
        }
        let max = self.total as isize - 1;
        let next = (self.cursor as isize + delta).clamp(0, max) as usize;
        self.cursor = next;
        let width = self.end - self.start;

        if next >= self.end {
            // Cursor crossed the bottom: the window follows so the cursor
            // lands on its trailing edge. Mount/unmount only the rows that
            // actually entered and left, even across a multi-page jump.
            let new_end = next + 1;
            let new_start = new_end - width;
            let unmount = (self.start..new_start.min(self.end)).collect();
            let mount = (new_start.max(self.end)..new_end).collect();
            self.start = new_start;
            self.end = new_end;
            ViewDiff {
                unmount,
                mount,
                cursor: Some(next),
            }
        } else if next < self.start {
            // Symmetric: cursor crossed the top, window leads with it.
            let new_start = next;
            let new_end = new_start + width;
            let unmount = (new_end.max(self.start)..self.end).collect();
            let mount = (new_start..new_end.min(self.start)).collect();
            self.start = new_start;
            self.end = new_end;
            ViewDiff {
                unmount,
                mount,
                cursor: Some(next),
            }
        } else {
            ViewDiff {
                unmount: Vec::new(),
                mount: Vec::new(),
                cursor: Some(next),
            }
        }
    }

    fn cursor_index(&self) -> Option<usize> {
        if self.total == 0 {
            None
        } else {
            Some(self.cursor)
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The `[start, end)` window of visible line indices.
    pub fn window(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Cursor index, `None` while the buffer is empty.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor_index()
    }
}
