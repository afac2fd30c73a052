use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub location: SourceLocation,
    pub enabled: bool,
}

/// Breakpoint registry, one entry per distinct location. Enumeration keeps
/// insertion order so redraw diffing stays deterministic.
pub struct Breakpoints {
    points: Vec<Breakpoint>,
    index: HashMap<SourceLocation, usize>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Flip the breakpoint at `location` and return the resulting state.
    /// A location seen before keeps its position in `all()`.
    pub fn toggle(&mut self, location: SourceLocation) -> bool {
        if let Some(&i) = self.index.get(&location) {
            let bp = &mut self.points[i];
            bp.enabled = !bp.enabled;
            bp.enabled
        } else {
            self.index.insert(location.clone(), self.points.len());
            self.points.push(Breakpoint {
                location,
                enabled: true,
            });
            true
        }
    }

    /// Force a breakpoint on at `location`; used when restoring a persisted
    /// session.
    pub fn set(&mut self, location: SourceLocation) {
        if !self.is_set(&location) {
            self.toggle(location);
        }
    }

    pub fn is_set(&self, location: &SourceLocation) -> bool {
        self.index
            .get(location)
            .map(|&i| self.points[i].enabled)
            .unwrap_or(false)
    }

    /// All known breakpoints in insertion order, disabled ones included.
    pub fn all(&self) -> &[Breakpoint] {
        &self.points
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.points.clear();
        self.index.clear();
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::new()
    }
}
