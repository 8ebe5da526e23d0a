//! Page-lifetime audio session.
//!
//! The browser lets a media element be bound into a decode graph only once,
//! and only one decoding context should exist per page. `AudioSession` holds
//! that graph behind an idempotent initializer: the first call builds it,
//! later calls return the cached graph, and a failed build is remembered so
//! it is never retried.

use std::fmt::Display;

#[derive(Debug)]
enum GraphSlot<G> {
    Unbuilt,
    Built(G),
    Unavailable,
}

#[derive(Debug)]
pub struct AudioSession<G> {
    slot: GraphSlot<G>,
}

impl<G> Default for AudioSession<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> AudioSession<G> {
    pub fn new() -> Self {
        Self {
            slot: GraphSlot::Unbuilt,
        }
    }

    /// Return the graph, building it with `build` on first use. Build errors
    /// are logged and leave the session permanently without a graph;
    /// playback is expected to continue without visualization.
    pub fn ensure_graph<E, F>(&mut self, build: F) -> Option<&G>
    where
        E: Display,
        F: FnOnce() -> Result<G, E>,
    {
        if let GraphSlot::Unbuilt = self.slot {
            self.slot = match build() {
                Ok(g) => {
                    log::info!("[audio] graph ready");
                    GraphSlot::Built(g)
                }
                Err(e) => {
                    log::warn!("[audio] graph unavailable, visualization disabled: {}", e);
                    GraphSlot::Unavailable
                }
            };
        }
        self.graph()
    }

    pub fn graph(&self) -> Option<&G> {
        match &self.slot {
            GraphSlot::Built(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self.slot, GraphSlot::Built(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.slot, GraphSlot::Unavailable)
    }
}
