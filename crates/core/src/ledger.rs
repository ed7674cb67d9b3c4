//! Live GPU object accounting.
//!
//! Every helper that creates or deletes a GL object reports it to the
//! device's [`ResourceLedger`]. Comparing two [`LedgerSnapshot`]s taken
//! around a construct/destruct pair (or around a failed construct) shows
//! whether anything leaked.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Kinds of GL objects owned by transition instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResource {
    Framebuffer,
    Renderbuffer,
    Texture,
    Buffer,
    VertexArray,
    Program,
    Shader,
}

impl GpuResource {
    /// All kinds, in ledger slot order.
    pub const ALL: [GpuResource; 7] = [
        GpuResource::Framebuffer,
        GpuResource::Renderbuffer,
        GpuResource::Texture,
        GpuResource::Buffer,
        GpuResource::VertexArray,
        GpuResource::Program,
        GpuResource::Shader,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GpuResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GpuResource::Framebuffer => "framebuffer",
            GpuResource::Renderbuffer => "renderbuffer",
            GpuResource::Texture => "texture",
            GpuResource::Buffer => "buffer",
            GpuResource::VertexArray => "vertex array",
            GpuResource::Program => "program",
            GpuResource::Shader => "shader",
        };
        f.write_str(name)
    }
}

/// Thread-safe counters of live GL objects, one per [`GpuResource`], plus
/// a running count of GL error flags popped on the device.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    live: [AtomicUsize; 7],
    gl_errors: AtomicUsize,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that one object of `kind` was created.
    pub fn allocated(&self, kind: GpuResource) {
        self.live[kind.slot()].fetch_add(1, Ordering::Relaxed);
    }

    /// Records that one object of `kind` was deleted.
    ///
    /// Saturates at zero: a release without a matching allocation is logged
    /// rather than wrapping the counter.
    pub fn released(&self, kind: GpuResource) {
        let result = self.live[kind.slot()].fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
            n.checked_sub(1)
        });
        if result.is_err() {
            tracing::warn!("released a {kind} the ledger never saw allocated");
        }
    }

    /// Current number of live objects of `kind`.
    pub fn live(&self, kind: GpuResource) -> usize {
        self.live[kind.slot()].load(Ordering::Relaxed)
    }

    /// Records `count` GL error flags popped from the context.
    pub fn errors_raised(&self, count: usize) {
        self.gl_errors.fetch_add(count, Ordering::Relaxed);
    }

    /// Total GL error flags popped since the ledger was created.
    pub fn gl_errors(&self) -> usize {
        self.gl_errors.load(Ordering::Relaxed)
    }

    /// Copies all counters at once.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            live: GpuResource::ALL.map(|kind| self.live(kind)),
        }
    }
}

/// Point-in-time copy of a [`ResourceLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    live: [usize; 7],
}

impl LedgerSnapshot {
    pub fn get(&self, kind: GpuResource) -> usize {
        self.live[kind.slot()]
    }

    /// Total number of live objects across all kinds.
    pub fn total(&self) -> usize {
        self.live.iter().sum()
    }

    /// Per-kind growth from `earlier` to `self`, as signed deltas.
    pub fn delta_since(&self, earlier: &LedgerSnapshot) -> Vec<(GpuResource, isize)> {
        GpuResource::ALL
            .iter()
            .map(|&kind| (kind, self.get(kind) as isize - earlier.get(kind) as isize))
            .filter(|&(_, d)| d != 0)
            .collect()
    }
}
