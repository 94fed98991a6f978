//! Whole-process scan: every stack variable of every thread, then
//! every global, funneled through one shared block ledger
//!
//! The scan owns iteration order only; all counting happens in the
//! traversal engine. One `VisitedBlocks` ledger spans the entire
//! scan, so memory reachable from two different variables is billed
//! once overall. Root values themselves are deduplicated by address
//! as well: a variable captured identically in two frames, or a
//! global already measured as a stack variable, contributes nothing
//! the second time.

use crate::analyze::traverse::{Traverser, MIN_EXPAND_SIZE};
use crate::analyze::visited::{VisitedBlocks, VisitedValues};
use crate::core::types::{InspectResult, ThreadId};
use crate::host::{DebugHost, StackInspect, SymbolInspect, ValueInspect};
use crate::report::ScanReport;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Restores the originally selected thread when dropped
///
/// The scan switches the host's current thread while it walks
/// stacks; whichever thread was current before the scan must be
/// current again after it, on every exit path.
pub struct SelectedThreadGuard<'a, H: StackInspect> {
    host: &'a H,
    original: Option<ThreadId>,
}

impl<'a, H: StackInspect> SelectedThreadGuard<'a, H> {
    /// Captures the current selection for later restoration
    pub fn capture(host: &'a H) -> InspectResult<Self> {
        let original = host.selected_thread()?;
        Ok(SelectedThreadGuard { host, original })
    }

    /// The thread that will be restored, if any was selected
    pub fn original(&self) -> Option<ThreadId> {
        self.original
    }
}

impl<H: StackInspect> Drop for SelectedThreadGuard<'_, H> {
    fn drop(&mut self) {
        if let Some(thread) = self.original {
            if let Err(err) = self.host.select_thread(thread) {
                warn!(thread, error = %err, "failed to restore selected thread");
            }
        }
    }
}

/// Drives the traversal engine across all roots of the process
pub struct ProcessScanner<'a, H: DebugHost> {
    host: &'a H,
    min_expand_size: usize,
    verbose: bool,
}

impl<'a, H: DebugHost> ProcessScanner<'a, H> {
    pub fn new(host: &'a H) -> Self {
        ProcessScanner {
            host,
            min_expand_size: MIN_EXPAND_SIZE,
            verbose: false,
        }
    }

    /// Overrides the traversal expansion threshold
    pub fn with_min_expand_size(mut self, size: usize) -> Self {
        self.min_expand_size = size;
        self
    }

    /// Logs every measured root at info level instead of debug
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Measures every stack variable in every frame of every thread,
    /// then every global/static variable, and returns the collected
    /// per-root results
    ///
    /// A failure processing one thread or one frame is logged and
    /// scanning continues with the next; only a failure enumerating
    /// threads (or reading the current selection) aborts the scan.
    pub fn scan(&self) -> InspectResult<ScanReport> {
        let _restore = SelectedThreadGuard::capture(self.host)?;

        let traverser = Traverser::new(self.host).with_min_expand_size(self.min_expand_size);
        let mut counted = VisitedBlocks::new();
        let mut roots = VisitedValues::new();
        let mut report = ScanReport::new();

        let threads = self.host.thread_ids()?;
        info!(threads = threads.len(), "scanning stack variables");

        for thread in threads {
            if let Err(err) = self.host.select_thread(thread) {
                warn!(thread, error = %err, "cannot select thread");
                continue;
            }
            let mut frame = match self.host.newest_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(thread, error = %err, "cannot walk thread stack");
                    None
                }
            };
            let mut depth = 0usize;
            while let Some(current) = frame {
                self.scan_frame(
                    &traverser,
                    thread,
                    depth,
                    &current,
                    &mut counted,
                    &mut roots,
                    &mut report,
                );
                frame = self.host.older_frame(&current);
                depth += 1;
            }
        }

        self.scan_globals(&traverser, &mut counted, &mut roots, &mut report);
        Ok(report)
    }

    fn scan_frame(
        &self,
        traverser: &Traverser<'_, H>,
        thread: ThreadId,
        depth: usize,
        frame: &H::FrameRef,
        counted: &mut VisitedBlocks,
        roots: &mut VisitedValues,
        report: &mut ScanReport,
    ) {
        let frame_label = self
            .host
            .frame_name(frame)
            .unwrap_or_else(|| "??".to_string());
        debug!(thread, frame = depth, name = %frame_label, "scanning frame");

        let mut names: HashSet<String> = HashSet::new();
        let mut scope = self.host.frame_scope(frame);
        while let Some(current) = scope {
            // Globals and statics are measured after all threads.
            if self.host.is_static_scope(&current) {
                break;
            }
            for (name, value) in self.host.scope_variables(&current, frame) {
                // Inner scopes shadow outer ones within a frame.
                if !names.insert(name.clone()) {
                    continue;
                }
                // Register-resident values have no address and are
                // always measured; addressable roots are billed once
                // across the whole scan.
                if let Some(addr) = self.host.address_of(&value) {
                    if !roots.claim(addr) {
                        continue;
                    }
                }
                let usage = traverser.measure(&name, value, counted);
                if self.verbose {
                    info!(thread, frame = depth, symbol = %name, heap = usage.bytes, blocks = usage.blocks, "measured");
                } else {
                    debug!(thread, frame = depth, symbol = %name, heap = usage.bytes, blocks = usage.blocks, "measured");
                }
                if !usage.is_zero() {
                    report.push(format!("thread {} frame [{}] {}", thread, depth, name), usage);
                }
            }
            scope = self.host.parent_scope(&current);
        }
    }

    fn scan_globals(
        &self,
        traverser: &Traverser<'_, H>,
        counted: &mut VisitedBlocks,
        roots: &mut VisitedValues,
        report: &mut ScanReport,
    ) {
        let mut globals = match self.host.global_variables() {
            Ok(globals) => globals,
            Err(err) => {
                warn!(error = %err, "cannot enumerate global variables");
                return;
            }
        };
        info!(globals = globals.len(), "scanning global variables");
        globals.sort_by(|a, b| a.source_file.cmp(&b.source_file));

        for global in globals {
            // A global whose address was already billed as a stack
            // variable contributes nothing further.
            if let Some(addr) = self.host.address_of(&global.value) {
                if !roots.claim(addr) {
                    continue;
                }
            }
            let usage = traverser.measure(&global.name, global.value, counted);
            if self.verbose {
                info!(symbol = %global.name, heap = usage.bytes, blocks = usage.blocks, "measured global");
            } else {
                debug!(symbol = %global.name, heap = usage.bytes, blocks = usage.blocks, "measured global");
            }
            if !usage.is_zero() {
                let label = match &global.source_file {
                    Some(file) => format!("{} {}", file, global.name),
                    None => global.name.clone(),
                };
                report.push(label, usage);
            }
        }
    }
}
