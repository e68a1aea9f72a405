//! Recalculation order
//!
//! Depth-first walk over dependents starting at an edited cell. The walk
//! tracks the current path; meeting a cell that is already on the path means
//! the graph has a cycle through it.

use ahash::AHashSet;
use tabula_formula::DependencyGraph;

use crate::error::{Error, Result};

/// Every cell that must be recomputed after `start` changes, in an order
/// where each cell comes after everything it depends on
///
/// `start` is always first. Fails with [`Error::CircularReference`] if a
/// cycle is reachable from `start`. The walk keeps its own stack of frames,
/// so chain length is bounded by memory rather than by the thread's stack.
pub(crate) fn cells_to_recalculate(graph: &DependencyGraph, start: &str) -> Result<Vec<String>> {
    let mut order = Vec::new();
    let mut visited: AHashSet<String> = AHashSet::new();
    let mut path: AHashSet<String> = AHashSet::new();

    path.insert(start.to_string());
    let mut stack = vec![Frame::new(graph, start)];

    while let Some(frame) = stack.last_mut() {
        if let Some(dependent) = frame.dependents.get(frame.next_idx).cloned() {
            frame.next_idx += 1;

            if path.contains(&dependent) {
                return Err(Error::CircularReference(dependent));
            }
            if !visited.contains(&dependent) {
                path.insert(dependent.clone());
                stack.push(Frame::new(graph, &dependent));
            }
        } else {
            // All dependents done, so the cell is finished
            let Some(Frame { cell: finished, .. }) = stack.pop() else {
                break;
            };
            path.remove(&finished);
            visited.insert(finished.clone());
            order.push(finished);
        }
    }

    order.reverse();
    Ok(order)
}

/// A cell on the current path and how far through its dependents the walk is
struct Frame {
    cell: String,
    dependents: Vec<String>,
    next_idx: usize,
}

impl Frame {
    fn new(graph: &DependencyGraph, cell: &str) -> Self {
        // Sorted so the order and any reported cycle are reproducible
        let mut dependents: Vec<String> = graph.iter_dependents(cell).map(str::to_string).collect();
        dependents.sort_unstable();
        Frame {
            cell: cell.to_string(),
            dependents,
            next_idx: 0,
        }
    }
}
