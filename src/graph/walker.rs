//! Depth-bounded export tree traversal
//!
//! Export trees come from third-party files, so traversal uses an explicit
//! stack instead of recursion and refuses trees nested deeper than the
//! configured ceiling.

use crate::error::{ComputeError, Result};
use serde_json::{Map, Value};

/// Visit every object node in `root`.
///
/// Arrays are walked element-wise and every field value of every object is
/// walked, so objects nested anywhere are reached. Scalars are skipped. The
/// root sits at depth 0; a container deeper than `max_depth` aborts the walk
/// with [`ComputeError::DepthExceeded`].
pub fn walk_objects<'a, F>(root: &'a Value, max_depth: usize, mut visit: F) -> Result<()>
where
    F: FnMut(&'a Map<String, Value>),
{
    let mut stack: Vec<(&'a Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        let children = match node {
            Value::Array(items) => items,
            Value::Object(fields) => {
                check_depth(depth, max_depth)?;
                visit(fields);
                stack.extend(fields.values().map(|child| (child, depth + 1)));
                continue;
            }
            _ => continue,
        };

        check_depth(depth, max_depth)?;
        stack.extend(children.iter().map(|child| (child, depth + 1)));
    }

    Ok(())
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(ComputeError::DepthExceeded { limit: max_depth });
    }
    Ok(())
}
