//! JSON Lines scripts of tool calls.
//!
//! Each non-blank line is `{"tool": "<name>", "args": {...}}`. Lines
//! starting with `#` are comments. String arguments of the form
//! `$last.<field>` or `$<n>.<field>` are replaced by a field of an earlier
//! call's result (`n` is the zero-based call index), so a script can feed
//! the id returned by `graph_create` into later calls:
//!
//! ```text
//! {"tool": "graph_create", "args": {"name": "demo"}}
//! {"tool": "graph_add_relationship", "args": {"graphId": "$0.graphId", ...}}
//! {"tool": "graph_analyze", "args": {"graphId": "$last.graphId", "analysisType": "statistics"}}
//! ```
//!
//! Field paths may be dotted (`$2.conflicts.0.nodeId`); numeric segments
//! index into arrays.

use crate::error::{Error, Result};
use delve_mcp_graph::GraphTools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scripted tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptCall {
    /// Tool name.
    pub tool: String,
    /// Tool arguments, possibly containing references.
    #[serde(default)]
    pub args: Value,
}

/// Parses script text. `source` labels errors (usually the file path).
pub fn parse_script(source: &str, content: &str) -> Result<Vec<ScriptCall>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| Error::ScriptParse {
                path: source.to_string(),
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

// ============================================================================
// References
// ============================================================================

/// Splits `$last.a.b` / `$3.a` into (index, path). `None` for plain strings.
fn parse_reference(s: &str, available: usize) -> Option<(Option<usize>, &str)> {
    let rest = s.strip_prefix('$')?;
    let (selector, path) = rest.split_once('.')?;
    if path.is_empty() {
        return None;
    }
    if selector == "last" {
        return Some((available.checked_sub(1), path));
    }
    if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
        let index = selector.parse::<usize>().ok()?;
        return Some(((index < available).then_some(index), path));
    }
    None
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Replaces references in `value` with fields of `results`.
///
/// Applies recursively through arrays and objects. A reference resolves to
/// whatever JSON value the field holds, not necessarily a string.
pub fn substitute(value: &Value, results: &[Value]) -> delve_core::Result<Value> {
    match value {
        Value::String(s) => match parse_reference(s, results.len()) {
            None => Ok(value.clone()),
            Some((None, _)) => Err(delve_core::Error::invalid_argument(format!(
                "reference '{s}' points past the {} completed call(s)",
                results.len()
            ))),
            Some((Some(index), path)) => lookup(&results[index], path).cloned().ok_or_else(|| {
                delve_core::Error::invalid_argument(format!(
                    "reference '{s}': result of call {index} has no field '{path}'"
                ))
            }),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, results))
            .collect::<delve_core::Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), substitute(item, results)?);
            }
            Ok(Value::Object(out))
        }
        _ => Ok(value.clone()),
    }
}

// ============================================================================
// ScriptRunner
// ============================================================================

/// Executes scripted calls in order against one set of graph tools.
#[derive(Clone, Debug)]
pub struct ScriptRunner {
    tools: GraphTools,
    default_max_depth: usize,
}

impl ScriptRunner {
    /// Creates a runner. `default_max_depth` fills `maxDepth` for
    /// `graph_query` calls that omit it.
    pub fn new(tools: GraphTools, default_max_depth: usize) -> Self {
        Self {
            tools,
            default_max_depth,
        }
    }

    /// Runs all calls, stopping at the first failure.
    pub async fn run(&self, calls: &[ScriptCall]) -> Result<Vec<Value>> {
        self.run_with(calls, |_, _, _| {}).await
    }

    /// Like [`run`](Self::run), reporting each result as it completes.
    pub async fn run_with<F>(&self, calls: &[ScriptCall], mut on_result: F) -> Result<Vec<Value>>
    where
        F: FnMut(usize, &ScriptCall, &Value),
    {
        let mut results: Vec<Value> = Vec::with_capacity(calls.len());

        for (index, call) in calls.iter().enumerate() {
            let failed = |source| Error::ScriptCall {
                index,
                tool: call.tool.clone(),
                source,
            };

            let mut args = substitute(&call.args, &results).map_err(failed)?;
            self.apply_defaults(&call.tool, &mut args);

            log::debug!("Script call {index}: {}", call.tool);
            let value = self
                .tools
                .dispatch(&call.tool, args)
                .await
                .map_err(failed)?;

            on_result(index, call, &value);
            results.push(value);
        }

        log::info!("Script finished: {} call(s)", results.len());
        Ok(results)
    }

    fn apply_defaults(&self, tool: &str, args: &mut Value) {
        if tool != "graph_query" {
            return;
        }
        if let Value::Object(map) = args {
            map.entry("maxDepth")
                .or_insert_with(|| Value::from(self.default_max_depth));
        }
    }
}
