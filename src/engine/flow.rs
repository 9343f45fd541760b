// Flow linearization - turns a workflow's `actions` + `flows` graph into a
// single run order.
//
// A valid workflow graph is a simple chain: every action has at most one
// incoming and one outgoing edge, there is exactly one source (in-degree 0)
// and one sink (out-degree 0), and every action is reachable from the
// source. Anything else is a configuration error caught before the
// workflow is ever scheduled, not a runtime failure mid-execution.

use std::collections::{HashMap, HashSet};

use crate::models::{ActionDefinition, ActionFlow};
use crate::{EngineError, Result};

/// Resolve `actions`/`flows` into the order the executor should run them.
///
/// A workflow with actions but no flows is rejected: there's no way to
/// determine order among more than one action, and a graph is expected
/// wherever actions exist.
pub fn linearize(actions: &[ActionDefinition], flows: &[ActionFlow]) -> Result<Vec<ActionDefinition>> {
    if actions.is_empty() {
        return Ok(Vec::new());
    }
    if flows.is_empty() {
        if actions.len() == 1 {
            return Ok(vec![actions[0].clone()]);
        }
        return Err(EngineError::Config(
            "workflow has multiple actions but no flows connecting them".into(),
        ));
    }

    let ids: HashSet<&str> = actions.iter().map(|a| a.id.as_str()).collect();
    let mut out_degree: HashMap<&str, u32> = HashMap::new();
    let mut in_degree: HashMap<&str, u32> = HashMap::new();
    let mut next: HashMap<&str, &str> = HashMap::new();

    for flow in flows {
        if !ids.contains(flow.source.as_str()) {
            return Err(EngineError::Config(format!(
                "flow references unknown source action '{}'",
                flow.source
            )));
        }
        if !ids.contains(flow.target.as_str()) {
            return Err(EngineError::Config(format!(
                "flow references unknown target action '{}'",
                flow.target
            )));
        }
        *out_degree.entry(flow.source.as_str()).or_insert(0) += 1;
        *in_degree.entry(flow.target.as_str()).or_insert(0) += 1;
        if next.insert(flow.source.as_str(), flow.target.as_str()).is_some() {
            return Err(EngineError::Config(format!(
                "action '{}' has more than one outgoing flow",
                flow.source
            )));
        }
    }

    for action in actions {
        if out_degree.get(action.id.as_str()).copied().unwrap_or(0) > 1 {
            return Err(EngineError::Config(format!(
                "action '{}' has more than one outgoing flow",
                action.id
            )));
        }
        if in_degree.get(action.id.as_str()).copied().unwrap_or(0) > 1 {
            return Err(EngineError::Config(format!(
                "action '{}' has more than one incoming flow",
                action.id
            )));
        }
    }

    let sources: Vec<&str> = actions
        .iter()
        .map(|a| a.id.as_str())
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    if sources.len() != 1 {
        return Err(EngineError::Config(format!(
            "workflow must have exactly one source action, found {}",
            sources.len()
        )));
    }

    let by_id: HashMap<&str, &ActionDefinition> =
        actions.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut ordered = Vec::with_capacity(actions.len());
    let mut current = sources[0];
    let mut visited = HashSet::new();
    loop {
        if !visited.insert(current) {
            return Err(EngineError::Config("flow graph contains a cycle".into()));
        }
        ordered.push((*by_id.get(current).expect("id came from actions")).clone());
        match next.get(current) {
            Some(target) => current = target,
            None => break,
        }
    }

    if ordered.len() != actions.len() {
        return Err(EngineError::Config(
            "flow graph does not connect every action to the source".into(),
        ));
    }

    Ok(ordered)
}
