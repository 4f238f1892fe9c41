/// Save sanitizer
///
/// Normalizes a copy of the workflow before it is handed to the store: view positions are
/// written back onto steps, and every argument in the tree is cleaned the same way.

use crate::error::{Result, StudioError};
use crate::workflow::selector::Selector;
use crate::workflow::types::{Argument, Position, Workflow};
use std::collections::HashMap;

/// Produce the persisted form of a workflow
///
/// Refuses when no start step is set. `positions` maps step uid to its current view
/// position; steps without an entry keep their stored position.
pub fn prepare_for_save(workflow: &Workflow, positions: &HashMap<String, Position>) -> Result<Workflow> {
    if workflow.start.is_none() {
        return Err(StudioError::MissingStart);
    }

    let mut sanitized = workflow.clone();
    for step in &mut sanitized.steps {
        if let Some(position) = positions.get(&step.uid) {
            step.position = *position;
        }
    }
    sanitize_workflow(&mut sanitized);

    tracing::debug!(
        "🧹 Sanitized workflow '{}' ({} steps, {} transitions)",
        sanitized.name,
        sanitized.steps.len(),
        sanitized.next_steps.len()
    );

    Ok(sanitized)
}

/// Put step input selectors into their editable (dotted string) form after a load
pub fn prepare_for_edit(workflow: &mut Workflow) {
    for step in &mut workflow.steps {
        for input in &mut step.inputs {
            if let Some(selector) = input.selector.as_mut() {
                selector.to_editable();
            }
        }
    }
}

/// Sanitize every argument reachable from the workflow in place
pub fn sanitize_workflow(workflow: &mut Workflow) {
    for_each_argument(workflow, sanitize_argument);
}

/// Clear a value shadowed by a reference and put the selector in canonical form
pub fn sanitize_argument(argument: &mut Argument) {
    if argument.has_reference() {
        argument.value = None;
    }

    argument
        .selector
        .get_or_insert_with(Selector::default)
        .normalize();
}

/// Visit every argument: step inputs, trigger args, trigger transform args,
/// condition args and condition transform args
pub fn for_each_argument(workflow: &mut Workflow, mut visit: impl FnMut(&mut Argument)) {
    for step in &mut workflow.steps {
        step.inputs.iter_mut().for_each(&mut visit);

        for trigger in &mut step.triggers {
            trigger.args.iter_mut().for_each(&mut visit);
            for transform in &mut trigger.transforms {
                transform.args.iter_mut().for_each(&mut visit);
            }
        }
    }

    for transition in &mut workflow.next_steps {
        for condition in &mut transition.conditions {
            condition.args.iter_mut().for_each(&mut visit);
            for transform in &mut condition.transforms {
                transform.args.iter_mut().for_each(&mut visit);
            }
        }
    }
}
