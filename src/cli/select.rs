//! Select command implementation

use crate::cli::output::{format_selection_json, format_selection_text, SelectionView};
use crate::cli::SelectArgs;
use crate::manager::RoutingManager;
use crate::routing::TaskRequirements;

/// Requirements described by the command-line flags.
pub fn requirements_from_args(args: &SelectArgs) -> TaskRequirements {
    TaskRequirements {
        requires_vision: args.vision,
        requires_reasoning: args.reasoning,
        max_latency_ms: args.max_latency_ms,
        priority: args.priority,
    }
}

/// Handle select command
///
/// Runs the real selector against freshly loaded backends. Nothing is
/// executed and no history exists, so the decision reflects configuration
/// only.
pub fn handle_select(
    args: &SelectArgs,
    manager: &RoutingManager,
) -> Result<String, Box<dyn std::error::Error>> {
    let requirements = requirements_from_args(args);
    let result = manager.selector().select(&requirements)?;
    let view = SelectionView::from(&result);

    if args.json {
        Ok(format_selection_json(&view)?)
    } else {
        Ok(format_selection_text(&view))
    }
}
