//! Backends command implementation

use crate::cli::output::{
    format_backends_json, format_backends_table, format_rank_json, format_rank_table,
    BackendView, RankView,
};
use crate::cli::{BackendsListArgs, BackendsRankArgs};
use crate::manager::RoutingManager;

/// Handle backends list command
pub fn handle_backends_list(
    args: &BackendsListArgs,
    manager: &RoutingManager,
) -> Result<String, Box<dyn std::error::Error>> {
    let backends = if args.enabled {
        manager.registry().list_enabled()
    } else {
        manager.registry().list_all()
    };

    if backends.is_empty() && !args.json {
        return Ok("No backends configured".to_string());
    }

    let views: Vec<BackendView> = backends.iter().map(BackendView::from).collect();

    if args.json {
        Ok(format_backends_json(&views)?)
    } else {
        Ok(format_backends_table(&views))
    }
}

/// Handle backends rank command
pub fn handle_backends_rank(
    args: &BackendsRankArgs,
    manager: &RoutingManager,
) -> Result<String, Box<dyn std::error::Error>> {
    let views: Vec<RankView> = manager
        .report()
        .iter()
        .enumerate()
        .map(|(i, ranked)| RankView::from_ranked(i + 1, ranked))
        .collect();

    if args.json {
        Ok(format_rank_json(&views)?)
    } else if views.is_empty() {
        Ok("No enabled backends to rank".to_string())
    } else {
        Ok(format_rank_table(&views))
    }
}
