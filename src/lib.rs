//! Switchyard - backend selection, retry and failover for remote model endpoints
//!
//! The [`registry`] holds backend descriptors and their rolling statistics,
//! the [`routing`] selector scores and caches choices against per-task
//! requirements, and the [`manager`] drives retries, timeouts and failover on
//! top of both.
//!
//! ```no_run
//! use switchyard::config::RouterConfig;
//! use switchyard::manager::RoutingManager;
//! use switchyard::routing::TaskRequirements;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RouterConfig::load(Some("switchyard.toml".as_ref()))?;
//! let manager = RoutingManager::from_config(&config);
//!
//! let result = manager
//!     .run_with_best_backend(&TaskRequirements::new().with_vision(), |backend| async move {
//!         // Call backend.base_url with backend.api_key here
//!         Ok::<_, String>(backend.model_name)
//!     })
//!     .await;
//!
//! println!("served by {} after {} retries", result.backend_id, result.retries);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod routing;
pub mod telemetry;
