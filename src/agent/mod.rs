//! Path-consuming agents
//!
//! Agents that follow navmesh paths, and the background pool that searches
//! for them.

mod follower;
mod worker;

pub use follower::{Agent, AgentId, Waypoint};
pub use worker::{PathTicket, PathWorker, SearchReport, TicketStatus};
