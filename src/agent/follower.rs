//! Path-following agents
//!
//! An agent walks a queue of waypoints at a fixed speed. New paths replace the
//! whole queue at once; the agent keeps walking its old route until then.

use std::collections::VecDeque;

use glam::Vec2;

use super::worker::{PathTicket, SearchReport, TicketStatus};
use crate::nav::{CellId, Navmesh, Path};

/// Identifier of an agent within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

/// A cell the agent is heading for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Navmesh cell
    pub cell: CellId,
    /// Centre of the cell in world space
    pub position: Vec2,
}

/// A mobile agent steering along navmesh paths
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    /// Position in world space
    pub position: Vec2,
    /// Distance moved per tick
    pub speed: f32,
    direction: Vec2,
    waypoints: VecDeque<Waypoint>,
    pending: Option<PathTicket>,
}

impl Agent {
    /// Create an idle agent
    #[must_use]
    pub fn new(id: AgentId, position: Vec2, speed: f32) -> Self {
        Self {
            id,
            position,
            speed,
            direction: Vec2::ZERO,
            waypoints: VecDeque::new(),
            pending: None,
        }
    }

    /// Agent identifier
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Unit direction of the last movement step
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Remaining waypoints, front first
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.waypoints.iter()
    }

    /// Waypoint the agent is currently heading for
    #[must_use]
    pub fn next_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.front()
    }

    /// True when the agent has no route
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// True while a background search for this agent is outstanding
    #[must_use]
    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the whole route with `path`; an empty path leaves the agent idle
    pub fn replace_path(&mut self, path: &Path, mesh: &Navmesh) {
        let queue: VecDeque<Waypoint> = path
            .cells()
            .iter()
            .filter_map(|&id| mesh.cell(id))
            .map(|cell| Waypoint {
                cell: cell.id(),
                position: cell.center(),
            })
            .collect();
        self.waypoints = queue;
    }

    /// Drop the current route
    pub fn clear_path(&mut self) {
        self.waypoints.clear();
    }

    pub(crate) fn set_pending(&mut self, ticket: PathTicket) {
        self.pending = Some(ticket);
    }

    /// Take the result of the outstanding search if it has finished
    pub(crate) fn take_finished(&mut self) -> Option<SearchReport> {
        let status = self.pending.as_ref()?.poll();
        match status {
            TicketStatus::Pending => None,
            TicketStatus::Ready(report) => {
                self.pending = None;
                Some(report)
            }
            TicketStatus::Lost => {
                log::warn!("Path request for agent {:?} lost: worker closed", self.id);
                self.pending = None;
                None
            }
        }
    }

    /// Block until the outstanding search finishes
    pub(crate) fn wait_pending(&mut self) -> Option<SearchReport> {
        let ticket = self.pending.take()?;
        match ticket.wait() {
            Ok(report) => Some(report),
            Err(err) => {
                log::warn!("Path request for agent {:?} lost: {err}", self.id);
                None
            }
        }
    }

    /// Step towards the front waypoint, popping it once within `arrival_radius`.
    ///
    /// Returns true if a waypoint was reached this tick.
    pub fn tick(&mut self, arrival_radius: f32) -> bool {
        let Some(target) = self.waypoints.front().map(|waypoint| waypoint.position) else {
            return false;
        };

        self.direction = (target - self.position).normalize_or_zero();
        self.position += self.direction * self.speed;

        if self.position.distance(target) < arrival_radius {
            self.waypoints.pop_front();
            return true;
        }
        false
    }
}
