//! Level controller
//!
//! Owns the navmesh of the active level, the search pool working against it
//! and every agent in the level. The host calls [`Level::tick`] once per frame.

use std::sync::Arc;

use glam::Vec2;

use super::config::NavConfig;
use super::debug::SearchStats;
use super::error::NavError;
use crate::agent::{Agent, AgentId, PathWorker, SearchReport};
use crate::nav::{LevelGeometry, Navmesh};

/// A loaded level and everything that navigates it
pub struct Level {
    name: String,
    config: NavConfig,
    mesh: Arc<Navmesh>,
    worker: PathWorker,
    agents: Vec<Agent>,
    stats: SearchStats,
    next_id: u32,
}

impl Level {
    /// Build the navmesh for `geometry` and start the search pool.
    ///
    /// # Errors
    ///
    /// Fails if the mesh cannot be built, if no cell is traversable, or if the
    /// worker threads cannot be started.
    pub fn load(geometry: &LevelGeometry, config: NavConfig) -> Result<Self, NavError> {
        let mesh = Navmesh::from_level(geometry, &config)?;
        if mesh.active_count() == 0 {
            return Err(NavError::NoActiveCell);
        }

        let mesh = Arc::new(mesh);
        let worker = PathWorker::spawn(Arc::clone(&mesh), config.worker_threads)?;

        log::info!(
            "Loaded level '{}': {} of {} cells traversable",
            geometry.name,
            mesh.active_count(),
            mesh.len()
        );

        Ok(Self {
            name: geometry.name.clone(),
            config,
            mesh,
            worker,
            agents: Vec::new(),
            stats: SearchStats::new(),
            next_id: 0,
        })
    }

    /// Level name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the level was loaded with
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The level's navmesh
    #[must_use]
    pub fn mesh(&self) -> &Arc<Navmesh> {
        &self.mesh
    }

    /// Search statistics so far
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Add an idle agent at `position` moving at the configured speed
    pub fn spawn_agent(&mut self, position: Vec2) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents
            .push(Agent::new(id, position, self.config.agent_speed));
        log::debug!("Spawned agent {id:?} at {position}");
        id
    }

    /// Remove an agent; its outstanding search, if any, is discarded
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|agent| agent.id() == id)?;
        Some(self.agents.remove(index))
    }

    /// All agents in spawn order
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Look up an agent
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    /// Look up an agent mutably
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id() == id)
    }

    /// Advance one frame at clock reading `now_ms`, steering every agent
    /// towards `target`.
    ///
    /// Finished searches are applied first. New searches are dispatched only
    /// when the mesh's refresh window has elapsed, and only for agents with
    /// no search outstanding. Agents then move, and the window is advanced.
    pub fn tick(&mut self, now_ms: u64, target: Vec2) {
        self.collect_results();

        if self.mesh.should_update(now_ms) {
            self.dispatch(target);
        }

        let radius = self.config.arrival_radius;
        for agent in &mut self.agents {
            agent.tick(radius);
        }

        self.mesh.update(now_ms);
    }

    /// Block until every outstanding search has finished and apply the results
    pub fn flush(&mut self) {
        for agent in &mut self.agents {
            if let Some(report) = agent.wait_pending() {
                Self::apply(&mut self.stats, &self.mesh, agent, report);
            }
        }
    }

    fn collect_results(&mut self) {
        for agent in &mut self.agents {
            if let Some(report) = agent.take_finished() {
                Self::apply(&mut self.stats, &self.mesh, agent, report);
            }
        }
    }

    fn dispatch(&mut self, target: Vec2) {
        for agent in &mut self.agents {
            if agent.has_pending_request() {
                continue;
            }
            match self.worker.request(agent.position, target) {
                Ok(ticket) => {
                    log::debug!("Dispatched search for agent {:?} to {target}", agent.id());
                    agent.set_pending(ticket);
                    self.stats.record_dispatch();
                }
                Err(err) => log::warn!("Could not queue search for agent {:?}: {err}", agent.id()),
            }
        }
    }

    fn apply(stats: &mut SearchStats, mesh: &Navmesh, agent: &mut Agent, report: SearchReport) {
        stats.record(&report);
        match &report.result {
            Ok(path) => {
                if path.is_empty() {
                    log::debug!("No route for agent {:?}", agent.id());
                }
                agent.replace_path(path, mesh);
            }
            Err(err) => log::error!("Search for agent {:?} failed: {err}", agent.id()),
        }
    }
}
