//! Background path search pool
//!
//! Searches run on dedicated threads so the game loop never waits on them.
//! Every request returns a [`PathTicket`] the caller polls once per tick; the
//! mesh is shared read-only and each thread owns its own search scratch.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use glam::Vec2;

use crate::core::NavError;
use crate::nav::{Navmesh, Path, Pathfinder};

/// Outcome of one background search
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// The path, empty if the goal was unreachable
    pub result: Result<Path, NavError>,
    /// Wall time spent searching
    pub elapsed: Duration,
    /// Cells finalized by the search
    pub expanded: usize,
}

/// State of an outstanding request
#[derive(Debug)]
pub enum TicketStatus {
    /// Still searching
    Pending,
    /// Search finished
    Ready(SearchReport),
    /// The worker went away before answering
    Lost,
}

/// Handle to a search running in the background
#[derive(Debug)]
pub struct PathTicket {
    reply: Receiver<SearchReport>,
}

impl PathTicket {
    /// Check for a result without blocking
    #[must_use]
    pub fn poll(&self) -> TicketStatus {
        match self.reply.try_recv() {
            Ok(report) => TicketStatus::Ready(report),
            Err(TryRecvError::Empty) => TicketStatus::Pending,
            Err(TryRecvError::Disconnected) => TicketStatus::Lost,
        }
    }

    /// Block until the search finishes
    ///
    /// # Errors
    ///
    /// Returns [`NavError::WorkerClosed`] if the worker shut down first
    pub fn wait(self) -> Result<SearchReport, NavError> {
        self.reply.recv().map_err(|_| NavError::WorkerClosed)
    }
}

struct Job {
    start: Vec2,
    goal: Vec2,
    reply: Sender<SearchReport>,
}

/// Pool of threads answering path requests against one mesh
pub struct PathWorker {
    mesh: Arc<Navmesh>,
    jobs: Option<Sender<Job>>,
    threads: Vec<JoinHandle<()>>,
}

impl PathWorker {
    /// Start `threads` search threads (at least one)
    ///
    /// # Errors
    ///
    /// Returns an error if a thread cannot be spawned
    pub fn spawn(mesh: Arc<Navmesh>, threads: usize) -> Result<Self, NavError> {
        let (jobs, queue) = crossbeam_channel::unbounded::<Job>();
        let count = threads.max(1);

        let mut handles = Vec::with_capacity(count);
        for index in 0..count {
            let mesh = Arc::clone(&mesh);
            let queue = queue.clone();
            let handle = thread::Builder::new()
                .name(format!("path-worker-{index}"))
                .spawn(move || run_worker(&mesh, &queue))?;
            handles.push(handle);
        }

        log::info!("Started {count} path worker thread(s)");

        Ok(Self {
            mesh,
            jobs: Some(jobs),
            threads: handles,
        })
    }

    /// The mesh searched by this pool
    #[must_use]
    pub fn mesh(&self) -> &Arc<Navmesh> {
        &self.mesh
    }

    /// Number of worker threads
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Queue a search from `start` to `goal`; never blocks
    ///
    /// # Errors
    ///
    /// Returns [`NavError::WorkerClosed`] if the pool is no longer running
    pub fn request(&self, start: Vec2, goal: Vec2) -> Result<PathTicket, NavError> {
        let (reply, ticket) = crossbeam_channel::bounded(1);
        let jobs = self.jobs.as_ref().ok_or(NavError::WorkerClosed)?;
        jobs.send(Job { start, goal, reply })
            .map_err(|_| NavError::WorkerClosed)?;
        Ok(PathTicket { reply: ticket })
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        // Closing the queue lets every thread drain and exit
        self.jobs.take();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                log::warn!("Path worker thread panicked");
            }
        }
    }
}

fn run_worker(mesh: &Navmesh, queue: &Receiver<Job>) {
    let mut pathfinder = Pathfinder::for_mesh(mesh);

    for job in queue.iter() {
        let started = Instant::now();
        let result = pathfinder.find_path(mesh, job.start, job.goal);
        if let Err(err) = &result {
            log::debug!("Path search {} -> {} failed: {err}", job.start, job.goal);
        }

        let report = SearchReport {
            result,
            elapsed: started.elapsed(),
            expanded: pathfinder.last_expanded(),
        };
        if let Ok(path) = &report.result {
            log::debug!(
                "Path search {} -> {}: {} cell(s), {} expanded in {:?}",
                job.start,
                job.goal,
                path.len(),
                report.expanded,
                report.elapsed
            );
        }
        if job.reply.send(report).is_err() {
            log::debug!("Path request dropped before its result arrived");
        }
    }

    log::debug!("Path worker queue closed, exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::nav::CellId;

    fn hollow_mesh() -> Arc<Navmesh> {
        let obstacles = [Rect::new(10.0, 10.0, 80.0, 80.0)];
        Arc::new(Navmesh::new((100, 100), 10, &obstacles[..], &["Barriers"]).unwrap())
    }

    #[test]
    fn test_request_and_wait() {
        let worker = PathWorker::spawn(hollow_mesh(), 2).unwrap();

        let report = worker
            .request(Vec2::new(5.0, 5.0), Vec2::new(95.0, 95.0))
            .unwrap()
            .wait()
            .unwrap();
        let path = report.result.unwrap();

        assert_eq!(path.len(), 18);
        assert_eq!(path.last(), Some(CellId::new(9, 9)));
        assert!(report.expanded > 0);
    }

    #[test]
    fn test_many_concurrent_requests_agree() {
        let worker = PathWorker::spawn(hollow_mesh(), 4).unwrap();

        let tickets: Vec<PathTicket> = (0..32)
            .map(|_| {
                worker
                    .request(Vec2::new(5.0, 5.0), Vec2::new(95.0, 95.0))
                    .unwrap()
            })
            .collect();

        let paths: Vec<Path> = tickets
            .into_iter()
            .map(|ticket| ticket.wait().unwrap().result.unwrap())
            .collect();

        assert!(paths.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_poll_eventually_ready() {
        let worker = PathWorker::spawn(hollow_mesh(), 1).unwrap();
        let ticket = worker
            .request(Vec2::new(5.0, 5.0), Vec2::new(95.0, 5.0))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let report = loop {
            match ticket.poll() {
                TicketStatus::Ready(report) => break report,
                TicketStatus::Pending if Instant::now() < deadline => thread::yield_now(),
                other => panic!("unexpected ticket state {other:?}"),
            }
        };

        assert_eq!(report.result.unwrap().len(), 10);
    }

    #[test]
    fn test_zero_threads_still_runs_one() {
        let worker = PathWorker::spawn(hollow_mesh(), 0).unwrap();

        assert_eq!(worker.thread_count(), 1);
    }

    #[test]
    fn test_drop_joins_threads() {
        let worker = PathWorker::spawn(hollow_mesh(), 2).unwrap();
        let ticket = worker
            .request(Vec2::new(5.0, 5.0), Vec2::new(95.0, 95.0))
            .unwrap();

        drop(worker);

        // Queued work is drained before the threads exit
        assert!(ticket.wait().is_ok());
    }
}
