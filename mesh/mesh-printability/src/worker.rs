//! Off-thread overhang analysis.
//!
//! A job is encoded with bincode, handed to a freshly spawned worker thread,
//! and answered with a single encoded reply over a channel. The worker owns
//! everything it touches; dropping the task abandons the reply.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use mesh_types::{Facet, Orientation, TriangleMesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PrintabilityError, PrintabilityResult};
use crate::overhang::{analyze_overhangs, clamp_threshold, OverhangResult};

/// Everything the worker needs, as one serializable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverhangJob {
    /// Facets of the mesh, in index order.
    pub facets: Vec<Facet>,
    /// Build orientation to evaluate.
    pub orientation: Orientation,
    /// Overhang threshold in degrees.
    pub threshold_degrees: f64,
}

impl OverhangJob {
    /// Snapshot a mesh for analysis.
    #[must_use]
    pub fn new(mesh: &TriangleMesh, orientation: Orientation, threshold_degrees: f64) -> Self {
        Self {
            facets: mesh.facets.clone(),
            orientation,
            threshold_degrees,
        }
    }

    /// Run the job on the current thread.
    pub fn run(self) -> PrintabilityResult<OverhangResult> {
        let mesh = TriangleMesh::from_facets(self.facets);
        analyze_overhangs(&mesh, &self.orientation, self.threshold_degrees)
    }
}

/// What the worker sends back.
#[derive(Debug, Serialize, Deserialize)]
enum WorkerReply {
    Done(OverhangResult),
    Failed(String),
}

/// Handle to an in-flight overhang job.
///
/// The reply can be collected once. Dropping the task (or calling
/// [`cancel`](Self::cancel)) abandons the job: the worker finishes on its
/// own and its reply is discarded.
#[derive(Debug)]
pub struct OverhangTask {
    reply: Receiver<Vec<u8>>,
}

impl OverhangTask {
    /// Block until the worker answers.
    pub fn wait(self) -> PrintabilityResult<OverhangResult> {
        let bytes = self
            .reply
            .recv()
            .map_err(|_| PrintabilityError::worker("worker exited without replying"))?;
        decode_reply(&bytes)
    }

    /// Block for at most `timeout`.
    ///
    /// Returns `Ok(None)` if the worker is still running; the task stays
    /// usable.
    pub fn wait_timeout(&self, timeout: Duration) -> PrintabilityResult<Option<OverhangResult>> {
        match self.reply.recv_timeout(timeout) {
            Ok(bytes) => decode_reply(&bytes).map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(PrintabilityError::worker(
                "worker exited without replying",
            )),
        }
    }

    /// Collect the reply if it has arrived.
    pub fn try_result(&self) -> PrintabilityResult<Option<OverhangResult>> {
        match self.reply.try_recv() {
            Ok(bytes) => decode_reply(&bytes).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PrintabilityError::worker(
                "worker exited without replying",
            )),
        }
    }

    /// Abandon the job.
    pub fn cancel(self) {
        debug!("overhang job cancelled");
        drop(self.reply);
    }
}

fn decode_reply(bytes: &[u8]) -> PrintabilityResult<OverhangResult> {
    match bincode::deserialize(bytes)? {
        WorkerReply::Done(result) => Ok(result),
        WorkerReply::Failed(message) => Err(PrintabilityError::Worker { message }),
    }
}

/// Start a job on a new worker thread.
///
/// The threshold is validated here so a NaN is reported synchronously.
///
/// # Errors
///
/// Returns [`PrintabilityError::InvalidThreshold`] for a NaN threshold,
/// [`PrintabilityError::Codec`] if the job cannot be encoded, and
/// [`PrintabilityError::Worker`] if the thread cannot be spawned.
///
/// # Example
///
/// ```
/// use mesh_printability::{spawn_overhang_job, OverhangJob};
/// use mesh_types::{Orientation, Point3, TriangleMesh};
///
/// let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(5.0, 5.0, 5.0));
/// let task = spawn_overhang_job(&OverhangJob::new(&cube, Orientation::identity(), 45.0)).unwrap();
///
/// assert!(task.wait().unwrap().is_support_free());
/// ```
pub fn spawn_overhang_job(job: &OverhangJob) -> PrintabilityResult<OverhangTask> {
    clamp_threshold(job.threshold_degrees)?;
    let payload = bincode::serialize(job)?;
    let (tx, rx) = mpsc::channel::<Vec<u8>>();

    debug!(
        facets = job.facets.len(),
        bytes = payload.len(),
        "spawning overhang worker"
    );

    thread::Builder::new()
        .name("overhang-worker".into())
        .spawn(move || {
            let reply = match bincode::deserialize::<OverhangJob>(&payload) {
                Ok(job) => match job.run() {
                    Ok(result) => WorkerReply::Done(result),
                    Err(e) => WorkerReply::Failed(e.to_string()),
                },
                Err(e) => WorkerReply::Failed(format!("undecodable job: {e}")),
            };

            match bincode::serialize(&reply) {
                Ok(bytes) => {
                    if tx.send(bytes).is_err() {
                        debug!("overhang reply discarded; task was dropped");
                    }
                }
                Err(e) => warn!(error = %e, "failed to encode overhang reply"),
            }
        })
        .map_err(|e| PrintabilityError::worker(format!("failed to spawn worker: {e}")))?;

    Ok(OverhangTask { reply: rx })
}
