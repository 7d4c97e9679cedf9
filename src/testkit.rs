//! Scripted collaborators shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use crate::connect::{Connection, ConnectionTarget, Connector, ServerStatus};
use crate::error::{ConnectError, PromptError};
use crate::observers::{Observer, SpawnInfo};
use crate::signals::{Confirmation, ConfirmPrompt};
use crate::tasks::TaskOutcome;

/// Polls `cond` every few milliseconds; panics after two seconds.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not reached within 2s");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Outcome of one scripted connect attempt.
pub(crate) enum Step {
    Refuse,
    Fail(&'static str),
    Succeed,
    /// Connects, but every status poll fails.
    SucceedFailingStatus,
    /// Blocks until the paired sender fires, then succeeds.
    Gated(mpsc::Receiver<()>),
}

impl Step {
    pub(crate) fn gated() -> (mpsc::Sender<()>, Step) {
        let (tx, rx) = mpsc::channel();
        (tx, Step::Gated(rx))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Attempt {
    pub name: String,
    pub at: Instant,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    polls: AtomicUsize,
}

/// Connector replaying a script; succeeds once the script runs out.
pub(crate) struct ScriptedConnector {
    script: Mutex<VecDeque<Step>>,
    attempts: Mutex<Vec<Attempt>>,
    counters: Arc<Counters>,
}

impl ScriptedConnector {
    pub(crate) fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            attempts: Mutex::new(Vec::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub(crate) fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub(crate) fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn polls(&self) -> usize {
        self.counters.polls.load(Ordering::SeqCst)
    }

    fn open(&self, failing_status: bool) -> Box<dyn Connection> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(StubConnection {
            counters: Arc::clone(&self.counters),
            failing_status,
        })
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, target: &ConnectionTarget) -> Result<Box<dyn Connection>, ConnectError> {
        self.attempts.lock().unwrap().push(Attempt {
            name: target.name.clone(),
            at: Instant::now(),
        });
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Succeed);
        match step {
            Step::Refuse => Err(ConnectError::Refused {
                address: target.address.clone(),
                port: target.rpc_port,
            }),
            Step::Fail(reason) => Err(ConnectError::failed(reason)),
            Step::Succeed => Ok(self.open(false)),
            Step::SucceedFailingStatus => Ok(self.open(true)),
            Step::Gated(rx) => {
                let _ = rx.recv();
                Ok(self.open(false))
            }
        }
    }
}

struct StubConnection {
    counters: Arc<Counters>,
    failing_status: bool,
}

impl Connection for StubConnection {
    fn status(&mut self) -> Result<ServerStatus, ConnectError> {
        let n = self.counters.polls.fetch_add(1, Ordering::SeqCst) as u64;
        if self.failing_status {
            return Err(ConnectError::failed("stream closed"));
        }
        Ok(ServerStatus {
            version: "0.5.4".to_string(),
            rpcs_executed: n,
            ..ServerStatus::default()
        })
    }

    fn close(self: Box<Self>) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

enum Script {
    Fixed(Confirmation),
    Closed,
    Manual {
        answers: Mutex<mpsc::Receiver<Result<Confirmation, PromptError>>>,
        asked: Arc<Semaphore>,
    },
}

/// Prompt with canned or test-driven answers.
pub(crate) struct ScriptedPrompt(Script);

/// Drives a [`ScriptedPrompt::manual`] prompt.
pub(crate) struct PromptControl {
    answers: mpsc::Sender<Result<Confirmation, PromptError>>,
    asked: Arc<Semaphore>,
}

impl ScriptedPrompt {
    pub(crate) fn answering(answer: Confirmation) -> Self {
        Self(Script::Fixed(answer))
    }

    pub(crate) fn closed() -> Self {
        Self(Script::Closed)
    }

    /// Blocks on every question until the control answers (or is dropped).
    pub(crate) fn manual() -> (Self, PromptControl) {
        let (tx, rx) = mpsc::channel();
        let asked = Arc::new(Semaphore::new(0));
        (
            Self(Script::Manual {
                answers: Mutex::new(rx),
                asked: Arc::clone(&asked),
            }),
            PromptControl { answers: tx, asked },
        )
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, _question: &str) -> Result<Confirmation, PromptError> {
        match &self.0 {
            Script::Fixed(answer) => Ok(*answer),
            Script::Closed => Err(PromptError::Closed),
            Script::Manual { answers, asked } => {
                asked.add_permits(1);
                answers
                    .lock()
                    .unwrap()
                    .recv()
                    .unwrap_or(Err(PromptError::Closed))
            }
        }
    }
}

impl PromptControl {
    /// Waits until the prompt has been asked once more.
    pub(crate) async fn wait_asked(&self) {
        let permit = tokio::time::timeout(Duration::from_secs(2), self.asked.acquire())
            .await
            .expect("prompt asked within 2s")
            .expect("semaphore open");
        permit.forget();
    }

    pub(crate) fn answer(&self, answer: Result<Confirmation, PromptError>) {
        let _ = self.answers.send(answer);
    }
}

/// Observer event captured by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Seen {
    Spawn(String),
    Complete(String, TaskOutcome),
}

/// Records spawn/complete callbacks in order, stamped with the tokio clock
/// so paused-time tests see virtual time.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    seen: Mutex<Vec<(Seen, tokio::time::Instant)>>,
    suspends: AtomicUsize,
}

impl RecordingObserver {
    pub(crate) fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }

    pub(crate) fn at(&self, wanted: &Seen) -> Option<tokio::time::Instant> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s == wanted)
            .map(|(_, at)| *at)
    }

    pub(crate) fn spawned(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Spawn(name) => Some(name),
                Seen::Complete(..) => None,
            })
            .collect()
    }

    pub(crate) fn completed(&self) -> Vec<(String, TaskOutcome)> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Complete(name, outcome) => Some((name, outcome)),
                Seen::Spawn(_) => None,
            })
            .collect()
    }

    pub(crate) fn suspends(&self) -> usize {
        self.suspends.load(Ordering::SeqCst)
    }
}

impl Observer for RecordingObserver {
    fn on_spawn(&self, info: &SpawnInfo) {
        self.seen
            .lock()
            .unwrap()
            .push((Seen::Spawn(info.name.to_string()), tokio::time::Instant::now()));
    }

    fn on_suspend(&self, _task: &str) {
        self.suspends.fetch_add(1, Ordering::SeqCst);
    }

    fn on_complete(&self, task: &str, outcome: &TaskOutcome) {
        self.seen
            .lock()
            .unwrap()
            .push((
                Seen::Complete(task.to_string(), outcome.clone()),
                tokio::time::Instant::now(),
            ));
    }
}
