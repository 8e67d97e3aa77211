// UiDispatcher - Marshals work from caller threads onto the UI-affine thread
//
// Two execution contexts are in play:
// 1. The single UI-affine thread that owns all dialog state
// 2. Arbitrary caller threads (the test runner) that must never touch it
//
// The dispatcher is an explicit task queue drained only by the UI thread.
// Callers submit a closure and block on a reply channel until the closure
// has run over there, with the wait bounded by a per-operation
// hang-mitigation budget (CancelScope).

use std::collections::VecDeque;
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Failure modes of a dispatch round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The cancellation budget fired before the work completed. The work
    /// either never started or its result was discarded.
    #[error("dispatch cancelled by hang-mitigation budget")]
    Cancelled,

    /// The UI event loop has shut down; no work can run anymore.
    #[error("UI event loop is no longer running")]
    LoopClosed,
}

/// Time-bounded cancellation scope for one public driver operation.
///
/// Created at the top of every public call with a fixed budget and
/// released when it goes out of scope, on every exit path. The scope is
/// triggered either by its deadline elapsing or by an explicit
/// [`cancel`](Self::cancel) from another thread.
#[derive(Debug)]
pub struct CancelScope {
    deadline: Instant,
    budget: Duration,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
}

impl CancelScope {
    /// Create a scope that triggers `budget` from now.
    pub fn with_timeout(budget: Duration) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            deadline: Instant::now() + budget,
            budget,
            cancel_tx,
            cancel_rx,
        }
    }

    /// The budget this scope was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Trigger the scope ahead of its deadline.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Whether the scope has been triggered (deadline or explicit cancel).
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() || Instant::now() >= self.deadline
    }

    /// Time left before the deadline; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Error out if the scope has been triggered. Poll loops call this at
    /// every iteration, not only on entry.
    pub fn checkpoint(&self) -> Result<(), DispatchError> {
        if self.is_cancelled() {
            Err(DispatchError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A `Send + 'static` snapshot of this scope for loop-side checks.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            deadline: self.deadline,
            cancel_rx: self.cancel_rx.clone(),
        }
    }
}

/// Detached view of a [`CancelScope`], cheap to move into a queued task.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    deadline: Instant,
    cancel_rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow() || Instant::now() >= self.deadline
    }
}

type BoxedTask = Box<dyn FnOnce() + Send>;

enum UiTask {
    /// Submitted work. The loop drains all pending background events
    /// before running it (the forced yield).
    Foreground(BoxedTask),

    /// Host UI event posted below ordinary dispatch priority, e.g. a
    /// dialog-open notification. Runs when the loop is otherwise idle or
    /// immediately ahead of the next foreground task.
    Background(BoxedTask),
}

/// Caller-side handle for submitting work to the UI thread.
///
/// Cloneable; all clones feed the same queue. The loop exits once every
/// handle has been dropped.
#[derive(Clone)]
pub struct UiDispatcher {
    task_tx: mpsc::UnboundedSender<UiTask>,
}

impl UiDispatcher {
    /// Create a dispatcher and the event loop it feeds. The embedder must
    /// hand [`UiEventLoop::run`] to the designated UI thread; until then
    /// nothing submitted will execute.
    pub fn channel() -> (Self, UiEventLoop) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        (
            Self { task_tx },
            UiEventLoop {
                task_rx,
                background: VecDeque::new(),
            },
        )
    }

    /// Run `work` on the UI thread and block until it completes, the
    /// scope fires, or the loop shuts down.
    ///
    /// The loop always lets queued background events run first: dialog
    /// open notifications are observed to post below ordinary dispatch
    /// priority, so skipping the yield makes discovery race its own
    /// trigger. If the scope fires while the work is still queued, the
    /// loop-side guard keeps it from starting at all.
    ///
    /// Must not be called from the UI thread itself; the round trip would
    /// deadlock against the loop it is waiting on.
    pub fn run_on_ui<T, F>(&self, scope: &CancelScope, work: F) -> Result<T, DispatchError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        scope.checkpoint()?;

        let (reply_tx, reply_rx) = std_mpsc::channel::<Result<T, DispatchError>>();
        let signal = scope.signal();

        let task = UiTask::Foreground(Box::new(move || {
            if signal.is_cancelled() {
                let _ = reply_tx.send(Err(DispatchError::Cancelled));
                return;
            }
            let _ = reply_tx.send(Ok(work()));
        }));

        self.task_tx
            .send(task)
            .map_err(|_| DispatchError::LoopClosed)?;

        match reply_rx.recv_timeout(scope.remaining()) {
            Ok(result) => result,
            Err(std_mpsc::RecvTimeoutError::Timeout) => Err(DispatchError::Cancelled),
            Err(std_mpsc::RecvTimeoutError::Disconnected) => Err(DispatchError::LoopClosed),
        }
    }

    /// Post a fire-and-forget host event at background priority.
    ///
    /// This is the seam the embedding host uses to deliver UI
    /// notifications (dialog opened, dialog closed) into the loop.
    pub fn post_background<F>(&self, event: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.task_tx
            .send(UiTask::Background(Box::new(event)))
            .map_err(|_| DispatchError::LoopClosed)
    }

    /// Block until the UI thread has drained everything queued at or
    /// above background priority as of this call.
    ///
    /// Implemented as a background-priority barrier: by the time the
    /// barrier runs, every earlier foreground task and background event
    /// has run too.
    pub fn wait_for_idle(&self, scope: &CancelScope) -> Result<(), DispatchError> {
        scope.checkpoint()?;

        let (reply_tx, reply_rx) = std_mpsc::channel::<()>();
        self.task_tx
            .send(UiTask::Background(Box::new(move || {
                let _ = reply_tx.send(());
            })))
            .map_err(|_| DispatchError::LoopClosed)?;

        match reply_rx.recv_timeout(scope.remaining()) {
            Ok(()) => Ok(()),
            Err(std_mpsc::RecvTimeoutError::Timeout) => Err(DispatchError::Cancelled),
            Err(std_mpsc::RecvTimeoutError::Disconnected) => Err(DispatchError::LoopClosed),
        }
    }
}

/// The queue-draining half of the dispatcher.
///
/// Owned by whichever thread the embedder designates as UI-affine. All
/// dialog state is mutated exclusively from inside tasks this loop runs,
/// which is what makes the rest of the crate lock-free with respect to
/// the dialog.
pub struct UiEventLoop {
    task_rx: mpsc::UnboundedReceiver<UiTask>,
    background: VecDeque<BoxedTask>,
}

impl UiEventLoop {
    /// Drain the queue until every [`UiDispatcher`] handle is dropped.
    ///
    /// Scheduling rule: a foreground task never runs while background
    /// events are pending; they are flushed first, unconditionally.
    /// Background events run one at a time when no foreground work is
    /// queued, so a burst of host notifications cannot starve dispatch.
    pub fn run(mut self) {
        tracing::debug!("UI event loop started");

        loop {
            let message = if self.background.is_empty() {
                match self.task_rx.blocking_recv() {
                    Some(task) => Some(task),
                    None => break,
                }
            } else {
                match self.task_rx.try_recv() {
                    Ok(task) => Some(task),
                    Err(mpsc::error::TryRecvError::Empty) => None,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.drain_background();
                        break;
                    }
                }
            };

            match message {
                Some(UiTask::Foreground(work)) => {
                    // Forced yield: lower-priority events settle first.
                    self.drain_background();
                    work();
                }
                Some(UiTask::Background(event)) => self.background.push_back(event),
                None => {
                    if let Some(event) = self.background.pop_front() {
                        event();
                    }
                }
            }
        }

        tracing::debug!("UI event loop terminated");
    }

    fn drain_background(&mut self) {
        while let Some(event) = self.background.pop_front() {
            event();
        }
    }
}
