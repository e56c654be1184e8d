//! Scripted SDK for tests.
//!
//! Not part of the public API surface; compiled unconditionally so
//! downstream crates can drive their handler tests with it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::sdk::{
    ReviewerSdk, ReviewerThread, SdkError, SdkResult, ThreadOptions, TurnOptions, TurnOutput,
};

/// One scripted turn.
#[derive(Clone, Debug)]
pub enum MockTurn {
    /// Return this string as the final response.
    Respond(String),
    /// Fail with this error.
    Fail(SdkError),
    /// Pend until the cancel token fires, then fail as aborted.
    HangUntilCancelled,
}

/// Shared script and call recording.
#[derive(Default)]
pub struct MockState {
    /// Responses consumed one per turn, in order.
    pub turns: VecDeque<MockTurn>,
    /// Thread ids consumed one per thread acquisition; when exhausted the
    /// acquired thread reports `thread_mock` (or the resumed id).
    pub thread_ids: VecDeque<Option<String>>,
    /// Every prompt sent, in order.
    pub prompts: Vec<String>,
    /// Number of fresh threads started.
    pub started: usize,
    /// Ids passed to `resume_thread`, in order.
    pub resumed: Vec<String>,
    /// When set, thread acquisition fails with this error.
    pub acquire_error: Option<SdkError>,
}

/// Scripted [`ReviewerSdk`].
#[derive(Clone, Default)]
pub struct MockSdk {
    state: Arc<Mutex<MockState>>,
}

impl MockSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one JSON response.
    pub fn respond(&self, response: impl Into<String>) -> &Self {
        self.lock().turns.push_back(MockTurn::Respond(response.into()));
        self
    }

    /// Push one failing turn.
    pub fn fail(&self, error: SdkError) -> &Self {
        self.lock().turns.push_back(MockTurn::Fail(error));
        self
    }

    /// Push a turn that hangs until its deadline cancels it.
    pub fn hang(&self) -> &Self {
        self.lock().turns.push_back(MockTurn::HangUntilCancelled);
        self
    }

    /// Push a thread id for the next acquired thread.
    pub fn thread_id(&self, id: Option<&str>) -> &Self {
        self.lock().thread_ids.push_back(id.map(ToOwned::to_owned));
        self
    }

    /// Make the next `start_thread`/`resume_thread` fail.
    pub fn fail_acquire(&self, error: SdkError) -> &Self {
        self.lock().acquire_error = Some(error);
        self
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

#[async_trait]
impl ReviewerSdk for MockSdk {
    async fn start_thread(&self, _opts: &ThreadOptions) -> SdkResult<Box<dyn ReviewerThread>> {
        let mut state = self.lock();
        if let Some(err) = state.acquire_error.take() {
            return Err(err);
        }
        state.started += 1;
        let id = state
            .thread_ids
            .pop_front()
            .unwrap_or(Some("thread_mock".to_owned()));
        Ok(Box::new(MockThread {
            state: Arc::clone(&self.state),
            id,
        }))
    }

    async fn resume_thread(
        &self,
        id: &str,
        _opts: &ThreadOptions,
    ) -> SdkResult<Box<dyn ReviewerThread>> {
        let mut state = self.lock();
        if let Some(err) = state.acquire_error.take() {
            return Err(err);
        }
        state.resumed.push(id.to_owned());
        let id = state
            .thread_ids
            .pop_front()
            .unwrap_or(Some(id.to_owned()));
        Ok(Box::new(MockThread {
            state: Arc::clone(&self.state),
            id,
        }))
    }
}

struct MockThread {
    state: Arc<Mutex<MockState>>,
    id: Option<String>,
}

#[async_trait]
impl ReviewerThread for MockThread {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    async fn run(&mut self, prompt: &str, opts: &TurnOptions) -> SdkResult<TurnOutput> {
        let turn = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.prompts.push(prompt.to_owned());
            state.turns.pop_front()
        };
        match turn {
            Some(MockTurn::Respond(text)) => Ok(TurnOutput {
                final_response: text,
            }),
            Some(MockTurn::Fail(err)) => Err(err),
            Some(MockTurn::HangUntilCancelled) => {
                opts.cancel.cancelled().await;
                Err(SdkError::aborted())
            }
            None => Err(SdkError::new("mock: no scripted turn left")),
        }
    }
}
