//! Test doubles for the preview server's collaborators.
//!
//! Each double shares its recorded state through `Rc`, so a test keeps a
//! clone for assertions after handing the original to the server.
//!
//! ```rust,ignore
//! let confirm = ScriptedConfirm::new([true]);
//! let terminator = RecordingTerminator::default();
//! let server = PreviewServer::new(options, shell)
//!     .with_confirm(confirm.clone())
//!     .with_terminator(terminator.clone());
//! // ...
//! assert_eq!(confirm.questions().len(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::serve::discovery::{ConflictingProcess, ProcessDiscovery};
use crate::serve::prompt::Confirm;
use crate::serve::terminate::Terminate;

/// Answers questions from a script; declines once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirm {
    answers: Rc<RefCell<VecDeque<bool>>>,
    questions: Rc<RefCell<Vec<String>>>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedConfirm {
            answers: Rc::new(RefCell::new(answers.into_iter().collect())),
            questions: Rc::default(),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, question: &str) -> bool {
        self.questions.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}

/// Reports a fixed set of PIDs and counts lookups.
#[derive(Debug, Clone, Default)]
pub struct FixedDiscovery {
    pids: Vec<u32>,
    lookups: Rc<Cell<usize>>,
}

impl FixedDiscovery {
    pub fn new(pids: impl IntoIterator<Item = u32>) -> Self {
        FixedDiscovery {
            pids: pids.into_iter().collect(),
            lookups: Rc::default(),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl ProcessDiscovery for FixedDiscovery {
    fn find(&self, _port: u16) -> Vec<ConflictingProcess> {
        self.lookups.set(self.lookups.get() + 1);
        self.pids.iter().copied().map(ConflictingProcess::new).collect()
    }
}

/// Records termination requests; PIDs in `failing` report failure.
#[derive(Debug, Clone, Default)]
pub struct RecordingTerminator {
    failing: Vec<u32>,
    calls: Rc<RefCell<Vec<u32>>>,
}

impl RecordingTerminator {
    pub fn failing(pids: impl IntoIterator<Item = u32>) -> Self {
        RecordingTerminator {
            failing: pids.into_iter().collect(),
            calls: Rc::default(),
        }
    }

    /// PIDs a termination was requested for, in order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.borrow().clone()
    }
}

impl Terminate for RecordingTerminator {
    fn terminate(&self, process: ConflictingProcess) -> bool {
        self.calls.borrow_mut().push(process.pid);
        !self.failing.contains(&process.pid)
    }
}

/// A bind function that replays scripted results and counts attempts.
#[derive(Debug, Default)]
pub struct ScriptedBind {
    results: VecDeque<io::Result<u16>>,
    pub attempts: usize,
}

impl ScriptedBind {
    pub fn new(results: impl IntoIterator<Item = io::Result<u16>>) -> Self {
        ScriptedBind {
            results: results.into_iter().collect(),
            attempts: 0,
        }
    }

    /// Next scripted result; `AddrInUse` once the script runs out.
    pub fn next(&mut self) -> io::Result<u16> {
        self.attempts += 1;
        self.results
            .pop_front()
            .unwrap_or_else(|| Err(addr_in_use()))
    }
}

pub fn addr_in_use() -> io::Error {
    io::Error::from(io::ErrorKind::AddrInUse)
}
