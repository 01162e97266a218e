mod channel;

pub use channel::{ChannelOrchestrator, ChannelPeer, Exchange, NodeEvent, channel};

use log::{error, warn};

use crate::{
    adapter::NodeAdapter, binding::ModelBinding, error::NodeError, publish::Publisher,
};

/// A request the orchestrator sends to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Stage a value for an attribute.
    Set { attribute: String, value: f64 },
    /// Advance to an elapsed offset (seconds since the node's start instant).
    Step { elapsed_seconds: f64 },
    /// Read an attribute at the current simulated time.
    Get { attribute: String },
    /// End the run.
    Terminate,
}

/// A successful answer to a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// The command completed with nothing to return.
    Done,
    /// The value read by a [`Command::Get`].
    Value(f64),
}

/// The scheduler side of a node's run loop.
///
/// An orchestrator feeds commands to the node, receives one reply per command,
/// and collects published values through its [`Publisher`] implementation.
/// How commands are transported (in-process, channels, sockets) is up to the
/// implementation.
pub trait Orchestrator: Publisher {
    /// Returns the next command, or `None` once the orchestrator has gone away.
    fn next_command(&mut self) -> Option<Command>;

    /// Receives the outcome of the last command.
    fn reply(&mut self, reply: Result<Reply, NodeError>);

    /// Receives the error that terminated the node.
    fn report_failure(&mut self, error: &NodeError);
}

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub steps: usize,
}

impl<B: ModelBinding> NodeAdapter<B> {
    /// Hands control to the orchestrator until it ends the run.
    ///
    /// Commands are executed one at a time, in order. Recoverable errors are
    /// replied and the node keeps serving. A fatal error is replied, reported
    /// through [`Orchestrator::report_failure`], and ends the run.
    ///
    /// The run ends normally on [`Command::Terminate`] or when the command
    /// stream closes.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that terminated the node.
    pub fn run<O: Orchestrator>(mut self, orchestrator: &mut O) -> Result<RunSummary, NodeError> {
        let mut summary = RunSummary::default();

        while let Some(command) = orchestrator.next_command() {
            summary.commands += 1;

            let outcome = match command {
                Command::Set { attribute, value } => {
                    self.set_attribute(&attribute, value).map(|()| Reply::Done)
                }
                Command::Step { elapsed_seconds } => {
                    let result = self.step(elapsed_seconds, &mut *orchestrator).map(|()| Reply::Done);
                    if result.is_ok() {
                        summary.steps += 1;
                    }
                    result
                }
                Command::Get { attribute } => self.get_attribute(&attribute).map(Reply::Value),
                Command::Terminate => {
                    orchestrator.reply(Ok(Reply::Done));
                    break;
                }
            };

            match outcome {
                Ok(reply) => orchestrator.reply(Ok(reply)),
                Err(err) if err.is_fatal() => {
                    error!("{} node run ended: {err}", self.binding().kind());
                    orchestrator.reply(Err(err.clone()));
                    orchestrator.report_failure(&err);
                    return Err(err);
                }
                Err(err) => {
                    warn!("{} node rejected a command: {err}", self.binding().kind());
                    orchestrator.reply(Err(err));
                }
            }
        }

        self.terminate();
        Ok(summary)
    }
}
