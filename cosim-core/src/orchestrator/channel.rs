use std::sync::mpsc::{Receiver, Sender};

use log::{debug, warn};

use crate::{error::NodeError, publish::Publisher};

use super::{Command, Orchestrator, Reply};

/// Everything a node sends back over a channel link.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// A value published after a step.
    Saved { attribute: String, value: f64 },
    /// The outcome of one command.
    Reply(Result<Reply, NodeError>),
    /// The error that terminated the node.
    Failed(NodeError),
}

/// The node end of a channel link, passed to [`NodeAdapter::run`].
///
/// [`NodeAdapter::run`]: crate::NodeAdapter::run
#[derive(Debug)]
pub struct ChannelOrchestrator {
    commands: Receiver<Command>,
    events: Sender<NodeEvent>,
}

/// The scheduler end of a channel link.
#[derive(Debug)]
pub struct ChannelPeer {
    commands: Sender<Command>,
    events: Receiver<NodeEvent>,
}

/// The result of one request made through a [`ChannelPeer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub reply: Reply,
    /// Values the node published while handling the request.
    pub saved: Vec<(String, f64)>,
}

/// Creates a connected orchestrator/peer pair.
///
/// Run the node with the [`ChannelOrchestrator`] on its own thread and drive
/// it from the [`ChannelPeer`].
#[must_use]
pub fn channel() -> (ChannelOrchestrator, ChannelPeer) {
    let (command_tx, command_rx) = std::sync::mpsc::channel();
    let (event_tx, event_rx) = std::sync::mpsc::channel();

    (
        ChannelOrchestrator {
            commands: command_rx,
            events: event_tx,
        },
        ChannelPeer {
            commands: command_tx,
            events: event_rx,
        },
    )
}

impl Publisher for ChannelOrchestrator {
    fn save(&mut self, attribute: &str, value: f64) {
        // A closed peer means the run is over; the next `next_command` ends it.
        let _ = self.events.send(NodeEvent::Saved {
            attribute: attribute.to_owned(),
            value,
        });
    }
}

impl Orchestrator for ChannelOrchestrator {
    fn next_command(&mut self) -> Option<Command> {
        self.commands.recv().ok()
    }

    fn reply(&mut self, reply: Result<Reply, NodeError>) {
        let _ = self.events.send(NodeEvent::Reply(reply));
    }

    fn report_failure(&mut self, error: &NodeError) {
        let _ = self.events.send(NodeEvent::Failed(error.clone()));
    }
}

impl ChannelPeer {
    /// Sends a command and waits for its reply.
    ///
    /// # Errors
    ///
    /// Returns the node's error for the command, or [`NodeError::Terminated`]
    /// if the node is no longer running.
    pub fn request(&self, command: Command) -> Result<Exchange, NodeError> {
        self.commands
            .send(command)
            .map_err(|_| NodeError::Terminated)?;

        let mut saved = Vec::new();
        loop {
            match self.events.recv().map_err(|_| NodeError::Terminated)? {
                NodeEvent::Saved { attribute, value } => saved.push((attribute, value)),
                NodeEvent::Reply(Err(error)) if error.is_fatal() => {
                    self.consume_failure();
                    return Err(error);
                }
                NodeEvent::Reply(reply) => return reply.map(|reply| Exchange { reply, saved }),
                NodeEvent::Failed(error) => return Err(error),
            }
        }
    }

    /// Reads the failure report that follows a fatal reply.
    fn consume_failure(&self) {
        match self.events.recv() {
            Ok(NodeEvent::Failed(error)) => debug!("node reported failure: {error}"),
            Ok(event) => warn!("expected a failure report, got {event:?}"),
            Err(_) => {}
        }
    }

    /// Stages a value on the node.
    ///
    /// # Errors
    ///
    /// See [`ChannelPeer::request`].
    pub fn set(&self, attribute: &str, value: f64) -> Result<(), NodeError> {
        self.request(Command::Set {
            attribute: attribute.to_owned(),
            value,
        })
        .map(|_| ())
    }

    /// Steps the node and returns the values it published.
    ///
    /// # Errors
    ///
    /// See [`ChannelPeer::request`].
    pub fn step(&self, elapsed_seconds: f64) -> Result<Vec<(String, f64)>, NodeError> {
        self.request(Command::Step { elapsed_seconds })
            .map(|exchange| exchange.saved)
    }

    /// Reads a value from the node.
    ///
    /// # Errors
    ///
    /// See [`ChannelPeer::request`]. A reply without a value is reported as
    /// [`NodeError::UnexpectedReply`].
    pub fn get(&self, attribute: &str) -> Result<f64, NodeError> {
        match self
            .request(Command::Get {
                attribute: attribute.to_owned(),
            })?
            .reply
        {
            Reply::Value(value) => Ok(value),
            Reply::Done => Err(NodeError::UnexpectedReply {
                command: format!("get `{attribute}`"),
            }),
        }
    }

    /// Ends the node's run.
    ///
    /// # Errors
    ///
    /// See [`ChannelPeer::request`].
    pub fn terminate(&self) -> Result<(), NodeError> {
        self.request(Command::Terminate).map(|_| ())
    }
}
