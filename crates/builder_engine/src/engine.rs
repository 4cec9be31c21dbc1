use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use builder_logging::builder_warn;

use crate::client::{BuildClient, BuildSettings, ReqwestBuildClient};
use crate::{BuildError, EngineEvent, FailureKind, FormPayload, RealtimeChannel};

enum EngineCommand {
    Connect(RealtimeChannel),
    Submit { payload: FormPayload },
}

/// Runs the IO side on a dedicated tokio runtime thread.
///
/// Dropping the handle stops the runtime, which also tears down the realtime
/// channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: BuildSettings) -> io::Result<Self> {
        Self::with_client(Arc::new(ReqwestBuildClient::new(settings)))
    }

    pub fn with_client(client: Arc<dyn BuildClient>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("builder-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Connect(channel) => {
                            runtime.spawn(channel.run());
                        }
                        EngineCommand::Submit { payload } => {
                            let client = client.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                let result = client.post_build(&payload).await;
                                let _ = event_tx.send(EngineEvent::BuildCompleted { result });
                            });
                        }
                    }
                }
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    /// Starts the channel's connect/reconnect loop.
    pub fn connect(&self, channel: &RealtimeChannel) {
        if self
            .cmd_tx
            .send(EngineCommand::Connect(channel.clone()))
            .is_err()
        {
            builder_warn!("Engine thread gone; realtime channel not started");
        }
    }

    /// Queues one build request; the answer arrives as `EngineEvent::BuildCompleted`.
    pub fn submit(&self, payload: FormPayload) -> Result<(), BuildError> {
        self.cmd_tx
            .send(EngineCommand::Submit { payload })
            .map_err(|_| BuildError::new(FailureKind::Network, "engine thread stopped"))
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
