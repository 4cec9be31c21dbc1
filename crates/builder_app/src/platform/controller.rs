use std::sync::mpsc;

use builder_core::{update, AppState, AppViewModel, Effect, Msg};
use builder_engine::{EngineHandle, RealtimeChannel, CONNECT_EVENT, DISCONNECT_EVENT};
use builder_logging::{builder_debug, builder_info};

use super::effects::{channel_message_text, map_engine_event, to_payload, SubmitHook};

pub const PROGRESS_EVENT: &str = "progress message";
pub const DEBUG_EVENT: &str = "debug message";

/// Drives one build form: realtime messages and build answers both flow into
/// the same `AppState` through `update`.
pub struct BuildFormController {
    state: AppState,
    engine: EngineHandle,
    channel: RealtimeChannel,
    hook: Option<SubmitHook>,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl BuildFormController {
    pub fn new(engine: EngineHandle, channel: RealtimeChannel, hook: Option<SubmitHook>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            state: AppState::new(),
            engine,
            channel,
            hook,
            msg_tx,
            msg_rx,
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Registers the connect listeners and starts the channel.
    pub fn connect(&self) {
        register_connect_listeners(&self.channel, self.msg_tx.clone());
        self.engine.connect(&self.channel);
    }

    pub fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    pub fn submit(&mut self) {
        let payload = to_payload(&self.state.form().to_form_data());
        let payload = match &self.hook {
            Some(hook) => hook(payload, &self.channel),
            None => payload,
        };

        let effects = self.dispatch(Msg::SubmitClicked);
        if effects.contains(&Effect::SendBuildRequest) {
            builder_info!("Submitting build with {} form parts", payload.parts.len());
            if let Err(err) = self.engine.submit(payload) {
                self.dispatch(Msg::BuildFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    pub fn restart(&mut self) {
        self.dispatch(Msg::RestartClicked);
    }

    /// Applies every pending realtime message, then any build answer.
    pub fn pump(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.dispatch(msg);
        }
        while let Some(event) = self.engine.try_recv() {
            let msg = map_engine_event(event);
            self.dispatch(msg);
        }
    }
}

/// Each connect replaces the message handlers, so reconnects never stack
/// duplicate listeners.
fn register_connect_listeners(channel: &RealtimeChannel, tx: mpsc::Sender<Msg>) {
    let registry = channel.clone();
    let connect_tx = tx.clone();
    channel.off(CONNECT_EVENT);
    channel.on(CONNECT_EVENT, move |_| {
        let _ = connect_tx.send(Msg::ChannelConnected {
            session_id: registry.session_id(),
        });
        subscribe(&registry, &connect_tx);
    });

    channel.off(DISCONNECT_EVENT);
    channel.on(DISCONNECT_EVENT, move |_| {
        let _ = tx.send(Msg::ChannelDisconnected);
    });
}

fn subscribe(channel: &RealtimeChannel, tx: &mpsc::Sender<Msg>) {
    let progress_tx = tx.clone();
    channel.off(PROGRESS_EVENT);
    channel.on(PROGRESS_EVENT, move |data| {
        if let Some(text) = channel_message_text(data) {
            builder_debug!("progress: {}", text);
            let _ = progress_tx.send(Msg::ProgressMessage(text));
        }
    });

    let debug_tx = tx.clone();
    channel.off(DEBUG_EVENT);
    channel.on(DEBUG_EVENT, move |data| {
        if let Some(text) = channel_message_text(data) {
            builder_debug!("debug: {}", text);
            let _ = debug_tx.send(Msg::DebugMessage(text));
        }
    });
}
