//! Shared fixtures for the platform tests.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use builder_core::{AppViewModel, FormField, Msg};
use builder_engine::{
    BuildClient, BuildError, BuildResponse, ChannelSettings, EngineHandle, FormPayload,
    RealtimeChannel,
};

use super::controller::BuildFormController;
use super::effects::SubmitHook;

pub struct FakeClient {
    answer: Result<BuildResponse, BuildError>,
    seen: Arc<Mutex<Vec<FormPayload>>>,
}

#[async_trait::async_trait]
impl BuildClient for FakeClient {
    async fn post_build(&self, payload: &FormPayload) -> Result<BuildResponse, BuildError> {
        self.seen.lock().unwrap().push(payload.clone());
        self.answer.clone()
    }
}

pub fn offline_channel() -> RealtimeChannel {
    RealtimeChannel::new(ChannelSettings::for_server("http://127.0.0.1:5001").unwrap())
}

pub fn make_controller_on(
    channel: RealtimeChannel,
    answer: Result<BuildResponse, BuildError>,
    hook: Option<SubmitHook>,
) -> (BuildFormController, Arc<Mutex<Vec<FormPayload>>>) {
    builder_logging::initialize_for_tests();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let engine = EngineHandle::with_client(Arc::new(FakeClient {
        answer,
        seen: seen.clone(),
    }))
    .unwrap();
    (BuildFormController::new(engine, channel, hook), seen)
}

pub fn make_controller(
    answer: Result<BuildResponse, BuildError>,
    hook: Option<SubmitHook>,
) -> (BuildFormController, Arc<Mutex<Vec<FormPayload>>>) {
    make_controller_on(offline_channel(), answer, hook)
}

pub fn fill(controller: &mut BuildFormController) {
    controller.dispatch(Msg::FieldChanged {
        field: FormField::Name,
        value: "worker".to_string(),
    });
    controller.dispatch(Msg::FileSelected {
        path: "/tmp/job.py".to_string(),
    });
}

pub fn pump_until(controller: &mut BuildFormController, done: impl Fn(&AppViewModel) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(&controller.view()) {
        assert!(Instant::now() < deadline, "view never reached the expected state");
        controller.pump();
        thread::sleep(Duration::from_millis(5));
    }
}

pub fn success() -> BuildResponse {
    BuildResponse {
        result: "success".to_string(),
        message: "Success! Image build OK!".to_string(),
        uuid: "u1".to_string(),
        tags: vec!["latest".to_string()],
        jobs: vec!["ExecuteJob".to_string()],
        ..BuildResponse::default()
    }
}
