use builder_core::{BuildResult, FormData, FormEntry, Msg};
use builder_engine::{BuildResponse, EngineEvent, FormPayload, RealtimeChannel};
use builder_logging::{builder_info, builder_warn};
use serde::Deserialize;
use serde_json::Value;

/// Host-supplied customization of the outgoing payload, run once per submit.
pub type SubmitHook = Box<dyn Fn(FormPayload, &RealtimeChannel) -> FormPayload + Send>;

/// Form field the build server reads to route realtime messages.
pub const SESSION_FIELD: &str = "sid";

#[derive(Debug, Deserialize)]
struct ChannelMessage {
    message: String,
}

/// Extracts `message` from a `{ "message": ... }` realtime payload.
pub fn channel_message_text(data: &Value) -> Option<String> {
    match ChannelMessage::deserialize(data) {
        Ok(payload) => Some(payload.message),
        Err(err) => {
            builder_warn!("Ignoring realtime payload {}: {}", data, err);
            None
        }
    }
}

/// Appends the realtime session id so progress lines reach this client.
pub fn attach_session_id(mut payload: FormPayload, channel: &RealtimeChannel) -> FormPayload {
    match channel.session_id() {
        Some(sid) => payload.push_text(SESSION_FIELD, sid),
        None => builder_warn!("Realtime channel not connected; build progress will not stream"),
    }
    payload
}

pub fn to_payload(data: &FormData) -> FormPayload {
    let mut payload = FormPayload::new();
    for entry in &data.entries {
        match entry {
            FormEntry::Text { name, value } => payload.push_text(name.clone(), value.clone()),
            FormEntry::File { name, path } => payload.push_file(name.clone(), path.clone()),
        }
    }
    payload
}

pub fn map_engine_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::BuildCompleted { result: Ok(response) } => {
            builder_info!("Build answered result={}", response.result);
            Msg::BuildResponded(map_response(response))
        }
        EngineEvent::BuildCompleted { result: Err(err) } => {
            builder_warn!("Build request failed: {}", err);
            Msg::BuildFailed {
                reason: err.to_string(),
            }
        }
    }
}

fn map_response(response: BuildResponse) -> BuildResult {
    BuildResult {
        result: response.result,
        message: response.message,
        details: response.details,
        uuid: response.uuid,
        tags: response.tags,
        jobs: response.jobs,
        tasks: response.tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::{BuildForm, FormField};
    use builder_engine::{BuildError, ChannelSettings, FailureKind, FormPart};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn payload_keeps_form_order_and_file_path() {
        let mut form = BuildForm::default();
        form.set_field(FormField::Name, "worker");
        form.set_field(FormField::Apt, "curl git");
        form.select_file("/tmp/jobs.tar.gz");

        let payload = to_payload(&form.to_form_data());
        assert_eq!(payload.text("name"), Some("worker"));
        assert_eq!(payload.text("apt"), Some("curl git"));
        assert_eq!(
            payload.parts.last(),
            Some(&FormPart::File {
                name: "package".to_string(),
                path: "/tmp/jobs.tar.gz".into(),
            })
        );
    }

    #[test]
    fn session_id_is_skipped_when_not_connected() {
        let channel =
            RealtimeChannel::new(ChannelSettings::for_server("http://127.0.0.1:5001").unwrap());
        let mut payload = FormPayload::new();
        payload.push_text("name", "worker");

        let payload = attach_session_id(payload, &channel);
        assert_eq!(payload.text(SESSION_FIELD), None);
        assert_eq!(payload.parts.len(), 1);
    }

    #[test]
    fn channel_message_requires_message_field() {
        assert_eq!(
            channel_message_text(&json!({ "message": "Step 3/7" })),
            Some("Step 3/7".to_string())
        );
        assert_eq!(channel_message_text(&json!({ "text": "x" })), None);
        assert_eq!(channel_message_text(&Value::Null), None);
    }

    #[test]
    fn engine_failure_maps_to_build_failed() {
        let msg = map_engine_event(EngineEvent::BuildCompleted {
            result: Err(BuildError {
                kind: FailureKind::HttpStatus(502),
                message: "502 Bad Gateway".to_string(),
            }),
        });
        assert!(matches!(msg, Msg::BuildFailed { .. }));
    }
}
