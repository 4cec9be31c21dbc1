#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited one of the text inputs of the builder form.
    FieldChanged {
        field: crate::FormField,
        value: String,
    },
    /// User picked the package file.
    FileSelected { path: String },
    /// Realtime channel (re)connected with the given session id.
    ChannelConnected { session_id: Option<String> },
    /// Realtime channel lost its connection.
    ChannelDisconnected,
    /// `progress message` pushed by the server.
    ProgressMessage(String),
    /// `debug message` pushed by the server.
    DebugMessage(String),
    /// User clicked Submit.
    SubmitClicked,
    /// The build endpoint answered.
    BuildResponded(crate::BuildResult),
    /// The build request never produced a response.
    BuildFailed { reason: String },
    /// User clicked Restart.
    RestartClicked,
}
