#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the prepared payload to the build endpoint.
    SendBuildRequest,
}
