use crate::types::DispatchResponse;

/// What the transport produced for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The whole reply arrived at once.
    Complete(DispatchResponse),

    /// The service began an incremental reply.
    ///
    /// Reserved: the controller does not consume incremental replies yet and
    /// fails the dispatch when it sees this variant.
    Streaming,
}
