// Public modules
pub mod bot_name_response;
pub mod chat_reply;
pub mod dispatch_request;
pub mod dispatch_response;
pub mod trace_entry;
pub mod turn;

// Re-exports
pub use bot_name_response::BotNameResponse;
pub use chat_reply::ChatReply;
pub use dispatch_request::DispatchRequest;
pub use dispatch_response::DispatchResponse;
pub use trace_entry::TraceEntry;
pub use turn::{Sender, Turn, TurnId};
