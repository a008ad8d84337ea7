//! API Module
//!
//! Chat completion wire types and parsed backend responses.

pub mod completion;
pub mod response;

pub use completion::{
    Choice, CompletionRequest, CompletionResponse, ContentPart, FunctionCall, FunctionDefinition,
    ImageUrl, Message, MessageContent, ResponseFormat, ResponseMessage, Tool, ToolCall, ToolChoice,
    ToolChoiceFunction, Usage,
};
pub use response::{LlmResponse, ParsedToolCall};
