pub mod ai;
pub mod handlers;
pub mod improve;
pub mod pipeline;
pub mod prompts;
pub mod response;
