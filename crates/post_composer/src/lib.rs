//! Post composer: rewrites scraped key points as a short social-media post
//! using an OpenAI-compatible chat-completions endpoint.
//!
//! Quality rules (tone, no hashtags, banned phrases) live in the prompt only;
//! the single safety net applied to the output is the character cap.

mod budget;
mod client;
mod composer;
mod error;
mod prompt;
mod types;

pub use budget::{
    finalize_post, truncate_chars, CharacterBudget, Post, BUDGET_FLOOR, POST_CEILING,
    TRUNCATION_MARKER, URL_RESERVE,
};
pub use client::ChatClient;
pub use composer::{ComposerSettings, PostComposer, DEFAULT_API_KEY};
pub use error::{ComposeError, Result};
pub use prompt::{system_prompt, user_prompt, BANNED_PHRASES};
pub use types::{ChatRequest, ChatResponse, Message, Usage};
