//! Persona and instruction text sent to the model.

/// Phrases that make a post read as machine-written. The model is told to
/// avoid them; nothing checks the output afterwards.
pub const BANNED_PHRASES: &[&str] = &[
    "delve",
    "dive into",
    "game-changer",
    "unlock the power",
    "harness the power",
    "in today's fast-paced world",
    "it's important to note",
    "embark on a journey",
    "elevate your",
    "a testament to",
    "nature's secret",
];

pub fn system_prompt() -> String {
    let banned = BANNED_PHRASES
        .iter()
        .map(|phrase| format!("\"{phrase}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You write short social media posts about herbs and natural health for a general audience. \
         Write like a well-read person talking to a friend: plain words, concrete facts, \
         normal grammar and varied sentence length. \
         Do not sell anything and do not hype. \
         Never use hashtags or emojis. \
         Never use these phrases: {banned}."
    )
}

pub fn user_prompt(title: Option<&str>, content: &str, char_budget: usize) -> String {
    format!(
        "Article title: {title}\n\n\
         Key points:\n{content}\n\n\
         Constraints:\n\
         - Keep the post under {char_budget} characters.\n\
         - Do NOT include the URL; it will be appended separately.\n\
         - Do not use markdown or quote the article; rewrite in your own words.\n\
         - Return only the post text.",
        title = title.unwrap_or("Untitled"),
    )
}
