/// The delimiter strings a chat-tuned model expects around system instructions and user
/// turns.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ChatMarkers {
    /// The marker to use before system prompts.
    pub system_prompt_marker: &'static str,
    /// The marker to use after system prompts.
    pub end_system_prompt_marker: &'static str,
    /// The marker to use before user input.
    pub user_marker: &'static str,
    /// The marker to use after user input.
    pub end_user_marker: &'static str,
    /// The marker to use before assistant messages.
    pub assistant_marker: &'static str,
    /// The marker to use after assistant messages.
    pub end_assistant_marker: &'static str,
}

impl ChatMarkers {
    /// Markers for the Llama 2 chat format. The system message and the first user turn
    /// share a single `[INST]` block:
    ///
    /// ```text
    /// <s>[INST] <<SYS>>
    /// {system}
    /// <</SYS>>
    /// {user} [/INST]
    /// ```
    pub fn llama_2_chat() -> Self {
        Self {
            system_prompt_marker: "<s>[INST] <<SYS>>\n",
            end_system_prompt_marker: "\n<</SYS>>\n",
            user_marker: "",
            end_user_marker: " [/INST]",
            assistant_marker: "",
            end_assistant_marker: "</s>",
        }
    }
}

/// Format a single-turn chat prompt from a system message and a user message.
///
/// Both messages are embedded verbatim between the markers. The function is pure: the
/// same inputs always produce the same prompt.
pub fn format_prompt(markers: &ChatMarkers, system_message: &str, user_message: &str) -> String {
    let mut prompt = String::with_capacity(
        markers.system_prompt_marker.len()
            + system_message.len()
            + markers.end_system_prompt_marker.len()
            + markers.user_marker.len()
            + user_message.len()
            + markers.end_user_marker.len(),
    );
    prompt.push_str(markers.system_prompt_marker);
    prompt.push_str(system_message);
    prompt.push_str(markers.end_system_prompt_marker);
    prompt.push_str(markers.user_marker);
    prompt.push_str(user_message);
    prompt.push_str(markers.end_user_marker);
    prompt
}
