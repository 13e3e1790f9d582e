//! Fixed user-facing strings and the model system instruction.

pub const SYSTEM_INSTRUCTION: &str = r#"
You are CareerMate, an expert career advisor AI. Your goal is to help users with interview preparation and resume enhancement.

Your capabilities are:
1. **Interview Preparation**: Ask for the company name and job role, then generate 5-7 relevant behavioral and technical interview questions with concise, actionable tips. Use markdown for clarity.

2. **Resume Enhancement**: Ask for work experience, education, and key skills. If the user mentions a job role or industry, tailor your feedback. Suggest how to rephrase points, add keywords, and format resumes effectively. Use markdown for clarity.

3. **General Conversation**: Be friendly, professional, and helpful. Ignore location-based queries ("restaurants nearby", etc.) - those will be handled by the app.
"#;

pub const GREETING: &str = "Hello! I'm CareerMate. I can help you with interview prep, resume enhancement, or even find places nearby. How can I assist you today?";

pub const MAPS_ERROR_REPLY: &str =
    "Sorry, I encountered an error while fetching map data. Please try again later.";

pub const CONNECTION_ERROR_REPLY: &str =
    "Sorry, I'm having trouble connecting. Please try again in a moment.";

pub const EMPTY_MODEL_REPLY: &str = "No response from model.";

pub const LOCATION_REQUIRED_PREFIX: &str = "I need your location for that query.";

pub const LOCATION_HINT: &str = "Please enable location services and refresh.";

pub const LOCATION_UNSUPPORTED: &str = "Geolocation is not supported by this client.";

/// Reply used when a maps query arrives before any coordinates are known.
pub fn location_required_reply(location_error: Option<&str>) -> String {
    format!(
        "{} {}",
        LOCATION_REQUIRED_PREFIX,
        location_error.unwrap_or(LOCATION_HINT)
    )
}

/// Display string recorded when the locator reports an error.
pub fn location_error_message(detail: &str) -> String {
    format!("Error: {detail}. Location-based features will be unavailable.")
}

/// A canned first message offered while the conversation is fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub title: &'static str,
    pub text: &'static str,
}

pub const SUGGESTIONS: &[Suggestion] = &[
    Suggestion {
        title: "Prep for an interview",
        text: "Help me prepare for an interview.",
    },
    Suggestion {
        title: "Enhance my resume",
        text: "Can you help enhance my resume?",
    },
    Suggestion {
        title: "Find places nearby",
        text: "Show me coffee shops nearby.",
    },
];

/// Suggestions are only offered until the user has said something.
pub fn suggestions_visible(message_count: usize) -> bool {
    message_count <= 1
}
