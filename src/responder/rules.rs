use async_trait::async_trait;
use chrono::Local;
use super::ResponseGenerator;

enum CannedReply {
    Text(&'static str),
    CurrentTime,
    CurrentDate,
}

impl CannedReply {
    fn render(&self) -> String {
        match self {
            CannedReply::Text(text) => text.to_string(),
            CannedReply::CurrentTime =>
                format!(
                    "I don't have access to real-time data, but you sent this message at {}",
                    Local::now().format("%H:%M:%S")
                ),
            CannedReply::CurrentDate =>
                format!(
                    "Today's date when you sent this message: {}",
                    Local::now().format("%Y-%m-%d")
                ),
        }
    }
}

/// Trigger phrases, scanned in this order. The first trigger found inside a
/// message wins, so "hi" shadows later triggers that happen to contain it.
const CANNED_REPLIES: &[(&str, CannedReply)] = &[
    ("hello", CannedReply::Text("Hello! How can I help you today?")),
    ("hi", CannedReply::Text("Hi there! What can I do for you?")),
    ("hey", CannedReply::Text("Hey! How's it going? What would you like to chat about?")),
    ("how are you", CannedReply::Text("I'm doing great! Thanks for asking. How can I assist you?")),
    (
        "what is your name",
        CannedReply::Text("I'm ChatBot, your AI assistant. What would you like to know?"),
    ),
    (
        "who are you",
        CannedReply::Text(
            "I'm an AI chatbot created to help answer your questions and have conversations!"
        ),
    ),
    (
        "what can you do",
        CannedReply::Text(
            "I can chat with you, answer basic questions, and help with simple tasks. What would you like to explore?"
        ),
    ),
    ("bye", CannedReply::Text("Goodbye! Have a great day!")),
    ("goodbye", CannedReply::Text("See you later! Thanks for chatting with me!")),
    ("thanks", CannedReply::Text("You're welcome! Is there anything else I can help you with?")),
    ("thank you", CannedReply::Text("My pleasure! Feel free to ask me anything else.")),
    (
        "help",
        CannedReply::Text(
            "I'm here to help! You can ask me questions, have a conversation, or just chat about anything you'd like."
        ),
    ),
    (
        "about",
        CannedReply::Text(
            "I'm a simple ChatGPT-like chatbot demo. I can respond to basic questions and maintain our conversation history!"
        ),
    ),
    (
        "weather",
        CannedReply::Text(
            "I don't have access to real-time weather data, but you can check your local weather forecast online!"
        ),
    ),
    ("time", CannedReply::CurrentTime),
    ("date", CannedReply::CurrentDate),
    (
        "how old are you",
        CannedReply::Text(
            "I'm an AI, so I don't have an age in the traditional sense. I exist to help and chat with you!"
        ),
    ),
    (
        "where are you from",
        CannedReply::Text("I exist in the digital realm, running on servers to help users like you!"),
    ),
    (
        "good morning",
        CannedReply::Text("Good morning! Hope you're having a great start to your day. How can I help?"),
    ),
    ("good afternoon", CannedReply::Text("Good afternoon! What brings you here today?")),
    ("good evening", CannedReply::Text("Good evening! How has your day been?")),
    ("good night", CannedReply::Text("Good night! Sleep well and have sweet dreams!")),
    (
        "how do you work",
        CannedReply::Text(
            "I work by processing your text input and responding with pre-programmed responses. I'm a simple chatbot demo!"
        ),
    ),
    (
        "are you real",
        CannedReply::Text(
            "I'm a computer program designed to chat with you. I'm not human, but I'm here to help!"
        ),
    ),
    (
        "tell me a joke",
        CannedReply::Text("Why don't scientists trust atoms? Because they make up everything! 😄"),
    ),
    (
        "what's your favorite color",
        CannedReply::Text(
            "I don't see colors, but if I could, I think I'd like blue - it seems calm and trustworthy!"
        ),
    ),
    (
        "do you like music",
        CannedReply::Text(
            "I can't hear music, but I understand it brings joy to many people! What's your favorite genre?"
        ),
    ),
    (
        "tell me about yourself",
        CannedReply::Text(
            "I'm a friendly chatbot created to demonstrate basic conversational AI. I love chatting with users like you!"
        ),
    ),
];

const QUESTION_WORDS: &[&str] = &["what", "how", "why", "when", "where", "who"];
const LONG_MESSAGE_WORDS: usize = 5;
const PREVIEW_CHARS: usize = 50;

/// Keyword matched canned replies. No network, no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedResponder;

impl RuleBasedResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn reply(&self, message: &str) -> String {
        let normalized = message.trim().to_lowercase();

        if let Some((_, reply)) = CANNED_REPLIES.iter().find(|(trigger, _)| *trigger == normalized) {
            return reply.render();
        }

        if
            let Some((_, reply)) = CANNED_REPLIES.iter().find(|(trigger, _)|
                normalized.contains(trigger)
            )
        {
            return reply.render();
        }

        if QUESTION_WORDS.iter().any(|word| normalized.starts_with(word)) {
            return format!(
                "That's an interesting question about '{}'. I'm a simple demo chatbot, so I might not have all the answers, but I'm happy to chat about it!",
                message
            );
        }

        if message.split_whitespace().count() > LONG_MESSAGE_WORDS {
            let preview: String = message.chars().take(PREVIEW_CHARS).collect();
            return format!(
                "Thanks for sharing that with me! You mentioned something about '{}...' - I'm a simple chatbot, but I find our conversation interesting. What else would you like to talk about?",
                preview
            );
        }

        format!(
            "I understand you said: '{}'. I'm a simple chatbot demo, but I'm here to chat! Try asking me 'hello', 'how are you', 'what can you do', or tell me a joke!",
            message
        )
    }
}

#[async_trait]
impl ResponseGenerator for RuleBasedResponder {
    async fn generate(&self, message: &str) -> String {
        self.reply(message)
    }

    fn mode(&self) -> &'static str {
        "rules"
    }
}
