//! Deterministic canned replies for mock mode.
//!
//! Rules are evaluated in order; the first match wins. Keep broader
//! categories (mood, help) below the specific emotional ones so messages
//! like "I'm anxious about my mood" land on the anxiety reply.

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| message.contains(k))
}

fn is_greeting(message: &str) -> bool {
    const OPENERS: &[&str] = &[
        "hi",
        "hello",
        "hey",
        "greetings",
        "good morning",
        "good afternoon",
        "good evening",
    ];
    OPENERS.iter().any(|o| message.starts_with(o))
}

fn is_anxiety(m: &str) -> bool {
    contains_any(m, &["anxious", "anxiety", "worried", "panic", "nervous", "tense"])
}

fn is_stress(m: &str) -> bool {
    contains_any(m, &["stressed", "overwhelmed", "pressure", "too much"])
}

fn is_sadness(m: &str) -> bool {
    contains_any(m, &["sad", "depressed", "down", "hopeless", "empty", "worthless"])
}

fn is_anger(m: &str) -> bool {
    contains_any(m, &["angry", "frustrated", "irritated", "mad", "furious"])
}

fn is_loneliness(m: &str) -> bool {
    contains_any(m, &["lonely", "alone", "isolated", "no one"])
}

fn is_fatigue(m: &str) -> bool {
    contains_any(m, &["tired", "exhausted", "fatigue", "sleep", "energy"])
}

fn is_positive(m: &str) -> bool {
    contains_any(m, &["happy", "great", "good", "wonderful", "excited", "proud"])
}

fn is_confusion(m: &str) -> bool {
    contains_any(m, &["confused", "don't know", "uncertain", "lost", "what to do"])
}

fn is_help_seeking(m: &str) -> bool {
    contains_any(m, &["help", "advice", "what should i", "suggest", "recommend"])
}

fn is_mood_pattern(m: &str) -> bool {
    contains_any(m, &["mood", "pattern", "trend", "feeling"])
}

fn is_coping(m: &str) -> bool {
    contains_any(m, &["cope", "strategy", "technique", "manage"])
}

fn is_gratitude(m: &str) -> bool {
    contains_any(m, &["grateful", "thankful", "appreciate", "blessing"])
}

const GREETING: &str = r#"{
  "reply": "Hello! I'm glad you're here. I'm your wellness companion and I'm here to listen. How are you feeling today? Feel free to share whatever is on your mind.",
  "summary": "User opened the conversation. Ready to provide support.",
  "suggestions": [
    "Share how you're feeling right now",
    "Tell me about your day or week",
    "Ask about your mood patterns or coping strategies"
  ]
}"#;

const ANXIETY: &str = r#"{
  "reply": "I hear that you're feeling anxious, and your feelings are valid. Anxiety is the body's natural response to stress, but when it becomes overwhelming it helps to have tools to manage it. Let's work through this together.",
  "summary": "Experiencing anxiety symptoms. Needs grounding techniques and support.",
  "suggestions": [
    "Try the 5-4-3-2-1 grounding technique: name 5 things you see, 4 you can touch, 3 you hear, 2 you smell, 1 you taste",
    "Practice box breathing: inhale for 4, hold for 4, exhale for 4, hold for 4",
    "Write down what's making you anxious — seeing it on paper can help",
    "If anxiety persists or worsens, please reach out to a mental health professional"
  ]
}"#;

const STRESS: &str = r#"{
  "reply": "Feeling stressed and overwhelmed is exhausting, and I'm sorry you're going through this. It's okay not to have everything figured out right now. Let's break things down into manageable pieces.",
  "summary": "User is experiencing stress and feeling overwhelmed.",
  "suggestions": [
    "List everything on your mind, then pick just the 3 most urgent items",
    "Take a 10-minute break away from your tasks",
    "Practice saying no to new commitments until you have more capacity",
    "Consider reaching out to friends, family, or a counselor for support"
  ]
}"#;

const SADNESS: &str = r#"{
  "reply": "I'm truly sorry you're feeling this way. These feelings can be heavy, and it takes courage to acknowledge them. You don't have to face this alone, and what you're feeling deserves care and attention.",
  "summary": "User is experiencing sadness or low mood. Gentle support recommended.",
  "suggestions": [
    "Reach out to someone you trust — a friend, family member, or therapist",
    "Try to keep a routine: eat meals, stay hydrated, get some fresh air",
    "Do one small, gentle activity you used to enjoy, even if you don't feel like it",
    "If you're having thoughts of self-harm, please call a crisis helpline immediately (988)"
  ]
}"#;

const ANGER: &str = r#"{
  "reply": "Anger is a powerful emotion, and it's telling you that something matters to you. It's okay to feel angry — let's find healthy ways to process those feelings so they don't consume you.",
  "summary": "User is experiencing anger or frustration. Needs healthy outlets.",
  "suggestions": [
    "Take a timeout: step away from the situation for 10-15 minutes",
    "Find a physical release: a run, push-ups, or a brisk walk",
    "Journal about what triggered the anger to help process it",
    "Once calm, consider addressing the underlying issue constructively"
  ]
}"#;

const LONELINESS: &str = r#"{
  "reply": "Feeling lonely can be one of the most painful experiences, even when surrounded by people. You're not alone in feeling alone — many people experience this, and there are ways to reconnect with others and yourself.",
  "summary": "User is experiencing loneliness. Needs connection and community.",
  "suggestions": [
    "Reach out to one person — a text, a call, or a coffee date",
    "Join an online or local group built around your interests",
    "Practice self-compassion: treat yourself as you would a good friend",
    "Consider volunteering — helping others creates meaningful connections"
  ]
}"#;

const FATIGUE: &str = r#"{
  "reply": "Feeling tired all the time can really wear down your quality of life. It sounds like your body might be asking for extra care right now. Let's look at what might be draining your energy and how to restore it.",
  "summary": "User reports low energy and fatigue. Sleep hygiene and self-care needed.",
  "suggestions": [
    "Prioritize 7-9 hours of sleep with a consistent bedtime and wake time",
    "Build a wind-down routine: no screens for an hour before bed, dim lights",
    "Check in with your body: food, hydration, and movement all matter",
    "If fatigue persists for weeks, see a doctor to rule out medical causes"
  ]
}"#;

const POSITIVE: &str = r#"{
  "reply": "That's wonderful to hear! It's so important to acknowledge and celebrate the positive moments. Your happiness matters — let's make sure to savor this feeling and understand what contributed to it.",
  "summary": "User is experiencing positive emotions. Encouraging gratitude and awareness.",
  "suggestions": [
    "Take a moment to notice what made you feel this way — write it down",
    "List 3 specific things you're grateful for right now",
    "Share your joy with someone you care about",
    "Remember this feeling — you can return to it when times are tough"
  ]
}"#;

const CONFUSION: &str = r#"{
  "reply": "It's completely normal to feel confused or uncertain sometimes. Life doesn't come with a manual, and it's okay not to have all the answers. Let's bring some clarity to your situation, one step at a time.",
  "summary": "User is experiencing confusion or uncertainty. Needs clarity.",
  "suggestions": [
    "Write out what specifically feels confusing",
    "Break the situation down into smaller, more manageable questions",
    "Talk it through with someone you trust — saying it out loud helps",
    "Remember: you don't need to figure everything out today"
  ]
}"#;

const HELP_SEEKING: &str = r#"{
  "reply": "I'm here to help! Asking for support is a sign of strength, not weakness. Here's some guidance based on what you've shared — take what resonates and leave what doesn't.",
  "summary": "User is seeking guidance and support.",
  "suggestions": [
    "Reflect on what feels most pressing right now",
    "Consider your values and what matters most in this decision",
    "Reach out to trusted friends, family, or a professional for personal guidance",
    "Trust your intuition — often you know the answer deep down"
  ]
}"#;

const MOOD_PATTERN: &str = r#"{
  "reply": "Tracking your moods is a valuable practice for understanding yourself. Observing patterns over time lets you identify triggers, recognize progress, and make informed decisions about your wellbeing. Let's explore what your mood data might be telling you.",
  "summary": "User is interested in mood patterns and emotional trends.",
  "suggestions": [
    "Review your mood entries from the past week for patterns",
    "Notice whether certain activities, people, or times of day affect your mood",
    "Keep logging daily — the more data, the clearer the patterns",
    "Celebrate improvements and be gentle with yourself on hard days"
  ]
}"#;

const COPING: &str = r#"{
  "reply": "Building a toolkit of healthy coping strategies is essential for wellbeing. Different techniques work for different people and situations, so it's great that you're exploring options. Here are some evidence-based strategies to try.",
  "summary": "User is seeking coping strategies and techniques.",
  "suggestions": [
    "Mindfulness meditation — even 5 minutes daily reduces stress",
    "Progressive muscle relaxation: tense and release each muscle group",
    "Regular physical activity you actually enjoy",
    "Creative expression: art, music, or writing"
  ]
}"#;

const GRATITUDE: &str = r#"{
  "reply": "Practicing gratitude is one of the most powerful tools for wellbeing. Regularly acknowledging what we're grateful for can lift mood and improve relationships. It's great that you're cultivating this practice.",
  "summary": "User is practicing gratitude and focusing on the positive.",
  "suggestions": [
    "Start a gratitude journal: 3 things each day",
    "Express appreciation to someone who's made a difference for you",
    "Notice small everyday moments: warm coffee, a kind smile, sunshine",
    "During difficult times, gratitude can be an anchor"
  ]
}"#;

const DEFAULT: &str = r#"{
  "reply": "Thank you for sharing. I'm here to support you on your wellness journey — whether you're having a tough day or celebrating a win, I'm here to listen without judgment. What would be most helpful to talk about right now?",
  "summary": "User started a conversation. Ready to provide tailored support.",
  "suggestions": [
    "Share what's on your mind — I'm here to listen",
    "Tell me about your current emotional state",
    "Ask about coping strategies or wellness topics",
    "Review your mood patterns or journal entries together"
  ]
}"#;

/// Ordered (predicate, canned-response) rule list. First match wins.
const RULES: &[(fn(&str) -> bool, &str)] = &[
    (is_greeting, GREETING),
    (is_anxiety, ANXIETY),
    (is_stress, STRESS),
    (is_sadness, SADNESS),
    (is_anger, ANGER),
    (is_loneliness, LONELINESS),
    (is_fatigue, FATIGUE),
    (is_positive, POSITIVE),
    (is_confusion, CONFUSION),
    (is_help_seeking, HELP_SEEKING),
    (is_mood_pattern, MOOD_PATTERN),
    (is_coping, COPING),
    (is_gratitude, GRATITUDE),
];

/// Select the canned reply for a user message. Matching is case-insensitive
/// and deterministic: the same message always selects the same category.
pub fn canned_reply(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    for (matches, response) in RULES {
        if matches(&lowered) {
            return response;
        }
    }
    DEFAULT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anxious_message_selects_anxiety_category() {
        let reply = canned_reply("I've been feeling really anxious lately");
        assert!(reply.contains("anxious"));
        assert!(reply.contains("5-4-3-2-1"));
        // Deterministic: same input, same category
        assert_eq!(reply, canned_reply("I've been feeling really anxious lately"));
    }

    #[test]
    fn test_greeting_requires_prefix() {
        assert_eq!(canned_reply("Hello there"), GREETING);
        // "hello" mid-sentence is not a greeting opener
        assert_ne!(canned_reply("I want to say hello to my anxiety"), GREETING);
    }

    #[test]
    fn test_first_match_wins_over_broader_categories() {
        // "mood" also matches the mood-pattern rule, but sadness is listed first
        assert_eq!(canned_reply("my mood is so down today"), SADNESS);
    }

    #[test]
    fn test_unmatched_message_falls_back_to_default() {
        assert_eq!(canned_reply("the weather is rainy"), DEFAULT);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(canned_reply("I AM SO STRESSED"), STRESS);
    }

    #[test]
    fn test_all_canned_replies_are_valid_structured_json() {
        let mut replies: Vec<&str> = RULES.iter().map(|(_, r)| *r).collect();
        replies.push(DEFAULT);

        for reply in replies {
            let parsed: serde_json::Value =
                serde_json::from_str(reply).expect("canned reply must be valid JSON");
            assert!(parsed["reply"].is_string());
            assert!(parsed["summary"].is_string());
            assert!(parsed["suggestions"].is_array());
        }
    }
}
