//! Keyword-scored topic extraction

use reviewpilot_core::Topic;

/// Returned when no topic keyword occurs in the text
pub const DEFAULT_TOPIC: Topic = Topic::Service;

const FOOD: &[&str] = &[
    "food", "meal", "dish", "taste", "flavor", "delicious", "tasty", "cooking", "chef", "menu",
    "recipe", "eat", "dining", "restaurant", "cuisine", "ingredients", "cooked", "fresh",
    "quality",
];

const SERVICE: &[&str] = &[
    "service", "staff", "waiter", "waitress", "server", "friendly", "helpful", "attentive",
    "professional", "served", "serving", "assistance", "help", "care", "attention",
];

const ATMOSPHERE: &[&str] = &[
    "atmosphere", "ambiance", "decor", "music", "lighting", "cozy", "romantic", "loud", "quiet",
    "environment", "setting", "mood", "vibe", "place", "space",
];

// "expensive" is listed twice and therefore weighs double.
const PRICE: &[&str] = &[
    "price", "cost", "expensive", "cheap", "affordable", "value", "money", "bill", "payment",
    "worth", "budget", "expensive", "overpriced", "reasonable",
];

const LOCATION: &[&str] = &[
    "location", "parking", "convenient", "accessible", "address", "nearby", "distance", "place",
    "area", "neighborhood", "street",
];

const CLEANLINESS: &[&str] = &[
    "clean", "dirty", "hygiene", "sanitary", "tidy", "messy", "spotless", "fresh", "maintenance",
    "condition",
];

fn keywords(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Food => FOOD,
        Topic::Service => SERVICE,
        Topic::Atmosphere => ATMOSPHERE,
        Topic::Price => PRICE,
        Topic::Location => LOCATION,
        Topic::Cleanliness => CLEANLINESS,
    }
}

/// Maps review text to one of the fixed topics.
///
/// Each keyword found anywhere in the lower-cased text adds one point to its
/// topic. The highest score wins; ties go to the topic declared first in
/// [`Topic::ALL`]; a text with no hits at all gets [`DEFAULT_TOPIC`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicExtractor;

impl TopicExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Per-topic keyword hits in scoring order
    pub fn scores(&self, text: &str) -> [(Topic, usize); 6] {
        let text = text.to_lowercase();
        Topic::ALL.map(|topic| {
            let hits = keywords(topic)
                .iter()
                .filter(|keyword| text.contains(**keyword))
                .count();
            (topic, hits)
        })
    }

    /// Extract the dominant topic. Never fails.
    pub fn extract(&self, text: &str) -> Topic {
        let mut best: Option<(Topic, usize)> = None;
        for (topic, hits) in self.scores(text) {
            if best.map_or(true, |(_, top)| hits > top) {
                best = Some((topic, hits));
            }
        }

        match best {
            Some((topic, hits)) if hits > 0 => topic,
            _ => DEFAULT_TOPIC,
        }
    }
}
