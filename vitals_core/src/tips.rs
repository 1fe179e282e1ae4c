//! Daily health tips.

use rand::seq::SliceRandom;

/// Fixed tip catalog
pub const TIPS: &[&str] = &[
    "Stay hydrated! Drink at least 8 glasses of water daily.",
    "Aim for 30 minutes of moderate exercise 5 days a week.",
    "Incorporate more fruits and vegetables into your diet.",
    "Practice mindfulness or meditation to reduce stress.",
    "Get 7-9 hours of sleep each night for optimal health.",
    "Limit processed foods and added sugars in your diet.",
    "Take short breaks to stretch if you sit for long periods.",
    "Regular health check-ups can catch issues early. Don't skip them!",
];

/// Pick one tip at random
pub fn random_tip() -> &'static str {
    TIPS.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TIPS[0])
}
