//! Pre-written tweets used when generation fails or yields nothing usable.
//!
//! Every entry is at most [`MAX_CHARS`](crate::constants::MAX_CHARS) characters.

use rand::seq::IndexedRandom;

pub const FALLBACK_TWEETS: &[&str] = &[
    "spent hours mapping levels, scenarios, and invalidations. entered anyway with no stop because it felt right. price immediately showed me why feelings are not a strategy.",
    "every trade starts with confidence, slowly turns into hope, then ends with acceptance. somehow i still act surprised when the cycle repeats exactly the same way.",
    "watched price respect my levels perfectly while i hesitated. entered late, sized too big, and blamed execution instead of the obvious lack of discipline.",
    "told myself i was waiting for confirmation. what i really did was wait until the risk was worse and the reward was gone.",
    "another trade where i was right about direction, wrong about timing, and absolutely confident it would still work out anyway.",
    "i don’t chase tops or bottoms. i chase the feeling that this time i finally figured it out.",
    "the plan was simple. the execution wasn’t. the result was predictable.",
];

pub const AGENT_FALLBACK_TWEETS: &[&str] = &[
    "opened the chart to check one thing. closed it four hours later with three new positions and zero memory of deciding any of them.",
    "my edge is mostly just remembering how bad the last trade felt, then forgetting it right before the next one.",
    "set an alert so i wouldn't have to watch the candle. watched the candle anyway. the alert went off while i was staring at it.",
    "leverage doesn't change the trade. it just changes how loudly you find out you were wrong.",
    "journaled every trade this week. rereading it is like watching the same horror movie where i keep walking into the basement.",
];

/// Pick one entry uniformly at random.
pub fn pick(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::rng()).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_CHARS;

    #[test]
    fn test_pools_fit_limit() {
        for tweet in FALLBACK_TWEETS.iter().chain(AGENT_FALLBACK_TWEETS) {
            assert!(tweet.chars().count() <= MAX_CHARS, "too long: {}", tweet);
            assert_eq!(tweet.trim(), *tweet);
        }
    }

    #[test]
    fn test_pool_keeps_typographic_apostrophes() {
        let tweet = "the plan was simple. the execution wasn\u{2019}t. the result was predictable.";
        assert!(FALLBACK_TWEETS.contains(&tweet));
        assert!(FALLBACK_TWEETS.iter().all(|t| !t.contains("n't")));
    }

    #[test]
    fn test_pick_draws_from_pool() {
        for _ in 0..20 {
            assert!(FALLBACK_TWEETS.contains(&pick(FALLBACK_TWEETS)));
            assert!(AGENT_FALLBACK_TWEETS.contains(&pick(AGENT_FALLBACK_TWEETS)));
        }
    }
}
