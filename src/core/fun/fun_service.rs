// Light-hearted commands: memes, quotes, jokes and a few random games.

use crate::core::cache::TtlCache;
use crate::core::content::{ContentError, ContentSource};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;

pub const MEME_URL: &str = "https://meme-api.com/gimme";
pub const QUOTE_URL: &str = "https://zenquotes.io/api/random";
pub const JOKE_URL: &str = "https://v2.jokeapi.dev/joke/Any?lang=en";

const RESPONSE_TTL: Duration = Duration::from_secs(120);
const FALLBACK_QUOTE: &str = "Teruslah melangkah meski perlahan.";
const FALLBACK_JOKE: &str = "Saya tidak punya lelucon kali ini.";

pub const EIGHT_BALL_ANSWERS: [&str; 5] = [
    "Pasti!",
    "Sepertinya iya.",
    "Coba lagi nanti.",
    "Saya ragu.",
    "Tidak mungkin.",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Meme {
    pub title: String,
    pub image_url: Option<String>,
    pub subreddit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

pub struct FunService<C: ContentSource> {
    source: C,
    cache: TtlCache<String, Value>,
}

impl<C: ContentSource> FunService<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            cache: TtlCache::new(RESPONSE_TTL),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Value, ContentError> {
        self.cache
            .get_or_set(url.to_string(), || self.source.fetch_json(url))
            .await
    }

    pub async fn meme(&self) -> Result<Meme, ContentError> {
        let data = self.fetch(MEME_URL).await?;
        Ok(Meme {
            title: data["title"].as_str().unwrap_or("Meme").to_string(),
            image_url: data["url"].as_str().map(str::to_string),
            subreddit: data["subreddit"].as_str().unwrap_or("unknown").to_string(),
        })
    }

    /// A random quote; never fails, falling back to a built-in line.
    pub async fn quote(&self) -> Quote {
        let data = match self.fetch(QUOTE_URL).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Quote API unavailable: {}", e);
                Value::Null
            }
        };
        match data.get(0) {
            Some(entry) => Quote {
                text: entry["q"].as_str().unwrap_or("Tetap semangat!").to_string(),
                author: entry["a"].as_str().unwrap_or("Anonim").to_string(),
            },
            None => Quote {
                text: FALLBACK_QUOTE.to_string(),
                author: "Anonim".to_string(),
            },
        }
    }

    /// Single-line jokes as-is; two-part jokes as setup, blank line, delivery.
    pub async fn joke(&self) -> Result<String, ContentError> {
        let data = self.fetch(JOKE_URL).await?;
        if data["type"].as_str() == Some("single") {
            return Ok(data["joke"].as_str().unwrap_or(FALLBACK_JOKE).to_string());
        }
        let setup = data["setup"].as_str().unwrap_or_default();
        let delivery = data["delivery"].as_str().unwrap_or_default();
        let text = format!("{}\n\n{}", setup, delivery).trim().to_string();
        if text.is_empty() {
            Ok(FALLBACK_JOKE.to_string())
        } else {
            Ok(text)
        }
    }
}

pub fn roll_dice(sides: u32) -> u32 {
    rand::thread_rng().gen_range(1..=sides.clamp(2, 100))
}

pub fn eight_ball() -> &'static str {
    EIGHT_BALL_ANSWERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EIGHT_BALL_ANSWERS[2])
}

pub fn ship_score() -> u8 {
    rand::thread_rng().gen_range(0..=100)
}

/// One heart per 20 points, plus one.
pub fn ship_hearts(score: u8) -> String {
    "❤️".repeat(score as usize / 20 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::tests::FakeSource;
    use serde_json::json;

    #[tokio::test]
    async fn meme_fields_and_defaults() {
        let source = FakeSource::default().with(
            MEME_URL,
            json!({"title": "Senin lagi", "url": "https://i.redd.it/x.png", "subreddit": "indonesia"}),
        );
        let service = FunService::new(source);
        let meme = service.meme().await.unwrap();
        assert_eq!(meme.title, "Senin lagi");
        assert_eq!(meme.image_url.as_deref(), Some("https://i.redd.it/x.png"));
        assert_eq!(meme.subreddit, "indonesia");
    }

    #[tokio::test]
    async fn responses_are_cached_per_url() {
        let source = FakeSource::default().with(MEME_URL, json!({}));
        let service = FunService::new(source);
        let first = service.meme().await.unwrap();
        service.meme().await.unwrap();
        assert_eq!(first.title, "Meme");
        assert_eq!(first.subreddit, "unknown");
        assert_eq!(service.source.call_count(), 1);
    }

    #[tokio::test]
    async fn quote_falls_back() {
        let service = FunService::new(FakeSource::default());
        let quote = service.quote().await;
        assert_eq!(quote.text, FALLBACK_QUOTE);
        assert_eq!(quote.author, "Anonim");

        let source = FakeSource::default().with(QUOTE_URL, json!([{"q": "Hidup itu indah", "a": "Sari"}]));
        let quote = FunService::new(source).quote().await;
        assert_eq!(quote.text, "Hidup itu indah");
        assert_eq!(quote.author, "Sari");
    }

    #[tokio::test]
    async fn jokes_single_and_two_part() {
        let single = FakeSource::default().with(JOKE_URL, json!({"type": "single", "joke": "Knock knock"}));
        assert_eq!(FunService::new(single).joke().await.unwrap(), "Knock knock");

        let twopart = FakeSource::default().with(
            JOKE_URL,
            json!({"type": "twopart", "setup": "Why?", "delivery": "Because."}),
        );
        assert_eq!(FunService::new(twopart).joke().await.unwrap(), "Why?\n\nBecause.");

        assert!(FunService::new(FakeSource::default()).joke().await.is_err());
    }

    #[test]
    fn games_stay_in_range() {
        for _ in 0..200 {
            let roll = roll_dice(6);
            assert!((1..=6).contains(&roll));
            assert!(ship_score() <= 100);
        }
        assert!(EIGHT_BALL_ANSWERS.contains(&eight_ball()));
        assert_eq!(ship_hearts(0), "❤️");
        assert_eq!(ship_hearts(59), "❤️❤️❤️");
        assert_eq!(ship_hearts(100), "❤️".repeat(6));
    }
}
