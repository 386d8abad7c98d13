//! Text preprocessing for speech synthesis.
//!
//! Expands notation a TTS voice would read badly (currency, percentages)
//! and strips markdown markers. Bracketed emotion cues like `[laughing]`
//! are a protocol between the script and the voice engine and are left
//! untouched.

use std::sync::OnceLock;

use regex::Regex;

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(\d+(?:,\d{3})*)(?:\.(\d{1,2}))?").expect("currency regex")
    })
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("percent regex"))
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,6}\s*").expect("heading regex"))
}

fn emotion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("emotion regex"))
}

/// Prepare text for a TTS voice. Idempotent: running it on its own output
/// returns the input unchanged.
pub fn preprocess_text_for_tts(text: &str) -> String {
    let mut out = currency_re()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let dollars = caps[1].replace(',', "");
            match caps.get(2) {
                Some(cents) => format!("{dollars} dollars {} cents", cents.as_str()),
                None => format!("{dollars} dollars"),
            }
        })
        .into_owned();

    out = percent_re().replace_all(&out, "$1 percent").into_owned();
    out = heading_re().replace_all(&out, "").into_owned();

    // Emphasis and inline-code markers. Underscore emphasis is only
    // stripped in its double form so snake_case words survive.
    out = out.replace("**", "").replace("__", "");
    out = out.replace('*', "").replace('`', "");

    out.trim().to_string()
}

/// First bracketed cue in the text, e.g. `[laughing]` → `laughing`.
pub fn extract_emotion_cue(text: &str) -> Option<String> {
    emotion_re()
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_currency() {
        assert_eq!(preprocess_text_for_tts("That costs $5 today"), "That costs 5 dollars today");
        assert_eq!(preprocess_text_for_tts("$5.50 each"), "5 dollars 50 cents each");
        assert_eq!(preprocess_text_for_tts("a $1,200 budget cut"), "a 1200 dollars budget cut");
    }

    #[test]
    fn expands_percentages() {
        assert_eq!(preprocess_text_for_tts("up 25% this year"), "up 25 percent this year");
    }

    #[test]
    fn strips_markdown_markers() {
        assert_eq!(preprocess_text_for_tts("## A **bold** claim"), "A bold claim");
        assert_eq!(preprocess_text_for_tts("some `code` here"), "some code here");
    }

    #[test]
    fn keeps_bracketed_cues() {
        assert_eq!(
            preprocess_text_for_tts("[laughing] That is rich"),
            "[laughing] That is rich"
        );
    }

    #[test]
    fn idempotent_on_own_output() {
        let once = preprocess_text_for_tts("**Wow**, $5 is 25% off [sighs]");
        let twice = preprocess_text_for_tts(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn extracts_first_cue() {
        assert_eq!(extract_emotion_cue("[excited] yes [pause] really"), Some("excited".into()));
        assert_eq!(extract_emotion_cue("no cues"), None);
    }
}
