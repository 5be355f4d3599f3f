//! The heuristic labeler — keyword substring checks gating Bernoulli draws.
//!
//! There is no model here. Each keyword group, when matched, perturbs the
//! probability that the text is called fake; the outcome itself is always a
//! random draw. Deterministic in structure, not in output.

use rand::Rng;

use rumormill_core::labeler::Labeler;
use rumormill_core::record::Label;

/// Urgency / alert / exclusivity framing.
const URGENCY: &[&str] = &["urgent", "alert", "exclusive"];

/// Conspiracy vocabulary.
const CONSPIRACY: &[&str] = &["conspiracy", "secret society"];

/// Research-citation framing.
const CITATION: &[&str] = &["study shows", "research indicates"];

/// Verification claims.
const VERIFICATION: &[&str] = &["fact-checked", "verified source"];

/// Sensationalist clickbait.
const CLICKBAIT: &[&str] = &["you won't believe", "shocking truth"];

/// Keyword groups with the probability drawn when the group matches,
/// checked in this order.
const GROUPS: &[(&[&str], f64)] = &[
    (URGENCY, 0.6),
    (CONSPIRACY, 0.8),
    (CITATION, 0.3),
    (VERIFICATION, 0.1),
    (CLICKBAIT, 0.9),
];

/// Probability that keyword-free text is still called fake.
const BASELINE_FAKE_PROBABILITY: f64 = 0.4;

/// The randomized keyword-gated labeler.
///
/// Stateless; the production path draws from [`rand::rng`]. Use
/// [`label_with`](Self::label_with) to supply a seeded or scripted RNG.
#[derive(Debug, Default)]
pub struct HeuristicLabeler;

impl HeuristicLabeler {
    pub fn new() -> Self {
        Self
    }

    /// Label `text` drawing randomness from `rng`.
    pub fn label_with<R: Rng + ?Sized>(rng: &mut R, text: &str) -> Label {
        if Self::keyword_signal(rng, text) || rng.random_bool(BASELINE_FAKE_PROBABILITY) {
            Label::FakeNews
        } else {
            Label::NotFakeNews
        }
    }

    /// Run the keyword-group checks.
    ///
    /// Each matching group *assigns* its draw to the flag rather than
    /// OR-ing it in, so when several groups match, the last matching
    /// group's draw wins.
    fn keyword_signal<R: Rng + ?Sized>(rng: &mut R, text: &str) -> bool {
        let lowered = text.to_lowercase();
        let mut is_fake = false;

        for (keywords, probability) in GROUPS {
            if keywords.iter().any(|k| lowered.contains(k)) {
                is_fake = rng.random_bool(*probability);
            }
        }

        is_fake
    }
}

impl Labeler for HeuristicLabeler {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn label(&self, text: &str) -> Label {
        Self::label_with(&mut rand::rng(), text)
    }
}
