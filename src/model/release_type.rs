//! Release-type classification.
//!
//! Servers describe releases with free-text labels ("Album", "EP",
//! "Spoken Word", ...). These are folded into a [`ReleaseTypes`] bitmask so
//! the rest of the application can filter and group on a closed set.
//!
//! Every album classifies as something: when no label is recognised and the
//! release is not a compilation, the result is [`ReleaseTypes::ALBUM`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Normalized release categories.
    ///
    /// Multiple flags can be set, e.g. a live compilation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ReleaseTypes: u32 {
        const ALBUM = 1 << 0;
        const AUDIOBOOK = 1 << 1;
        const AUDIO_DRAMA = 1 << 2;
        const BROADCAST = 1 << 3;
        const COMPILATION = 1 << 4;
        const DEMO = 1 << 5;
        const DJ_MIX = 1 << 6;
        const EP = 1 << 7;
        const FIELD_RECORDING = 1 << 8;
        const INTERVIEW = 1 << 9;
        const LIVE = 1 << 10;
        const MIXTAPE = 1 << 11;
        const REMIX = 1 << 12;
        const SINGLE = 1 << 13;
        const SOUNDTRACK = 1 << 14;
        const SPOKEN_WORD = 1 << 15;
    }
}

impl Default for ReleaseTypes {
    fn default() -> Self {
        Self::ALBUM
    }
}

impl ReleaseTypes {
    /// Classify a list of server release-type labels.
    ///
    /// Labels are matched case-insensitively with all spaces removed, so
    /// "Spoken Word", "spokenword" and " SPOKEN WORD " are the same label.
    /// Unknown labels are ignored.
    pub fn classify<S: AsRef<str>>(labels: &[S], is_compilation: bool) -> Self {
        let mut types = labels
            .iter()
            .filter_map(|label| Self::from_label(label.as_ref()))
            .fold(Self::empty(), |acc, t| acc | t);

        if is_compilation {
            types |= Self::COMPILATION;
        }

        if types.is_empty() {
            return Self::ALBUM;
        }
        types
    }

    /// Map a single label to its flag, if recognised.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();

        Some(match normalized.as_str() {
            "album" => Self::ALBUM,
            "audiobook" => Self::AUDIOBOOK,
            "audiodrama" => Self::AUDIO_DRAMA,
            "broadcast" => Self::BROADCAST,
            "compilation" => Self::COMPILATION,
            "demo" => Self::DEMO,
            "djmix" => Self::DJ_MIX,
            "ep" => Self::EP,
            "fieldrecording" => Self::FIELD_RECORDING,
            "interview" => Self::INTERVIEW,
            "live" => Self::LIVE,
            "mixtape" => Self::MIXTAPE,
            "remix" => Self::REMIX,
            "single" => Self::SINGLE,
            "soundtrack" => Self::SOUNDTRACK,
            "spokenword" => Self::SPOKEN_WORD,
            _ => return None,
        })
    }

    /// Human-readable names of all set flags.
    pub fn names(&self) -> Vec<&'static str> {
        const NAMES: [(ReleaseTypes, &str); 16] = [
            (ReleaseTypes::ALBUM, "Album"),
            (ReleaseTypes::AUDIOBOOK, "Audiobook"),
            (ReleaseTypes::AUDIO_DRAMA, "Audio Drama"),
            (ReleaseTypes::BROADCAST, "Broadcast"),
            (ReleaseTypes::COMPILATION, "Compilation"),
            (ReleaseTypes::DEMO, "Demo"),
            (ReleaseTypes::DJ_MIX, "DJ-Mix"),
            (ReleaseTypes::EP, "EP"),
            (ReleaseTypes::FIELD_RECORDING, "Field Recording"),
            (ReleaseTypes::INTERVIEW, "Interview"),
            (ReleaseTypes::LIVE, "Live"),
            (ReleaseTypes::MIXTAPE, "Mixtape"),
            (ReleaseTypes::REMIX, "Remix"),
            (ReleaseTypes::SINGLE, "Single"),
            (ReleaseTypes::SOUNDTRACK, "Soundtrack"),
            (ReleaseTypes::SPOKEN_WORD, "Spoken Word"),
        ];

        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_labels_defaults_to_album() {
        let empty: [&str; 0] = [];
        assert_eq!(ReleaseTypes::classify(&empty, false), ReleaseTypes::ALBUM);
    }

    #[test]
    fn test_unknown_labels_default_to_album() {
        assert_eq!(
            ReleaseTypes::classify(&["bootleg", "whatever"], false),
            ReleaseTypes::ALBUM
        );
    }

    #[test]
    fn test_compilation_flag_only() {
        let empty: [&str; 0] = [];
        assert_eq!(
            ReleaseTypes::classify(&empty, true),
            ReleaseTypes::COMPILATION
        );
    }

    #[test]
    fn test_multi_word_labels() {
        let types = ReleaseTypes::classify(&["Spoken Word", "DJ Mix", "Field Recording"], false);
        assert!(types.contains(ReleaseTypes::SPOKEN_WORD));
        assert!(types.contains(ReleaseTypes::DJ_MIX));
        assert!(types.contains(ReleaseTypes::FIELD_RECORDING));
        assert!(!types.contains(ReleaseTypes::ALBUM));
    }

    #[test]
    fn test_case_and_spacing_insensitive() {
        for label in ["Live", "  live", "LIVE", "l i v e"] {
            assert_eq!(ReleaseTypes::classify(&[label], false), ReleaseTypes::LIVE);
        }
    }

    #[test]
    fn test_live_compilation_sets_both_bits() {
        let types = ReleaseTypes::classify(&["Live", "Compilation"], true);
        assert_eq!(types, ReleaseTypes::LIVE | ReleaseTypes::COMPILATION);
    }

    #[test]
    fn test_names() {
        let types = ReleaseTypes::EP | ReleaseTypes::SPOKEN_WORD;
        assert_eq!(types.names(), vec!["EP", "Spoken Word"]);
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const KNOWN: [&str; 16] = [
        "album",
        "audiobook",
        "audiodrama",
        "broadcast",
        "compilation",
        "demo",
        "djmix",
        "ep",
        "fieldrecording",
        "interview",
        "live",
        "mixtape",
        "remix",
        "single",
        "soundtrack",
        "spokenword",
    ];

    /// A known label with random casing and spaces sprinkled in
    fn mangled_known_label() -> impl Strategy<Value = (String, String)> {
        (
            prop::sample::select(KNOWN.to_vec()),
            prop::collection::vec((any::<bool>(), 0usize..3), 16),
        )
            .prop_map(|(label, noise)| {
                let mut out = String::new();
                for (c, (upper, spaces)) in label.chars().zip(noise) {
                    out.push_str(&" ".repeat(spaces));
                    if upper {
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                }
                (label.to_string(), out)
            })
    }

    proptest! {
        /// Classification never produces an empty mask
        #[test]
        fn classify_never_zero(
            labels in prop::collection::vec("[a-zA-Z ]{0,16}", 0..6),
            is_compilation in any::<bool>(),
        ) {
            prop_assert!(!ReleaseTypes::classify(&labels, is_compilation).is_empty());
        }

        /// Case and spacing never change which flag a label maps to
        #[test]
        fn classify_ignores_case_and_spaces((canonical, mangled) in mangled_known_label()) {
            prop_assert_eq!(
                ReleaseTypes::classify(&[canonical], false),
                ReleaseTypes::classify(&[mangled], false)
            );
        }

        /// The compilation flag always sets the compilation bit
        #[test]
        fn compilation_flag_always_folds_in(
            labels in prop::collection::vec(prop::sample::select(KNOWN.to_vec()), 0..4),
        ) {
            prop_assert!(ReleaseTypes::classify(&labels, true).contains(ReleaseTypes::COMPILATION));
        }
    }
}
