//! Text normalization shared by validation, vectorization and training.

/// Canonicalizes free text.
///
/// Lowercases, replaces anything that is not alphanumeric, whitespace or a comma with a space,
/// collapses whitespace runs and trims both ends. Total over all input and idempotent.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == ',' {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(
            normalize("  Fever!!  Dry-Cough;\tHEADACHE, fatigue. "),
            "fever dry cough headache, fatigue"
        );
    }

    #[test]
    fn normalize_handles_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "Fever, COUGH & body-ache!!",
            "  can't   breathe ",
            "ÉTÉ fièvre, Kopfschmerzen",
            "İstanbul",
            "a,,b ,, c",
            "tab\tand\nnewline",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn normalize_keeps_commas() {
        assert_eq!(normalize("fever,cough"), "fever,cough");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_for_any_input(text in any::<String>()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalized_text_has_no_padding(text in "\\PC{0,40}") {
            let normalized = normalize(&text);
            prop_assert_eq!(normalized.trim(), normalized.as_str());
            prop_assert!(!normalized.contains("  "));
        }
    }
}
