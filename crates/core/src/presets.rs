//! Quick-fill symptom presets and input examples shown to users.

use serde::Serialize;

/// A named symptom description that a UI can offer as a one-click fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub symptoms: &'static str,
}

pub const QUICK_FILL_PRESETS: &[Preset] = &[
    Preset {
        name: "Flu",
        symptoms: "fever, dry cough, body ache, fatigue, headache",
    },
    Preset {
        name: "Cold",
        symptoms: "runny nose, sneezing, sore throat, nasal congestion",
    },
    Preset {
        name: "Migraine",
        symptoms: "severe headache, nausea, sensitivity to light, throbbing pain",
    },
    Preset {
        name: "Emergency",
        symptoms: "severe chest pain, difficulty breathing, arm pain, sweating",
    },
];

/// Inputs the validator accepts.
pub const GOOD_EXAMPLES: &[&str] = &[
    "fever, cough, headache",
    "severe headache, nausea",
    "runny nose, sneezing, sore throat",
];

/// Inputs the validator rejects, as (input, why).
pub const BAD_EXAMPLES: &[(&str, &str)] = &[
    ("vomit", "too short"),
    ("headache", "only 1"),
    ("random text", "no symptoms"),
];

pub const INPUT_TIP: &str = "Use specific medical terms and provide 2-3 symptoms minimum";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emergency::is_emergency;
    use crate::validation::validate_symptoms;

    #[test]
    fn good_examples_are_accepted() {
        for example in GOOD_EXAMPLES {
            assert!(validate_symptoms(example).accepted, "{example}");
        }
    }

    #[test]
    fn bad_examples_are_rejected() {
        for (example, _) in BAD_EXAMPLES {
            assert!(!validate_symptoms(example).accepted, "{example}");
        }
    }

    #[test]
    fn only_the_emergency_preset_triggers_triage() {
        for preset in QUICK_FILL_PRESETS {
            assert!(validate_symptoms(preset.symptoms).accepted, "{}", preset.name);
            assert_eq!(is_emergency(preset.symptoms), preset.name == "Emergency");
        }
    }
}
