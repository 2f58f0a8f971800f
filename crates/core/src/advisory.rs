//! Static advisory content keyed by disease label.
//!
//! Nine conditions carry hand-written guidance. A further set of labels the model knows about
//! share a generic templated record, and anything else falls back to [`DEFAULT_ADVISORY`].

use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use symcheck_types::Severity;

/// Structured guidance for one disease label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvisoryRecord {
    pub description: &'static str,
    pub severity: Severity,
    pub home_remedies: &'static [&'static str],
    pub natural_remedies: &'static [&'static str],
    pub otc_medicines: &'static [&'static str],
    pub prevention: &'static [&'static str],
}

/// Returned for labels that have no entry in the catalog.
pub const DEFAULT_ADVISORY: AdvisoryRecord = AdvisoryRecord {
    description: "Please consult a doctor for proper diagnosis.",
    severity: Severity::Moderate,
    home_remedies: &["Rest", "Stay hydrated"],
    natural_remedies: &["Healthy diet", "Adequate sleep"],
    otc_medicines: &["Consult pharmacist"],
    prevention: &["Healthy lifestyle"],
};

/// Shared record for known labels without hand-written content.
pub const TEMPLATED_ADVISORY: AdvisoryRecord = AdvisoryRecord {
    description: "Medical condition requiring attention. Consult healthcare provider.",
    severity: Severity::Moderate,
    home_remedies: &["Rest", "Stay hydrated", "Maintain hygiene"],
    natural_remedies: &["Balanced diet", "Adequate sleep", "Stress management"],
    otc_medicines: &["Consult pharmacist for appropriate medication"],
    prevention: &["Healthy lifestyle", "Regular checkups", "Good hygiene"],
};

const CURATED: &[(&str, AdvisoryRecord)] = &[
    (
        "Flu (Influenza)",
        AdvisoryRecord {
            description: "Viral respiratory illness with sudden onset of fever, cough, and body aches. More severe than common cold.",
            severity: Severity::Moderate,
            home_remedies: &["Rest 7-10 days", "Drink plenty of fluids", "Warm salt water gargle"],
            natural_remedies: &["Honey tea", "Ginger tea", "Vitamin C 1000mg", "Zinc lozenges"],
            otc_medicines: &[
                "Acetaminophen (for fever)",
                "Ibuprofen",
                "Decongestants",
                "Cough suppressants",
            ],
            prevention: &["Annual flu vaccination", "Wash hands frequently", "Avoid sick people"],
        },
    ),
    (
        "Common Cold",
        AdvisoryRecord {
            description: "Mild viral infection of nose and throat. Usually resolves in 7-10 days.",
            severity: Severity::Normal,
            home_remedies: &[
                "Rest",
                "Drink warm fluids",
                "Use humidifier",
                "Gargle with salt water",
            ],
            natural_remedies: &["Honey", "Ginger tea", "Chicken soup", "Vitamin C"],
            otc_medicines: &["Antihistamines", "Decongestants", "Pain relievers"],
            prevention: &["Wash hands regularly", "Avoid touching face", "Boost immunity"],
        },
    ),
    (
        "COVID-19",
        AdvisoryRecord {
            description: "Contagious respiratory disease caused by SARS-CoV-2 virus.",
            severity: Severity::Critical,
            home_remedies: &["Self-isolate immediately", "Monitor oxygen levels", "Rest"],
            natural_remedies: &["Vitamin D 4000 IU", "Zinc", "Vitamin C", "Steam inhalation"],
            otc_medicines: &["Acetaminophen for fever", "Pulse oximeter"],
            prevention: &["Vaccination (most important)", "Masks", "Social distancing"],
        },
    ),
    (
        "Migraine",
        AdvisoryRecord {
            description: "Severe recurring headache with nausea and light sensitivity. Lasts 4-72 hours.",
            severity: Severity::Moderate,
            home_remedies: &["Rest in dark room", "Cold compress", "Gentle massage"],
            natural_remedies: &["Magnesium 400mg", "Riboflavin B2", "Feverfew", "Peppermint oil"],
            otc_medicines: &["Ibuprofen 400mg", "Naproxen 500mg", "Aspirin with caffeine"],
            prevention: &["Avoid triggers", "Regular sleep", "Stay hydrated", "Manage stress"],
        },
    ),
    (
        "Tension Headache",
        AdvisoryRecord {
            description: "Common headache with tight band feeling. Usually stress-related.",
            severity: Severity::Normal,
            home_remedies: &["Rest", "Warm compress", "Neck stretches", "Deep breathing"],
            natural_remedies: &["Peppermint oil", "Lavender oil", "Magnesium"],
            otc_medicines: &["Acetaminophen 500mg", "Ibuprofen 400mg", "Aspirin"],
            prevention: &["Stress management", "Good posture", "Regular breaks"],
        },
    ),
    (
        "Sinusitis",
        AdvisoryRecord {
            description: "Sinus inflammation causing facial pain and congestion.",
            severity: Severity::Moderate,
            home_remedies: &["Steam inhalation 2-3x daily", "Warm compress", "Stay hydrated"],
            natural_remedies: &["Saline nasal rinse", "Apple cider vinegar steam", "Ginger tea"],
            otc_medicines: &["Decongestants", "Saline spray", "Pain relievers"],
            prevention: &["Avoid allergens", "Use humidifier", "Treat colds promptly"],
        },
    ),
    (
        "Gastroenteritis",
        AdvisoryRecord {
            description: "Stomach and intestine inflammation. Usually resolves in 1-3 days.",
            severity: Severity::Moderate,
            home_remedies: &["ORS (oral rehydration)", "BRAT diet", "Small meals", "Rest"],
            natural_remedies: &["Ginger tea", "Chamomile tea", "Probiotic yogurt", "Peppermint"],
            otc_medicines: &["Oral rehydration salts", "Loperamide (careful use)"],
            prevention: &["Hand washing", "Clean water", "Proper food handling"],
        },
    ),
    (
        "Pneumonia",
        AdvisoryRecord {
            description: "Serious lung infection requiring medical attention.",
            severity: Severity::Critical,
            home_remedies: &["Complete rest", "Stay hydrated", "Use humidifier"],
            natural_remedies: &["Warm salt gargle", "Fenugreek tea", "Ginger turmeric tea"],
            otc_medicines: &["Fever reducers", "ANTIBIOTICS NEEDED - See doctor"],
            prevention: &["Pneumonia vaccine", "Flu vaccine", "Don't smoke"],
        },
    ),
    (
        "Asthma",
        AdvisoryRecord {
            description: "Chronic airway inflammation causing breathing difficulty.",
            severity: Severity::Moderate,
            home_remedies: &["Avoid triggers", "Use inhaler", "Sit upright", "Breathing exercises"],
            natural_remedies: &["Ginger tea", "Omega-3", "Breathing exercises"],
            otc_medicines: &["Bronchodilator inhaler (prescription)", "Antihistamines"],
            prevention: &["Avoid triggers", "Take medications", "Air purifiers"],
        },
    ),
];

/// Labels served with [`TEMPLATED_ADVISORY`].
pub const TEMPLATED_LABELS: &[&str] = &[
    "Bronchitis",
    "Allergic Rhinitis",
    "Urinary Tract Infection",
    "Diabetes (Type 2)",
    "Hypertension",
    "Anxiety Disorder",
    "Depression",
    "Arthritis",
    "Back Pain (Muscular)",
    "Acid Reflux (GERD)",
    "Constipation",
    "Diarrhea (Acute)",
    "Anemia",
    "Insomnia",
    "Conjunctivitis (Pink Eye)",
    "Ear Infection",
    "Strep Throat",
    "Chickenpox",
    "Measles",
    "Eczema",
    "Psoriasis",
    "Food Poisoning",
];

static CATALOG: LazyLock<HashMap<&'static str, AdvisoryRecord>> = LazyLock::new(|| {
    let mut catalog: HashMap<&'static str, AdvisoryRecord> = CURATED.iter().copied().collect();
    for label in TEMPLATED_LABELS {
        catalog.entry(*label).or_insert(TEMPLATED_ADVISORY);
    }
    catalog
});

/// Returns the advisory record for `label`, or [`DEFAULT_ADVISORY`] when the label is unknown.
pub fn lookup(label: &str) -> &'static AdvisoryRecord {
    CATALOG.get(label).unwrap_or(&DEFAULT_ADVISORY)
}

/// Returns true if `label` has a hand-written entry.
pub fn is_curated(label: &str) -> bool {
    CURATED.iter().any(|(name, _)| *name == label)
}

/// Guidance on when to see a doctor, by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DoctorAdvice {
    pub headline: &'static str,
    pub see_doctor_if: &'static [&'static str],
    pub action: &'static str,
}

pub fn doctor_advice(severity: Severity) -> DoctorAdvice {
    match severity {
        Severity::Critical => DoctorAdvice {
            headline: "CRITICAL - Immediate medical attention required",
            see_doctor_if: &[
                "This is a serious condition",
                "Requires professional medical care",
                "May need prescription medication",
                "Should not be self-treated",
            ],
            action: "Schedule appointment TODAY or visit emergency room",
        },
        Severity::Moderate => DoctorAdvice {
            headline: "MODERATE - Medical consultation recommended",
            see_doctor_if: &[
                "Symptoms persist beyond 2-3 days",
                "Symptoms worsen instead of improving",
                "New symptoms develop",
                "You feel very unwell",
            ],
            action: "Schedule doctor appointment within 2-3 days",
        },
        Severity::Normal => DoctorAdvice {
            headline: "NORMAL - Home care usually sufficient",
            see_doctor_if: &[
                "Symptoms last longer than 5-7 days",
                "Symptoms significantly worsen",
                "You develop fever or severe pain",
                "You have any concerns",
            ],
            action: "Monitor symptoms, seek help if needed",
        },
    }
}

/// General reminders shown with every diagnosis, as (heading, points).
pub const GENERAL_REMINDERS: &[(&str, &[&str])] = &[
    (
        "Stay Hydrated",
        &["Drink 8-10 glasses water", "Clear fluids", "Avoid alcohol/caffeine"],
    ),
    (
        "Rest Well",
        &["Get adequate sleep", "Avoid strenuous activity", "Listen to your body"],
    ),
    (
        "Monitor Symptoms",
        &["Track changes", "Note improvements", "Record new symptoms"],
    ),
];

pub const MEDICAL_DISCLAIMER: &str = "This is an AI-powered preliminary health guidance tool. \
It is NOT a medical diagnosis and should not replace professional medical advice, diagnosis, or \
treatment. Always consult a qualified healthcare provider for accurate medical assessment. If you \
have serious health concerns or symptoms worsen, please see a doctor immediately. This tool is for \
educational and informational purposes only.";
