//! Suggested actions and caution flags for extracted symptoms

use serde::{Deserialize, Serialize};

use crate::Signal;

/// Caution raised when extraction found nothing
pub const NO_SYMPTOMS_CAUTION: &str =
    "No clear symptoms extracted. Provide more detail or consult a medical professional.";

/// Caution raised when a potential emergency symptom is present
pub const EMERGENCY_CAUTION: &str =
    "Potential emergency; Dial 112/108 or visit a nearby hospital immediately if severe.";

/// Symptom names that trigger the emergency caution
const EMERGENCY_SYMPTOMS: &[&str] = &["chest pain", "shortness of breath"];

fn actions_for(name: &str) -> &'static [&'static str] {
    match name {
        "fever" => &[
            "Monitor temperature",
            "Hydrate well",
            "Paracetamol as per dosage if needed",
        ],
        "cough" => &[
            "Avoid irritants",
            "Warm fluids",
            "Consult local physician if persistent",
        ],
        "headache" => &["Rest", "Hydration", "Paracetamol if appropriate"],
        "chest pain" => &["Seek urgent care at nearest hospital (112/108) if severe"],
        _ => &[],
    }
}

/// Actions and cautions derived from a ranked signal list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub suggested_actions: Vec<String>,
    pub caution_flags: Vec<String>,
}

/// Derive advice from extracted signals
///
/// Actions keep the order of the signals that produced them, with repeats
/// removed. Each caution appears at most once.
pub fn advise(signals: &[Signal]) -> Advice {
    let mut advice = Advice::default();

    if signals.is_empty() {
        advice.caution_flags.push(NO_SYMPTOMS_CAUTION.to_string());
        return advice;
    }

    for signal in signals {
        for action in actions_for(&signal.name) {
            if !advice.suggested_actions.iter().any(|a| a == action) {
                advice.suggested_actions.push(action.to_string());
            }
        }
    }

    if signals
        .iter()
        .any(|s| EMERGENCY_SYMPTOMS.contains(&s.name.as_str()))
    {
        advice.caution_flags.push(EMERGENCY_CAUTION.to_string());
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_signals_raises_caution() {
        let advice = advise(&[]);
        assert!(advice.suggested_actions.is_empty());
        assert_eq!(advice.caution_flags, vec![NO_SYMPTOMS_CAUTION.to_string()]);
    }

    #[test]
    fn test_actions_follow_signal_order() {
        let advice = advise(&[Signal::new("fever", 0.6), Signal::new("headache", 0.55)]);
        assert_eq!(advice.suggested_actions[0], "Monitor temperature");
        assert_eq!(advice.suggested_actions[3], "Rest");
        assert!(advice.caution_flags.is_empty());
    }

    #[test]
    fn test_emergency_caution_once() {
        let advice = advise(&[
            Signal::new("chest pain", 0.7),
            Signal::new("shortness of breath", 0.7),
        ]);
        assert_eq!(advice.caution_flags, vec![EMERGENCY_CAUTION.to_string()]);
        assert_eq!(advice.suggested_actions.len(), 1);
    }

    #[test]
    fn test_unknown_symptom_has_no_actions() {
        let advice = advise(&[Signal::new("rash", 0.9)]);
        assert!(advice.suggested_actions.is_empty());
        assert!(advice.caution_flags.is_empty());
    }
}
