//! Prompt template for the narrative request
//!
//! Deterministic: the same score and attributions always produce the same
//! prompt. The score is embedded at 2 decimal places, contributions at 3.

use crate::logic::explain::Attribution;

pub fn build_prompt(risk_score: f64, attributions: &[Attribution]) -> String {
    let feature_summary = attributions
        .iter()
        .map(|a| format!("- {}: contribution {:.3}", a.feature, a.value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an AI assistant helping a data science team explain churn risk.\n\
         The predicted churn probability for this customer is {risk_score:.2}.\n\
         \n\
         The top contributing features and their contribution values are:\n\
         {feature_summary}\n\
         \n\
         Generate a short, plain-English explanation.\n\
         Avoid jargon. Be clear, helpful, and precise.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributions() -> Vec<Attribution> {
        vec![
            Attribution { feature: "tenure".to_string(), value: -1.23456 },
            Attribution { feature: "monthly_charges".to_string(), value: 0.5 },
        ]
    }

    #[test]
    fn test_prompt_formats_score_and_values() {
        let prompt = build_prompt(0.8765, &attributions());

        assert!(prompt.contains("churn probability for this customer is 0.88."));
        assert!(prompt.contains("- tenure: contribution -1.235"));
        assert!(prompt.contains("- monthly_charges: contribution 0.500"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(0.42, &attributions());
        let b = build_prompt(0.42, &attributions());
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_with_no_attributions() {
        let prompt = build_prompt(0.1, &[]);
        assert!(prompt.contains("0.10"));
        assert!(prompt.ends_with("Be clear, helpful, and precise."));
    }
}
