//! Salary negotiation coaching.

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{clean_list, MAX_LIST_ITEMS};
use crate::cache::LlmCache;
use crate::coaching::prompts::{NEGOTIATION_PROMPT, NEGOTIATION_ROLE};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, system_prompt};
use crate::llm_client::LlmClient;

pub const FALLBACK_TALKING_POINTS: &[&str] = &[
    "Thank them for the offer and restate your excitement about the role.",
    "Point to the specific impact you will have in the first six months.",
    "Reference market data for this role and level in your location.",
    "Ask whether there is flexibility in base, equity or signing bonus.",
];

/// `{company}` and `{role}` are filled in.
pub const FALLBACK_SCRIPT: &str = "Thank you so much for the offer to join {company} as {role}. \
I'm genuinely excited about the team and the work. Based on my research into the market \
for this role and the experience I bring, I was hoping we could get closer to a number \
that reflects that. Is there flexibility on the base salary or the overall package? \
I'm confident we can find something that works for both of us.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationPlan {
    pub talking_points: Vec<String>,
    pub counter_offer_script: String,
    pub questions_to_ask: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawNegotiationPlan {
    talking_points: Vec<String>,
    counter_offer_script: String,
    questions_to_ask: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NegotiationInput {
    pub role: String,
    pub company: String,
    pub offer_amount: Option<f64>,
    pub target_amount: Option<f64>,
}

impl NegotiationPlan {
    pub fn fallback(role: &str, company: &str) -> Self {
        Self {
            talking_points: FALLBACK_TALKING_POINTS.iter().map(|p| p.to_string()).collect(),
            counter_offer_script: fill(FALLBACK_SCRIPT, &[("company", company), ("role", role)]),
            questions_to_ask: Vec::new(),
        }
    }

    fn from_raw(raw: RawNegotiationPlan, role: &str, company: &str) -> Self {
        let talking_points = clean_list(raw.talking_points, MAX_LIST_ITEMS);
        let script = raw.counter_offer_script.trim().to_string();
        if talking_points.is_empty() || script.is_empty() {
            return Self::fallback(role, company);
        }
        Self {
            talking_points,
            counter_offer_script: script,
            questions_to_ask: clean_list(raw.questions_to_ask, MAX_LIST_ITEMS),
        }
    }
}

fn amount_line(label: &str, amount: Option<f64>) -> String {
    match amount {
        Some(a) if a.is_finite() && a > 0.0 => format!("{label}: {a:.0}"),
        _ => format!("{label}: not provided"),
    }
}

impl NegotiationInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.role.trim().is_empty() || self.company.trim().is_empty() {
            return Err(AppError::Validation(
                "role and company are required".to_string(),
            ));
        }
        for amount in [self.offer_amount, self.target_amount].into_iter().flatten() {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(AppError::Validation(
                    "amounts must be positive numbers".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub fn build_negotiation_prompt(input: &NegotiationInput) -> String {
    let offer_line = amount_line("CURRENT OFFER", input.offer_amount);
    let target_line = amount_line("CANDIDATE TARGET", input.target_amount);
    fill(
        NEGOTIATION_PROMPT,
        &[
            ("role", input.role.trim()),
            ("company", input.company.trim()),
            ("offer_line", offer_line.as_str()),
            ("target_line", target_line.as_str()),
        ],
    )
}

pub async fn generate_negotiation_plan(
    llm: &LlmClient,
    cache: &LlmCache,
    input: &NegotiationInput,
) -> Result<NegotiationPlan, AppError> {
    input.validate()?;
    let role = input.role.trim();
    let company = input.company.trim();
    let prompt = build_negotiation_prompt(input);

    Ok(llm
        .call_cached::<RawNegotiationPlan>(
            cache,
            "negotiation",
            &prompt,
            &system_prompt(NEGOTIATION_ROLE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Negotiation coaching failed: {e}")))?
        .map(|raw| NegotiationPlan::from_raw(raw, role, company))
        .or_fallback("negotiation plan", || NegotiationPlan::fallback(role, company)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(offer: Option<f64>) -> NegotiationInput {
        NegotiationInput {
            role: "Staff Engineer".to_string(),
            company: "Initech".to_string(),
            offer_amount: offer,
            target_amount: None,
        }
    }

    #[test]
    fn test_fallback_fills_script() {
        let plan = NegotiationPlan::fallback("Staff Engineer", "Initech");
        assert!(plan.counter_offer_script.contains("join Initech as Staff Engineer"));
        assert_eq!(plan.talking_points.len(), FALLBACK_TALKING_POINTS.len());
    }

    #[test]
    fn test_from_raw_without_script_falls_back() {
        let raw = RawNegotiationPlan {
            talking_points: vec!["Anchor high".to_string()],
            ..Default::default()
        };
        let plan = NegotiationPlan::from_raw(raw, "SRE", "Acme");
        assert_eq!(plan, NegotiationPlan::fallback("SRE", "Acme"));
    }

    #[test]
    fn test_from_raw_keeps_model_output() {
        let raw = RawNegotiationPlan {
            talking_points: vec![" Anchor on impact ".to_string(), "anchor on impact".to_string()],
            counter_offer_script: "Thanks for the offer...".to_string(),
            questions_to_ask: vec!["What is the refresh policy?".to_string()],
        };
        let plan = NegotiationPlan::from_raw(raw, "SRE", "Acme");
        assert_eq!(plan.talking_points, vec!["Anchor on impact"]);
        assert_eq!(plan.questions_to_ask.len(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_amounts() {
        assert!(input(Some(150_000.0)).validate().is_ok());
        assert!(input(Some(-1.0)).validate().is_err());
        assert!(input(Some(f64::NAN)).validate().is_err());
        let mut blank = input(None);
        blank.company = " ".to_string();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_prompt_mentions_missing_amounts() {
        let prompt = build_negotiation_prompt(&input(Some(180_000.0)));
        assert!(prompt.contains("CURRENT OFFER: 180000"));
        assert!(prompt.contains("CANDIDATE TARGET: not provided"));
    }
}
