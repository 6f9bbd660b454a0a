//! Ranks a user's contacts by referral likelihood for one target company.

use serde::Serialize;

use crate::models::contact::ContactRow;
use crate::outreach::scoring::{explain_referral, ReferralBreakdown, ReferralSignals, ReferralWeights};

pub const DEFAULT_RANK_LIMIT: usize = 10;
pub const MAX_RANK_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub contact: ContactRow,
    pub referral_likelihood: u8,
    pub breakdown: ReferralBreakdown,
}

/// Scores every contact, sorts by descending likelihood and keeps the first `limit`.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_contacts(
    contacts: Vec<ContactRow>,
    target_company: &str,
    limit: usize,
    now_ms: i64,
    weights: &ReferralWeights,
) -> Vec<ScoredCandidate> {
    if limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredCandidate> = contacts
        .into_iter()
        .map(|contact| {
            let breakdown =
                explain_referral(&ReferralSignals::from(&contact), target_company, now_ms, weights);
            ScoredCandidate {
                referral_likelihood: breakdown.score,
                breakdown,
                contact,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.referral_likelihood.cmp(&a.referral_likelihood));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact::ConnectionDegree;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const NOW: i64 = 1_760_000_000_000;
    const DAY: i64 = 86_400_000;

    fn make_contact(
        name: &str,
        company: Option<&str>,
        degree: ConnectionDegree,
        strength: f64,
        last_ms: Option<i64>,
    ) -> ContactRow {
        ContactRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            email: None,
            company: company.map(String::from),
            title: None,
            connection_degree: degree,
            relationship_strength: strength,
            last_contacted_at: last_ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            notes: None,
            source: "manual".to_string(),
            created_at: Utc::now(),
        }
    }

    fn names(ranked: &[ScoredCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.contact.name.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_ranking() {
        let contacts = vec![
            make_contact("A", Some("Acme"), ConnectionDegree::First, 5.0, Some(NOW - 3 * DAY)),
            make_contact("B", Some("Globex"), ConnectionDegree::Second, 3.0, Some(NOW - 40 * DAY)),
            make_contact("C", None, ConnectionDegree::Third, 2.0, None),
        ];

        let ranked = rank_contacts(contacts, "Acme", 2, NOW, &ReferralWeights::default());

        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert_eq!(ranked[0].referral_likelihood, 100);
        // 0.60 + 0.18 + 0.08 (40 days falls in the 90-day tier)
        assert_eq!(ranked[1].referral_likelihood, 86);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let contacts = vec![
            make_contact("A", None, ConnectionDegree::First, 0.0, None),
            make_contact("B", None, ConnectionDegree::First, 0.0, None),
            make_contact("C", None, ConnectionDegree::Third, 0.0, None),
            make_contact("D", None, ConnectionDegree::First, 0.0, None),
        ];
        let ranked = rank_contacts(contacts, "Acme", 10, NOW, &ReferralWeights::default());
        assert_eq!(ranked[0].referral_likelihood, 80);
        assert_eq!(names(&ranked), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_empty_list_returns_empty() {
        let ranked = rank_contacts(vec![], "Acme", 10, NOW, &ReferralWeights::default());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_zero_limit_returns_empty() {
        let contacts = vec![make_contact("A", None, ConnectionDegree::First, 1.0, None)];
        assert!(rank_contacts(contacts, "Acme", 0, NOW, &ReferralWeights::default()).is_empty());
    }

    #[test]
    fn test_limit_larger_than_list() {
        let contacts = vec![
            make_contact("A", None, ConnectionDegree::Third, 1.0, None),
            make_contact("B", Some("acme"), ConnectionDegree::Third, 1.0, None),
        ];
        let ranked = rank_contacts(contacts, "Acme", 50, NOW, &ReferralWeights::default());
        assert_eq!(names(&ranked), vec!["B", "A"]);
    }

    #[test]
    fn test_breakdown_matches_score() {
        let contacts = vec![make_contact(
            "A",
            Some("Acme"),
            ConnectionDegree::Second,
            5.0,
            Some(NOW - 10 * DAY),
        )];
        let ranked = rank_contacts(contacts, "acme", 1, NOW, &ReferralWeights::default());
        let b = ranked[0].breakdown;
        assert_eq!(b.score, ranked[0].referral_likelihood);
        assert_eq!(b.company_bonus, 0.25);
        assert_eq!(b.recency_bonus, 0.12);
    }
}
