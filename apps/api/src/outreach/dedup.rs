use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::contact::{ConnectionDegree, ContactRow};
use crate::outreach::contacts::NewContact;

/// Default relationship strength for a lead the user has not rated yet.
const SUGGESTED_STRENGTH: f64 = 1.0;

/// A lead proposed by the LLM. Untrusted: every field is re-checked before import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_degree", deserialize_with = "lenient_degree")]
    pub connection_degree: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_degree() -> i64 {
    3
}

/// Models write the degree as `2`, `2.0` or `"2"`. Anything unreadable becomes 0,
/// which `plan_import` skips with a reason instead of failing the whole list.
fn lenient_degree<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => default_degree(),
        serde_json::Value::Number(n) => n.as_i64().or_else(|| whole(n.as_f64())).unwrap_or(0),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| whole(s.parse::<f64>().ok()))
                .unwrap_or(0)
        }
        _ => 0,
    })
}

fn whole(n: Option<f64>) -> Option<i64> {
    n.filter(|n| n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15)
        .map(|n| n as i64)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedSuggestion {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportPlan {
    pub to_insert: Vec<NewContact>,
    pub skipped: Vec<SkippedSuggestion>,
}

/// Lowercased, trimmed email, or `None` if it does not look like `local@domain`.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || email.contains(' ') {
        return None;
    }
    Some(email)
}

/// Identity used when a contact has no usable email: normalized name at normalized company.
fn name_company_key(name: &str, company: Option<&str>) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let company = company.unwrap_or("").trim().to_lowercase();
    format!("{name}|{company}")
}

/// Decides which suggestions become new contacts.
///
/// A suggestion is skipped when its normalized email already exists (in the
/// user's contacts or earlier in the batch), when it has no email and the same
/// name is already known at the same company, or when its degree is invalid.
pub fn plan_import(
    existing: &[ContactRow],
    suggestions: Vec<SuggestedContact>,
    target_company: &str,
) -> ImportPlan {
    let mut seen_emails: HashSet<String> = existing
        .iter()
        .filter_map(|c| c.email.as_deref().and_then(normalize_email))
        .collect();
    let mut seen_names: HashSet<String> = existing
        .iter()
        .map(|c| name_company_key(&c.name, c.company.as_deref()))
        .collect();

    let mut plan = ImportPlan::default();

    for suggestion in suggestions {
        let name = suggestion.name.trim().to_string();
        if name.is_empty() {
            plan.skipped.push(SkippedSuggestion {
                name: suggestion.name,
                reason: "missing name".to_string(),
            });
            continue;
        }

        let degree = match ConnectionDegree::try_from(suggestion.connection_degree) {
            Ok(d) => d,
            Err(e) => {
                plan.skipped.push(SkippedSuggestion {
                    name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let company = suggestion
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(target_company.trim())
            .to_string();
        let email = suggestion.email.as_deref().and_then(normalize_email);
        let name_key = name_company_key(&name, Some(&company));

        let duplicate = match &email {
            Some(e) => seen_emails.contains(e),
            None => seen_names.contains(&name_key),
        };
        if duplicate {
            plan.skipped.push(SkippedSuggestion {
                name,
                reason: "already in contacts".to_string(),
            });
            continue;
        }

        if let Some(e) = &email {
            seen_emails.insert(e.clone());
        }
        seen_names.insert(name_key);

        plan.to_insert.push(NewContact {
            name,
            email,
            company: Some(company),
            title: suggestion.title,
            connection_degree: degree,
            relationship_strength: SUGGESTED_STRENGTH,
            last_contacted_at: None,
            notes: suggestion.reason,
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn existing(name: &str, email: Option<&str>, company: Option<&str>) -> ContactRow {
        ContactRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            email: email.map(String::from),
            company: company.map(String::from),
            title: None,
            connection_degree: ConnectionDegree::Second,
            relationship_strength: 3.0,
            last_contacted_at: None,
            notes: None,
            source: "manual".to_string(),
            created_at: Utc::now(),
        }
    }

    fn suggestion(name: &str, email: Option<&str>, degree: i64) -> SuggestedContact {
        SuggestedContact {
            name: name.to_string(),
            email: email.map(String::from),
            company: None,
            title: Some("Engineering Manager".to_string()),
            connection_degree: degree,
            reason: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Jane.Doe@Acme.COM "),
            Some("jane.doe@acme.com".to_string())
        );
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("@acme.com"), None);
        assert_eq!(normalize_email("a@b@c"), None);
        assert_eq!(normalize_email("a b@acme.com"), None);
    }

    #[test]
    fn test_skips_existing_email_case_insensitively() {
        let contacts = vec![existing("Jane", Some("jane@acme.com"), Some("Acme"))];
        let plan = plan_import(
            &contacts,
            vec![suggestion("Jane D", Some("JANE@acme.com "), 2)],
            "Acme",
        );
        assert!(plan.to_insert.is_empty());
        assert_eq!(plan.skipped[0].reason, "already in contacts");
    }

    #[test]
    fn test_dedups_within_batch() {
        let plan = plan_import(
            &[],
            vec![
                suggestion("Sam", Some("sam@globex.com"), 2),
                suggestion("Samuel", Some("Sam@Globex.com"), 2),
            ],
            "Globex",
        );
        assert_eq!(plan.to_insert.len(), 1);
        assert_eq!(plan.to_insert[0].name, "Sam");
        assert_eq!(plan.skipped.len(), 1);
    }

    #[test]
    fn test_emailless_suggestion_matches_on_name_and_company() {
        let contacts = vec![existing("Ana  Lima", None, Some("acme"))];
        let plan = plan_import(&contacts, vec![suggestion("ana lima", None, 3)], "Acme");
        assert!(plan.to_insert.is_empty());

        let plan = plan_import(&contacts, vec![suggestion("ana lima", None, 3)], "Globex");
        assert_eq!(plan.to_insert.len(), 1);
    }

    #[test]
    fn test_invalid_degree_is_skipped() {
        let plan = plan_import(&[], vec![suggestion("Bo", Some("bo@x.io"), 4)], "X");
        assert!(plan.to_insert.is_empty());
        assert!(plan.skipped[0].reason.contains("1, 2 or 3"));
    }

    #[test]
    fn test_imported_contact_defaults() {
        let plan = plan_import(&[], vec![suggestion("Lee", Some("LEE@x.io"), 2)], "Initech");
        let contact = &plan.to_insert[0];
        assert_eq!(contact.email.as_deref(), Some("lee@x.io"));
        assert_eq!(contact.company.as_deref(), Some("Initech"));
        assert_eq!(contact.connection_degree, ConnectionDegree::Second);
        assert_eq!(contact.relationship_strength, SUGGESTED_STRENGTH);
        assert!(contact.last_contacted_at.is_none());
    }

    #[test]
    fn test_blank_name_is_skipped() {
        let plan = plan_import(&[], vec![suggestion("   ", Some("x@y.z"), 1)], "X");
        assert_eq!(plan.skipped[0].reason, "missing name");
    }

    #[test]
    fn test_suggestion_degree_defaults_to_third() {
        let parsed: SuggestedContact = serde_json::from_str(r#"{"name": "Kim"}"#).unwrap();
        assert_eq!(parsed.connection_degree, 3);
        let parsed: SuggestedContact =
            serde_json::from_str(r#"{"name": "Kim", "connection_degree": null}"#).unwrap();
        assert_eq!(parsed.connection_degree, 3);
    }

    #[test]
    fn test_degree_accepts_strings_and_whole_floats() {
        let raw = r#"[
            {"name": "A", "connection_degree": "3"},
            {"name": "B", "connection_degree": 2.0},
            {"name": "C", "connection_degree": " 1 "},
            {"name": "D", "connection_degree": 1}
        ]"#;
        let parsed: Vec<SuggestedContact> = serde_json::from_str(raw).unwrap();
        let degrees: Vec<i64> = parsed.iter().map(|s| s.connection_degree).collect();
        assert_eq!(degrees, [3, 2, 1, 1]);
    }

    #[test]
    fn test_unreadable_degree_skips_only_that_entry() {
        let raw = r#"[
            {"name": "Ana", "email": "ana@x.io", "connection_degree": "second"},
            {"name": "Ben", "email": "ben@x.io", "connection_degree": 2.5},
            {"name": "Cy", "email": "cy@x.io", "connection_degree": {"n": 1}},
            {"name": "Dee", "email": "dee@x.io", "connection_degree": "2"}
        ]"#;
        let parsed: Vec<SuggestedContact> = serde_json::from_str(raw).unwrap();
        let plan = plan_import(&[], parsed, "Acme");
        assert_eq!(plan.to_insert.len(), 1);
        assert_eq!(plan.to_insert[0].name, "Dee");
        assert_eq!(plan.skipped.len(), 3);
        assert!(plan.skipped.iter().all(|s| s.reason.contains("1, 2 or 3")));
    }
}
