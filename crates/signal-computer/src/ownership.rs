//! Ownership classification from owner-name text.

use property_core::{DataIssue, OwnershipType};

const LLC_TOKENS: &[&str] = &["LLC", "PLLC", "LP", "LLP", "LLLP"];

const CORPORATE_TOKENS: &[&str] = &[
    "INC",
    "INCORPORATED",
    "CORP",
    "CORPORATION",
    "CO",
    "COMPANY",
    "LTD",
    "HOLDINGS",
    "ENTERPRISES",
];

/// Classify one owner name. Returns `None` when the name is blank.
///
/// Matching is whole-token so that "VINCENT PRINCE" is not read as "INC".
/// Dots are dropped before tokenizing, which folds "L.L.C." into "LLC".
pub fn classify_owner_name(name: &str) -> Option<Result<OwnershipType, DataIssue>> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return Some(Err(DataIssue::UnsupportedOwnershipText {
            text: trimmed.to_string(),
        }));
    }

    let normalized = trimmed.to_uppercase().replace('.', "");
    let tokens: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let kind = if tokens.iter().any(|t| LLC_TOKENS.contains(t)) {
        OwnershipType::Llc
    } else if tokens.iter().any(|t| CORPORATE_TOKENS.contains(t)) {
        OwnershipType::Corporation
    } else {
        OwnershipType::Individual
    };
    Some(Ok(kind))
}

/// Ownership type across both owner slots. The first entity found wins;
/// otherwise Individual. Issues are returned alongside, never raised.
pub fn classify_ownership(
    owner1: Option<&str>,
    owner2: Option<&str>,
) -> (OwnershipType, Vec<DataIssue>) {
    let mut issues = Vec::new();
    let mut seen_any = false;

    for name in [owner1, owner2].into_iter().flatten() {
        match classify_owner_name(name) {
            Some(Ok(kind)) => {
                seen_any = true;
                if kind.is_entity() {
                    return (kind, issues);
                }
            }
            Some(Err(issue)) => {
                seen_any = true;
                issues.push(issue);
            }
            None => {}
        }
    }

    if !seen_any {
        issues.push(DataIssue::missing("owner1_name"));
    }
    (OwnershipType::Individual, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llc_variants() {
        for name in [
            "Acme Holdings LLC",
            "ACME L.L.C.",
            "Smith Family LP",
            "river pllc",
            "Delta Partners LLLP",
        ] {
            assert_eq!(
                classify_owner_name(name),
                Some(Ok(OwnershipType::Llc)),
                "{name}"
            );
        }
    }

    #[test]
    fn test_corporate_variants() {
        for name in ["Widget Inc.", "MEGA CORP", "Lone Star Holdings", "BIG CO"] {
            assert_eq!(
                classify_owner_name(name),
                Some(Ok(OwnershipType::Corporation)),
                "{name}"
            );
        }
    }

    #[test]
    fn test_trusts_are_individual() {
        assert_eq!(
            classify_owner_name("SMITH FAMILY TRUST"),
            Some(Ok(OwnershipType::Individual))
        );
    }

    #[test]
    fn test_substrings_inside_names_are_not_entities() {
        assert_eq!(
            classify_owner_name("VINCENT PRINCE"),
            Some(Ok(OwnershipType::Individual))
        );
        assert_eq!(
            classify_owner_name("Jane Corporan"),
            Some(Ok(OwnershipType::Individual))
        );
    }

    #[test]
    fn test_unsupported_text_falls_back_to_individual() {
        let (kind, issues) = classify_ownership(Some("#### 1234"), None);
        assert_eq!(kind, OwnershipType::Individual);
        assert!(matches!(
            issues.as_slice(),
            [DataIssue::UnsupportedOwnershipText { .. }]
        ));
    }

    #[test]
    fn test_second_owner_entity_is_detected() {
        let (kind, issues) = classify_ownership(Some("JOHN DOE"), Some("DOE RENTALS LLC"));
        assert_eq!(kind, OwnershipType::Llc);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_owner_is_reported() {
        let (kind, issues) = classify_ownership(None, Some("   "));
        assert_eq!(kind, OwnershipType::Individual);
        assert_eq!(issues, vec![DataIssue::missing("owner1_name")]);
    }
}
