use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::domain::models::{CompanyGroup, FundScheme, RawCompany, RawScheme, lenient_f64};

/// Ordered canonicalization table: the first rule whose pattern appears
/// (case-insensitively) in the raw company name wins. Order matters, e.g.
/// QUANTUM must be tried before QUANT.
const CANONICAL_RULES: &[(&str, &str)] = &[
    ("ICICI", "ICICI Prudential"),
    ("HDFC", "HDFC"),
    ("SBI", "SBI"),
    ("ADITYA BIRLA", "Aditya Birla Sun Life"),
    ("AXIS", "Axis"),
    ("KOTAK", "Kotak Mahindra"),
    ("NIPPON", "Nippon India"),
    ("UTI", "UTI"),
    ("TATA", "Tata"),
    ("FRANKLIN", "Franklin Templeton"),
    ("DSP", "DSP"),
    ("MIRAE", "Mirae Asset"),
    ("MOTILAL", "Motilal Oswal"),
    ("INVESCO", "Invesco"),
    ("BANDHAN", "Bandhan"),
    ("QUANTUM", "Quantum"),
    ("QUANT", "Quant"),
];

// Generic suffix words that end the fallback token scan.
const FALLBACK_STOP_WORDS: &[&str] = &[
    "mutual", "fund", "funds", "asset", "management", "amc", "limited", "ltd", "india",
];

/// Canonical company name for a raw record name: first matching rule, or
/// the leading raw-name tokens (at most three, stopping before generic
/// suffix words) when no rule applies.
pub fn canonical_company_name(raw_name: &str) -> String {
    let upper = raw_name.to_uppercase();
    for (pattern, canonical) in CANONICAL_RULES {
        if upper.contains(pattern) {
            return (*canonical).to_string();
        }
    }

    let mut tokens = Vec::new();
    for token in raw_name.split_whitespace() {
        if !tokens.is_empty()
            && (tokens.len() == 3 || FALLBACK_STOP_WORDS.contains(&token.to_lowercase().as_str()))
        {
            break;
        }
        tokens.push(token);
        if tokens.len() == 3 {
            break;
        }
    }
    tokens.join(" ")
}

fn record_name_is_valid(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.len() < 3 {
        return false;
    }
    let lower = trimmed.to_lowercase();
    lower != "unknown" && lower != "unclaimed"
}

fn validate_scheme(raw: &RawScheme, record_updated: Option<&str>) -> Option<FundScheme> {
    let name = raw.scheme_name.as_deref()?.trim();
    let code = raw.scheme_code.as_deref()?.trim();
    if name.is_empty() || code.is_empty() || name.to_lowercase().contains("unknown") {
        return None;
    }
    let nav = lenient_f64(raw.nav.as_ref())?;
    if nav <= 0.0 {
        return None;
    }
    let last_updated = raw
        .last_updated
        .clone()
        .or_else(|| record_updated.map(|s| s.to_string()))
        .unwrap_or_default();
    Some(FundScheme {
        scheme_code: code.to_string(),
        scheme_name: name.to_string(),
        nav,
        last_updated,
    })
}

/// Single-pass transform over the raw mutual-fund listing response.
///
/// Invalid records and schemes are skipped, never fatal: a non-array
/// payload or a list of garbage rows both come back as an empty result,
/// and the caller decides how to surface that to the user. Groups are
/// returned sorted alphabetically by canonical name so the rendered list
/// is stable across fetches.
pub fn group_fund_companies(raw: &Value) -> Vec<CompanyGroup> {
    let Some(records) = raw.as_array() else {
        return Vec::new();
    };

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, CompanyGroup> = HashMap::new();
    let mut seen_codes: HashMap<String, HashSet<String>> = HashMap::new();

    for record in records {
        let Ok(company) = serde_json::from_value::<RawCompany>(record.clone()) else {
            continue;
        };
        let Some(raw_name) = company.company_name.as_deref() else {
            continue;
        };
        if !record_name_is_valid(raw_name) {
            continue;
        }
        let canonical = canonical_company_name(raw_name);
        if canonical.is_empty() {
            continue;
        }

        let group = groups.entry(canonical.clone()).or_insert_with(|| {
            order.push(canonical.clone());
            CompanyGroup {
                company_name: canonical.clone(),
                schemes: Vec::new(),
                last_updated: String::new(),
            }
        });
        let codes = seen_codes.entry(canonical.clone()).or_default();

        for raw_scheme in &company.schemes {
            let Some(scheme) = validate_scheme(raw_scheme, company.last_updated.as_deref()) else {
                continue;
            };
            if !codes.insert(scheme.scheme_code.clone()) {
                continue;
            }
            // Upstream timestamps are ISO-8601, so the lexicographic max is
            // also the chronological max.
            if scheme.last_updated > group.last_updated {
                group.last_updated = scheme.last_updated.clone();
            }
            group.schemes.push(scheme);
        }
    }

    let mut result: Vec<CompanyGroup> = order
        .into_iter()
        .filter_map(|name| groups.remove(&name))
        .filter(|g| !g.schemes.is_empty())
        .collect();
    result.sort_by(|a, b| {
        a.company_name
            .to_lowercase()
            .cmp(&b.company_name.to_lowercase())
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scheme(name: &str, code: &str, nav: Value, updated: &str) -> Value {
        json!({
            "schemeName": name,
            "schemeCode": code,
            "nav": nav,
            "lastUpdated": updated
        })
    }

    #[test]
    fn canonicalizes_by_priority_rule() {
        assert_eq!(canonical_company_name("ICICI Prudential Value Fund"), "ICICI Prudential");
        assert_eq!(canonical_company_name("HDFC Asset Management"), "HDFC");
        assert_eq!(canonical_company_name("Quantum Mutual Fund"), "Quantum");
        assert_eq!(canonical_company_name("Quant Small Cap"), "Quant");
    }

    #[test]
    fn fallback_takes_leading_tokens() {
        assert_eq!(canonical_company_name("Baroda BNP Paribas"), "Baroda BNP Paribas");
        assert_eq!(canonical_company_name("Edelweiss Mutual Fund"), "Edelweiss");
        assert_eq!(canonical_company_name("PPFAS Asset Management Co"), "PPFAS");
    }

    #[test]
    fn merges_records_with_same_canonical_name() {
        let input = json!([
            {
                "companyName": "HDFC Mutual Fund",
                "lastUpdated": "2024-01-02",
                "schemes": [scheme("HDFC Top 100", "H1", json!(812.3), "2024-01-02")]
            },
            {
                "companyName": "HDFC Asset Management",
                "lastUpdated": "2024-01-03",
                "schemes": [
                    scheme("HDFC Flexi Cap", "H2", json!(1520.8), "2024-01-03"),
                    scheme("HDFC Top 100", "H1", json!(812.3), "2024-01-02")
                ]
            }
        ]);
        let groups = group_fund_companies(&input);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].company_name, "HDFC");
        // Duplicate scheme code is kept once; the two distinct schemes merge.
        assert_eq!(groups[0].schemes.len(), 2);
        assert_eq!(groups[0].last_updated, "2024-01-03");
    }

    #[test]
    fn drops_invalid_navs_and_unknown_names() {
        let input = json!([
            {
                "companyName": "SBI Mutual Fund",
                "schemes": [
                    scheme("SBI Bluechip", "S1", json!(65.2), "2024-01-01"),
                    scheme("SBI Contra", "S2", json!(0), "2024-01-01"),
                    scheme("SBI Gilt", "S3", json!("-"), "2024-01-01"),
                    scheme("Unknown Scheme", "S4", json!(12.0), "2024-01-01"),
                    { "schemeCode": "S5", "nav": 10.0 }
                ]
            }
        ]);
        let groups = group_fund_companies(&input);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].schemes.len(), 1);
        assert_eq!(groups[0].schemes[0].scheme_code, "S1");
    }

    #[test]
    fn drops_groups_left_empty_and_bad_record_names() {
        let input = json!([
            { "companyName": "unknown", "schemes": [scheme("A", "1", json!(5.0), "")] },
            { "companyName": "Unclaimed", "schemes": [scheme("B", "2", json!(5.0), "")] },
            { "companyName": "ab", "schemes": [scheme("C", "3", json!(5.0), "")] },
            { "companyName": "Tata Mutual Fund", "schemes": [scheme("D", "4", json!(0), "")] }
        ]);
        assert!(group_fund_companies(&input).is_empty());
    }

    #[test]
    fn malformed_input_degrades_to_empty() {
        assert!(group_fund_companies(&json!({"error": "boom"})).is_empty());
        assert!(group_fund_companies(&json!("not an array")).is_empty());
        assert!(group_fund_companies(&json!([42, "junk", null])).is_empty());
    }

    #[test]
    fn groups_sort_alphabetically() {
        let input = json!([
            { "companyName": "Tata Mutual Fund", "schemes": [scheme("T", "T1", json!(9.0), "")] },
            { "companyName": "Axis Mutual Fund", "schemes": [scheme("A", "A1", json!(9.0), "")] },
            { "companyName": "Mirae Asset", "schemes": [scheme("M", "M1", json!(9.0), "")] }
        ]);
        let names: Vec<String> = group_fund_companies(&input)
            .into_iter()
            .map(|g| g.company_name)
            .collect();
        assert_eq!(names, vec!["Axis", "Mirae Asset", "Tata"]);
    }

    #[test]
    fn end_to_end_single_icici_record() {
        let input = json!([
            {
                "companyName": "ICICI Prudential Value Fund",
                "schemes": [scheme("ICICI Prudential Growth", "101", json!(25.4), "2024-01-01")]
            }
        ]);
        let groups = group_fund_companies(&input);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].company_name, "ICICI Prudential");
        assert_eq!(
            groups[0].schemes,
            vec![FundScheme {
                scheme_code: "101".to_string(),
                scheme_name: "ICICI Prudential Growth".to_string(),
                nav: 25.4,
                last_updated: "2024-01-01".to_string(),
            }]
        );
    }
}
