//! `policy` command: print the bid policy in effect.

use crate::optimizer::BidPolicy;

/// Policy constants as display rows.
pub fn policy_entries(policy: &BidPolicy) -> Vec<(&'static str, String)> {
    vec![
        ("min_bid", policy.min_bid.to_string()),
        ("max_increase", percent(policy.max_increase)),
        ("promising_increase", percent(policy.promising_increase)),
        ("min_promising_ctr", percent(policy.min_promising_ctr)),
        (
            "max_promising_spend_ratio",
            percent(policy.max_promising_spend_ratio),
        ),
    ]
}

fn percent(fraction: rust_decimal::Decimal) -> String {
    format!(
        "{} ({}%)",
        fraction,
        (fraction * rust_decimal::Decimal::ONE_HUNDRED).normalize()
    )
}

/// Print the policy.
pub fn run_policy_command(policy: &BidPolicy) -> anyhow::Result<()> {
    let entries = policy_entries(policy);

    // Find the longest key for alignment
    let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    println!("Bid policy:");
    println!();
    for (key, value) in entries {
        println!("  {:width$}  {}", key, value, width = max_key_len);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_entries() {
        let entries = policy_entries(&BidPolicy::default());
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], ("min_bid", "0.02".to_string()));
        assert_eq!(entries[1], ("max_increase", "0.20 (20%)".to_string()));
        assert_eq!(entries[3], ("min_promising_ctr", "0.003 (0.3%)".to_string()));
    }
}
