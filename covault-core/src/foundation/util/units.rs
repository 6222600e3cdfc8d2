use crate::foundation::CovaultError;
use alloy_primitives::U256;

const WEI_PER_ETH_DECIMALS: usize = 18;

/// Parse a decimal ETH amount ("0.01", "1", "2.5") into wei.
///
/// Truncates past 18 fractional digits rather than rounding; rejects empty,
/// signed, or non-numeric input.
pub fn parse_ether(s: &str) -> Result<U256, CovaultError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CovaultError::InvalidRequest("amount must not be empty".to_string()));
    }
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(CovaultError::InvalidRequest(format!("invalid amount: {trimmed}")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CovaultError::InvalidRequest(format!("invalid amount: {trimmed}")));
    }

    let whole_wei = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|err| CovaultError::InvalidRequest(format!("invalid amount {trimmed}: {err}")))?
            .checked_mul(U256::from(10u64).pow(U256::from(WEI_PER_ETH_DECIMALS)))
            .ok_or_else(|| CovaultError::InvalidRequest(format!("amount overflows: {trimmed}")))?
    };

    let frac = if frac.len() > WEI_PER_ETH_DECIMALS { &frac[..WEI_PER_ETH_DECIMALS] } else { frac };
    let frac_wei = if frac.is_empty() {
        U256::ZERO
    } else {
        let scale = U256::from(10u64).pow(U256::from(WEI_PER_ETH_DECIMALS - frac.len()));
        U256::from_str_radix(frac, 10)
            .map_err(|err| CovaultError::InvalidRequest(format!("invalid amount {trimmed}: {err}")))?
            * scale
    };

    whole_wei.checked_add(frac_wei).ok_or_else(|| CovaultError::InvalidRequest(format!("amount overflows: {trimmed}")))
}

/// Format wei as a decimal ETH string with trailing zeros trimmed.
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::from(10u64).pow(U256::from(WEI_PER_ETH_DECIMALS));
    let whole = wei / divisor;
    let frac = wei % divisor;
    if frac.is_zero() {
        return whole.to_string();
    }
    // frac < 10^18, so it always fits u64.
    let frac = format!("{:018}", u64::try_from(frac).unwrap_or_default());
    let frac = frac.trim_end_matches('0');
    format!("{}.{}", whole, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_and_fractional() {
        assert_eq!(parse_ether("1").expect("parse"), U256::from(10u64).pow(U256::from(18)));
        assert_eq!(parse_ether("0.01").expect("parse"), U256::from(10_000_000_000_000_000u64));
        assert_eq!(parse_ether(".5").expect("parse"), U256::from(500_000_000_000_000_000u64));
        assert_eq!(parse_ether("2.5").expect("parse"), U256::from(2_500_000_000_000_000_000u64));
    }

    #[test]
    fn parse_truncates_past_18_decimals() {
        let exact = parse_ether("0.000000000000000001").expect("parse");
        assert_eq!(exact, U256::from(1u64));
        let truncated = parse_ether("0.0000000000000000019").expect("parse");
        assert_eq!(truncated, U256::from(1u64));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_ether("").is_err());
        assert!(parse_ether(".").is_err());
        assert!(parse_ether("-1").is_err());
        assert!(parse_ether("1e18").is_err());
        assert!(parse_ether("0x10").is_err());
    }

    #[test]
    fn format_round_trips() {
        for s in ["0", "1", "0.01", "2.5", "0.000000000000000001"] {
            let wei = parse_ether(s).expect("parse");
            assert_eq!(format_ether(wei), s);
        }
    }
}
