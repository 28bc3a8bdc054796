use anyhow::{Result, bail};

/// Resolve CLI seed tokens. Accepts decimal (negative values use their
/// magnitude) and `0x`-prefixed hexadecimal.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            match u64::from_str_radix(&hex.replace('_', ""), 16) {
                Ok(value) => seeds.push(value),
                Err(err) => bail!("invalid hex seed '{token}': {err}"),
            }
            continue;
        }
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
            continue;
        }
        if let Ok(value) = token.parse::<i64>() {
            seeds.push(value.unsigned_abs());
            continue;
        }
        bail!("unrecognised seed '{token}'");
    }
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    seeds.dedup();
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn numeric_and_hex_seeds_resolve() {
        let seeds = resolve_seed_inputs(&tokens(&["1337", "-5", "0xFF", "0x00_10"])).unwrap();
        assert_eq!(seeds, vec![1337, 5, 255, 16]);
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert!(resolve_seed_inputs(&tokens(&["seedling"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0xZZ"])).is_err());
        assert!(resolve_seed_inputs(&[]).is_err());
    }
}
