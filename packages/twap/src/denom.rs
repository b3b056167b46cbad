use itertools::Itertools;

/// Separator placed between the two denoms of a pair when they are used as one storage key.
pub const PAIR_KEY_SEPARATOR: &str = "|";

/// ## Description
/// Orders two denoms lexicographically. Returns [`None`] when both denoms are the same, since a
/// pair must contain two distinct assets.
pub fn canonical_pair(denom_a: &str, denom_b: &str) -> Option<(String, String)> {
    if denom_a == denom_b {
        return None;
    }
    if denom_a < denom_b {
        Some((denom_a.to_string(), denom_b.to_string()))
    } else {
        Some((denom_b.to_string(), denom_a.to_string()))
    }
}

/// Storage key of a canonical pair, e.g. `uatom|uxprt`.
pub fn pair_key(asset0_denom: &str, asset1_denom: &str) -> String {
    format!("{}{}{}", asset0_denom, PAIR_KEY_SEPARATOR, asset1_denom)
}

/// ## Description
/// Returns every unordered pair of distinct denoms, each in canonical order. Duplicate denoms
/// in the input are ignored and the pairs come back sorted.
///
/// ## Params
/// * **denoms** is a slice of [`String`], the denoms of a pool.
pub fn get_all_unique_denom_pairs(denoms: &[String]) -> Vec<(String, String)> {
    denoms
        .iter()
        .sorted()
        .dedup()
        .tuple_combinations()
        .map(|(asset0, asset1)| (asset0.clone(), asset1.clone()))
        .collect()
}

/// Number of unordered pairs that can be formed from `n` distinct denoms.
pub fn num_possible_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}
