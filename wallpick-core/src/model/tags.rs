//! Tags: hyphen-delimited name tokens shared by at least two wallpapers.

/// Sorted, distinct tags for the given catalog names.
///
/// Names without a hyphen contribute nothing. Empty tokens (leading,
/// trailing or doubled hyphens) are skipped, and a token repeated inside one
/// name counts once for that name.
pub fn extract_tags(names: &[String]) -> Vec<String> {
    let mut pool: Vec<&str> = Vec::new();
    for name in names {
        let mut tokens: Vec<&str> = name.split('-').collect();
        if tokens.len() < 2 {
            continue;
        }
        tokens.retain(|t| !t.is_empty());
        tokens.sort_unstable();
        tokens.dedup();
        pool.extend(tokens);
    }
    pool.sort_unstable();

    let mut tags = Vec::new();
    let mut i = 0;
    while i < pool.len() {
        let token = pool[i];
        let run = pool[i..].iter().take_while(|t| **t == token).count();
        if run >= 2 {
            tags.push(token.to_string());
        }
        i += run;
    }
    tags
}
