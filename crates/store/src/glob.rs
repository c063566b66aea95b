//! Redis `KEYS`-style glob matching: `*`, `?`, `[...]` classes and `\` escapes.

pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    matches(&pattern, &text)
}

fn matches(p: &[char], t: &[char]) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some('*') => {
            let mut rest = &p[1..];
            while rest.first() == Some(&'*') {
                rest = &rest[1..];
            }
            if rest.is_empty() {
                return true;
            }
            (0..=t.len()).any(|i| matches(rest, &t[i..]))
        }
        Some('?') => !t.is_empty() && matches(&p[1..], &t[1..]),
        Some('[') => {
            let Some((&c, t_rest)) = t.split_first() else {
                return false;
            };
            match class_match(&p[1..], c) {
                Some((hit, consumed)) => hit && matches(&p[1 + consumed..], t_rest),
                None => false,
            }
        }
        Some('\\') if p.len() > 1 => !t.is_empty() && t[0] == p[1] && matches(&p[2..], &t[1..]),
        Some(&c) => !t.is_empty() && t[0] == c && matches(&p[1..], &t[1..]),
    }
}

/// Match `c` against a class body (the chars after `[`). Returns whether it
/// matched and how many pattern chars the class used, `]` included.
fn class_match(p: &[char], c: char) -> Option<(bool, usize)> {
    let negate = p.first() == Some(&'^');
    let mut i = usize::from(negate);
    let mut hit = false;

    while i < p.len() {
        match p[i] {
            ']' => return Some((hit != negate, i + 1)),
            '\\' if i + 1 < p.len() => {
                hit |= p[i + 1] == c;
                i += 2;
            }
            lo if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' => {
                let hi = p[i + 2];
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                hit |= (lo..=hi).contains(&c);
                i += 3;
            }
            other => {
                hit |= other == c;
                i += 1;
            }
        }
    }

    None
}
