//! Counter and goal key layout.
//!
//! `<ns>/<test>/<option>/spins`, `<ns>/<test>/<option>/wins` and
//! `<ns>/goals/<goal>` (a set of test names).

const SPINS_SUFFIX: &str = "/spins";
const WINS_SUFFIX: &str = "/wins";
const GOALS_SEGMENT: &str = "goals";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn spins(&self, test: &str, option: &str) -> String {
        format!("{}/{test}/{option}{SPINS_SUFFIX}", self.namespace)
    }

    pub fn wins(&self, test: &str, option: &str) -> String {
        format!("{}/{test}/{option}{WINS_SUFFIX}", self.namespace)
    }

    pub fn goal(&self, goal: &str) -> String {
        format!("{}/{GOALS_SEGMENT}/{goal}", self.namespace)
    }

    /// Glob matching every goal set.
    pub fn goals_pattern(&self) -> String {
        format!("{}/{GOALS_SEGMENT}/*", escape_glob(&self.namespace))
    }

    /// Goal name carried by a goal set key, if the key is one. Counter keys
    /// of a test literally named `goals` also match the goal pattern and are
    /// rejected by their extra segments.
    pub fn goal_from_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        let goal = key
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix('/')?
            .strip_prefix(GOALS_SEGMENT)?
            .strip_prefix('/')?;
        (!goal.contains('/')).then_some(goal)
    }

    /// Glob matching the spin counter of every option of `test`.
    pub fn option_spins_pattern(&self, test: &str) -> String {
        format!(
            "{}/{}/*{SPINS_SUFFIX}",
            escape_glob(&self.namespace),
            escape_glob(test)
        )
    }

    /// Option name carried by a spin counter key of `test`. Keys with more
    /// segments belong to a test whose name extends `test` (`a` vs `a/b`).
    pub fn option_from_spins_key<'a>(&self, test: &str, key: &'a str) -> Option<&'a str> {
        let option = key
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix('/')?
            .strip_prefix(test)?
            .strip_prefix('/')?
            .strip_suffix(SPINS_SUFFIX)?;
        (!option.is_empty() && !option.contains('/')).then_some(option)
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new("bandit")
    }
}

/// Escape glob metacharacters so `raw` only matches itself.
pub fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
