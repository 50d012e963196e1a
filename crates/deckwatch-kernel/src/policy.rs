//! [`PolicyTable`] – ordered, first-match-wins decision rules.
//!
//! Each [`PolicyRule`] pairs a predicate over some context `C` with the
//! outcome `O` it selects.  Rules are evaluated in insertion order; the first
//! one whose predicate holds wins.  When no rule matches, the table's
//! fallback outcome is returned under the rule name [`FALLBACK_RULE`].

/// Name reported when no rule matched.
pub const FALLBACK_RULE: &str = "otherwise";

/// One `(predicate, outcome)` entry of a [`PolicyTable`].
#[derive(Debug, Clone)]
pub struct PolicyRule<C, O> {
    pub name: &'static str,
    pub applies: fn(&C) -> bool,
    pub outcome: O,
}

/// The outcome chosen for one context, and which rule chose it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict<O> {
    pub rule: &'static str,
    pub outcome: O,
}

/// Ordered rule list with a fallback.
///
/// # Example
///
/// ```
/// use deckwatch_kernel::policy::PolicyTable;
///
/// let table = PolicyTable::new("small")
///     .rule("negative", |n: &i32| *n < 0, "negative")
///     .rule("large", |n: &i32| *n > 100, "large");
///
/// assert_eq!(table.evaluate(&-5).outcome, "negative");
/// assert_eq!(table.evaluate(&500).rule, "large");
/// assert_eq!(table.evaluate(&7).outcome, "small");
/// ```
#[derive(Debug, Clone)]
pub struct PolicyTable<C, O> {
    rules: Vec<PolicyRule<C, O>>,
    fallback: O,
}

impl<C, O: Clone> PolicyTable<C, O> {
    /// Create an empty table that always yields `fallback`.
    pub fn new(fallback: O) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule.  Rules are evaluated in insertion order.
    pub fn rule(mut self, name: &'static str, applies: fn(&C) -> bool, outcome: O) -> Self {
        self.rules.push(PolicyRule {
            name,
            applies,
            outcome,
        });
        self
    }

    /// Evaluate `context` against every rule and return the first match.
    pub fn evaluate(&self, context: &C) -> Verdict<O> {
        self.rules
            .iter()
            .find(|r| (r.applies)(context))
            .map(|r| Verdict {
                rule: r.name,
                outcome: r.outcome.clone(),
            })
            .unwrap_or_else(|| Verdict {
                rule: FALLBACK_RULE,
                outcome: self.fallback.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PolicyTable<u32, char> {
        PolicyTable::new('z')
            .rule("even", |n| n % 2 == 0, 'a')
            .rule("multiple_of_three", |n| n % 3 == 0, 'b')
    }

    #[test]
    fn first_matching_rule_wins() {
        // 6 matches both; "even" was inserted first.
        let v = table().evaluate(&6);
        assert_eq!(v.rule, "even");
        assert_eq!(v.outcome, 'a');
        assert_eq!(table().evaluate(&9).outcome, 'b');
    }

    #[test]
    fn fallback_when_nothing_matches() {
        let v = table().evaluate(&7);
        assert_eq!(v.rule, FALLBACK_RULE);
        assert_eq!(v.outcome, 'z');
    }

    #[test]
    fn empty_table_yields_fallback() {
        let t: PolicyTable<u32, char> = PolicyTable::new('x');
        assert_eq!(t.evaluate(&0).outcome, 'x');
        assert_eq!(t.evaluate(&0).rule, FALLBACK_RULE);
    }
}
