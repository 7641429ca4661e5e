//! Ordered fallback resolution for uncertain page structure.
//!
//! A locator is a list of lookup strategies, most specific first. The first
//! strategy that yields something wins; list order is the only ranking. A
//! strategy that finds nothing is an expected outcome, not an error, so
//! misses are only traced.

use scraper::{ElementRef, Html, Selector};

use crate::error::EngineError;

/// The value produced by a winning strategy and that strategy's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub strategy_index: usize,
    pub value: T,
}

/// Runs `probe` over `strategies` in order and returns the first hit.
///
/// Returns `None` only when every strategy misses. A single strategy is just
/// a one-element slice.
pub fn resolve_first<S, T>(
    strategies: &[S],
    mut probe: impl FnMut(&S) -> Option<T>,
) -> Option<Resolved<T>> {
    strategies.iter().enumerate().find_map(|(strategy_index, s)| {
        probe(s).map(|value| Resolved {
            strategy_index,
            value,
        })
    })
}

/// Parses a CSS selector, naming the profile field in any error.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSelector`] if `selector` does not parse.
pub fn compile_selector(selector: &str, context: &str) -> Result<Selector, EngineError> {
    Selector::parse(selector).map_err(|e| EngineError::InvalidSelector {
        context: context.to_owned(),
        selector: selector.to_owned(),
        reason: format!("{e:?}"),
    })
}

#[derive(Debug, Clone)]
struct LocatorStrategy {
    source: String,
    selector: Selector,
}

/// An ordered list of CSS selectors for one region of a page.
#[derive(Debug, Clone)]
pub struct CandidateLocator {
    name: String,
    strategies: Vec<LocatorStrategy>,
}

impl CandidateLocator {
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyLocator`] for an empty list and
    /// [`EngineError::InvalidSelector`] for any selector that does not parse.
    pub fn new<S: AsRef<str>>(name: &str, selectors: &[S]) -> Result<Self, EngineError> {
        if selectors.is_empty() {
            return Err(EngineError::EmptyLocator {
                context: name.to_owned(),
            });
        }

        let strategies = selectors
            .iter()
            .map(|s| {
                let source = s.as_ref().to_owned();
                compile_selector(&source, name).map(|selector| LocatorStrategy { source, selector })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_owned(),
            strategies,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selector strings in evaluation order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.source.as_str())
    }

    /// First element matched by the highest-priority strategy that matches anything.
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.resolve_with_index(document).map(|r| r.value)
    }

    #[must_use]
    pub fn resolve_with_index<'a>(&self, document: &'a Html) -> Option<Resolved<ElementRef<'a>>> {
        let resolved = resolve_first(&self.strategies, |strategy| {
            let found = document.select(&strategy.selector).next();
            if found.is_none() {
                tracing::trace!(locator = %self.name, selector = %strategy.source, "no match");
            }
            found
        });

        match &resolved {
            Some(r) => tracing::debug!(
                locator = %self.name,
                selector = %self.strategies[r.strategy_index].source,
                "resolved"
            ),
            None => tracing::debug!(locator = %self.name, "no strategy matched"),
        }

        resolved
    }
}

/// Text content of `element` with runs of whitespace collapsed to one space.
///
/// Text nodes are concatenated without a separator, the way a browser's
/// `textContent` does, so `<b>£</b>10` reads as `£10`.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: &str = r#"
        <div class="detail__minbid">
            Minimum bid <span class="NumberPart">12.00</span>
        </div>
    "#;

    fn locator() -> CandidateLocator {
        CandidateLocator::new("min_bid", &[".NumberPart", ".detail__minbid"]).unwrap()
    }

    #[test]
    fn resolve_first_prefers_earlier_strategy() {
        let hit = resolve_first(&[1, 2, 3], |n| (*n >= 2).then_some(n * 10));
        assert_eq!(
            hit,
            Some(Resolved {
                strategy_index: 1,
                value: 20
            })
        );
    }

    #[test]
    fn resolve_first_single_strategy() {
        let hit = resolve_first(&["only"], |s| Some(s.len()));
        assert_eq!(hit.map(|r| r.value), Some(4));
    }

    #[test]
    fn resolve_first_all_miss_is_none() {
        let hit: Option<Resolved<i32>> = resolve_first(&[1, 2], |_| None);
        assert!(hit.is_none());
    }

    #[test]
    fn resolve_first_stops_at_first_hit() {
        let mut probed = Vec::new();
        let _ = resolve_first(&["a", "b", "c"], |s| {
            probed.push(*s);
            (*s == "b").then_some(())
        });
        assert_eq!(probed, vec!["a", "b"]);
    }

    #[test]
    fn specific_target_wins_when_both_exist() {
        let doc = Html::parse_document(BOTH);
        let hit = locator().resolve_with_index(&doc).unwrap();
        assert_eq!(hit.strategy_index, 0);
        assert_eq!(element_text(&hit.value), "12.00");
    }

    #[test]
    fn fallback_used_only_when_specific_absent() {
        let doc = Html::parse_document(r#"<div class="detail__minbid">Minimum bid £8</div>"#);
        let hit = locator().resolve_with_index(&doc).unwrap();
        assert_eq!(hit.strategy_index, 1);
        assert_eq!(element_text(&hit.value), "Minimum bid £8");
    }

    #[test]
    fn none_when_every_strategy_misses() {
        let doc = Html::parse_document("<p>nothing to see</p>");
        assert!(locator().resolve(&doc).is_none());
    }

    #[test]
    fn empty_locator_is_rejected() {
        let empty: [&str; 0] = [];
        let err = CandidateLocator::new("delivery", &empty).unwrap_err();
        assert!(matches!(err, EngineError::EmptyLocator { .. }));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let err = CandidateLocator::new("delivery", &["td[data-x"]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelector { ref selector, .. } if selector == "td[data-x"));
    }

    #[test]
    fn element_text_joins_nodes_and_collapses_whitespace() {
        let doc = Html::parse_document("<p id=x>  <b>£</b>1,200\n\n  <i>each</i> </p>");
        let sel = Selector::parse("#x").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(&el), "£1,200 each");
    }
}
