//! Selector matching against an element and its ancestor chain.

use crate::syntax::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector,
};

/// The element facts matching needs, detached from tree ownership.
/// Consumers build these on the walk stack; no parent pointers required.
#[derive(Clone, Copy, Debug)]
pub struct ElementView<'a> {
    pub name: &'a str,
    pub attributes: &'a [(String, Option<String>)],
    /// First element child of its parent (text siblings don't count).
    pub first_child: bool,
    pub last_child: bool,
}

impl<'a> ElementView<'a> {
    fn attr(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_deref())
    }
}

fn matches_simple(view: &ElementView<'_>, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(t) => view.name.eq_ignore_ascii_case(t),
        SimpleSelector::Id(id) => view.attr("id") == Some(id.as_str()),
        SimpleSelector::Class(class) => view
            .attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class)),
        SimpleSelector::Attr { name, value } => match value {
            Some(want) => view.attr(name) == Some(want.as_str()),
            None => view
                .attributes
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case(name)),
        },
        SimpleSelector::Pseudo(PseudoClass::FirstChild) => view.first_child,
        SimpleSelector::Pseudo(PseudoClass::LastChild) => view.last_child,
    }
}

pub fn matches_compound(view: &ElementView<'_>, compound: &CompoundSelector) -> bool {
    compound.parts.iter().all(|p| matches_simple(view, p))
}

/// Match a full selector against `view` with its ancestor chain
/// (`ancestors` is ordered root-first; the last entry is the parent).
pub fn matches_complex(
    view: &ElementView<'_>,
    ancestors: &[ElementView<'_>],
    selector: &ComplexSelector,
) -> bool {
    if !matches_compound(view, &selector.key) {
        return false;
    }
    match_ancestor_chain(ancestors, &selector.ancestors)
}

/// `requirements` is nearest-ancestor-first. Descendant combinators may
/// skip generations, so matching backtracks: each candidate ancestor is
/// tried until one placement satisfies the rest of the chain.
fn match_ancestor_chain(
    chain: &[ElementView<'_>],
    requirements: &[(Combinator, CompoundSelector)],
) -> bool {
    let Some(((combinator, compound), rest)) = requirements.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => {
            let Some((parent, above)) = chain.split_last() else {
                return false;
            };
            matches_compound(parent, compound) && match_ancestor_chain(above, rest)
        }
        Combinator::Descendant => {
            for i in (0..chain.len()).rev() {
                if matches_compound(&chain[i], compound)
                    && match_ancestor_chain(&chain[..i], rest)
                {
                    return true;
                }
            }
            false
        }
    }
}
