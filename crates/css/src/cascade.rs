//! Cascade: collect matching declarations for one element and pick a
//! winner per property.
//!
//! Ordering is (importance, specificity, source order), ascending, with
//! the last entry winning. Inline style is a specificity level of its
//! own above all stylesheet selectors; `!important` outranks everything
//! including inline.

use crate::select::{ElementView, matches_complex};
use crate::syntax::{Stylesheet, parse_declarations};
use crate::values::Value;
use core_types::Diagnostics;

/// Cascade weight: (inline, id-count, class+attr+pseudo-count,
/// type-count), compared lexicographically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    pub inline: u8,
    pub ids: u16,
    pub classes: u16,
    pub types: u16,
}

impl Specificity {
    pub fn inline_style() -> Self {
        Specificity {
            inline: 1,
            ids: 0,
            classes: 0,
            types: 0,
        }
    }

    pub fn from_selector(counts: (u16, u16, u16)) -> Self {
        Specificity {
            inline: 0,
            ids: counts.0,
            classes: counts.1,
            types: counts.2,
        }
    }
}

struct Candidate {
    property: String,
    value: Value,
    important: bool,
    specificity: Specificity,
    order: u32,
}

/// Resolve the winning declaration per property for one element.
///
/// `ancestors` is the element's chain root-first (for combinator
/// matching); `inline_style` is the raw `style` attribute value if any.
/// Returns (property, value) winners; properties whose winning value is
/// `Unsupported` are dropped here, excluded from application.
pub fn cascade_declarations(
    view: &ElementView<'_>,
    ancestors: &[ElementView<'_>],
    sheet: &Stylesheet,
    inline_style: Option<&str>,
    diags: &mut Diagnostics,
) -> Vec<(String, Value)> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for (order, rule) in sheet.rules.iter().enumerate() {
        let mut matched: Option<Specificity> = None;
        for selector in &rule.selectors {
            if matches_complex(view, ancestors, selector) {
                let specificity = Specificity::from_selector(selector.specificity());
                matched = Some(matched.map_or(specificity, |cur| cur.max(specificity)));
            }
        }
        let Some(specificity) = matched else {
            continue;
        };
        // Retained-but-unsupported values never compete in the cascade.
        candidates.extend(
            rule.declarations
                .iter()
                .filter(|d| !matches!(d.value, Value::Unsupported(_)))
                .map(|d| Candidate {
                    property: d.name.clone(),
                    value: d.value.clone(),
                    important: d.important,
                    specificity,
                    order: order as u32,
                }),
        );
    }

    if let Some(inline) = inline_style {
        let declarations = parse_declarations(inline, diags);
        candidates.extend(
            declarations
                .into_iter()
                .filter(|d| !matches!(d.value, Value::Unsupported(_)))
                .map(|d| Candidate {
                    property: d.name,
                    value: d.value,
                    important: d.important,
                    specificity: Specificity::inline_style(),
                    order: u32::MAX,
                }),
        );
    }

    // Stable sort keeps declaration order within a rule, so a property
    // declared twice in one rule resolves to the later declaration.
    candidates.sort_by(|a, b| {
        (&a.property, a.important, a.specificity, a.order).cmp(&(
            &b.property,
            b.important,
            b.specificity,
            b.order,
        ))
    });

    let mut winners = Vec::new();
    let mut i = 0;
    while i < candidates.len() {
        let mut j = i;
        while j + 1 < candidates.len() && candidates[j + 1].property == candidates[i].property {
            j += 1;
        }
        let winner = &candidates[j];
        winners.push((winner.property.clone(), winner.value.clone()));
        i = j + 1;
    }
    winners
}
