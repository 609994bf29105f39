//! Composable filter/sort/display stages (§4.6), shared by `jnm` and `jldd`.
//!
//! A pipeline runs in three fixed phases: filters shrink the sequence,
//! sorts reorder what's left, displays render each surviving item to a
//! string. Every phase defaults to a single always-on stage
//! (`resolve_class` / `noop` / `normal_display`) so that an empty CLI stage
//! list still produces sensible output (§4.6 "determinism").

use std::collections::HashSet;

use crate::access_flags::is_private;
use crate::descriptors::{demangle_method_descriptor, fqcn};
use crate::symbols::{Symbol, SymbolKind, Visibility};

/// One symbol together with the file/jar-entry it came from, the unit a
/// filter or display stage operates on.
#[derive(Debug, Clone)]
pub struct Located {
    pub source_file: String,
    /// `Some(entry)` when `source_file` is a jar and this class came from one
    /// of its entries; `None` for a standalone `.class` file.
    pub jar_entry: Option<String>,
    pub class_name: String,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Drop reference symbols whose target is defined within the same class
    /// file. Always applied first, even with no CLI filters requested.
    ResolveClass,
    /// Drop any reference whose target is defined anywhere in the current
    /// input set (all files / all classes in a jar).
    ResolveAll,
    RemoveDefined,
    RemoveUndefined,
    RemovePrivate,
    RemoveNonClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Noop,
    Alphabetic,
    Numeric,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    NormalDisplay,
    PrependFilename,
    NameOnly,
    Demangle,
}

/// An ordered filter/sort/display stage list plus the always-on defaults.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    pub displays: Vec<Display>,
}

impl Pipeline {
    /// Runs all three phases over `items`, which must already carry the
    /// defined-symbol names visible in `items` for `resolve_class`/`resolve_all`
    /// to compare reference targets against.
    pub fn run(&self, items: Vec<Located>) -> Vec<(Located, String)> {
        let filtered = self.apply_filters(items);
        let sorted = self.apply_sorts(filtered);
        self.apply_displays(sorted)
    }

    fn apply_filters(&self, items: Vec<Located>) -> Vec<Located> {
        let defined_in_class: HashSet<(String, String)> = items
            .iter()
            .filter(|item| !item.symbol.kind.is_reference())
            .map(|item| (item.class_name.clone(), item.symbol.name.clone()))
            .collect();
        let defined_anywhere: HashSet<String> = items
            .iter()
            .filter(|item| !item.symbol.kind.is_reference())
            .map(|item| item.symbol.name.clone())
            .collect();

        // `resolve_class` runs first and always, per §4.6.
        let mut out: Vec<Located> = items
            .into_iter()
            .filter(|item| {
                !item.symbol.kind.is_reference()
                    || !defined_in_class.contains(&(item.class_name.clone(), item.symbol.name.clone()))
            })
            .collect();

        for filter in &self.filters {
            out = match filter {
                Filter::ResolveClass => out, // already applied above
                Filter::ResolveAll => out
                    .into_iter()
                    .filter(|item| !item.symbol.kind.is_reference() || !defined_anywhere.contains(&item.symbol.name))
                    .collect(),
                Filter::RemoveDefined => out.into_iter().filter(|item| item.symbol.kind.is_reference()).collect(),
                Filter::RemoveUndefined => {
                    out.into_iter().filter(|item| !item.symbol.kind.is_reference()).collect()
                }
                Filter::RemovePrivate => out
                    .into_iter()
                    .filter(|item| item.symbol.visibility != Visibility::Private)
                    .collect(),
                Filter::RemoveNonClass => out.into_iter().filter(|item| item.symbol.kind.is_class()).collect(),
            };
        }
        out
    }

    fn apply_sorts(&self, mut items: Vec<Located>) -> Vec<Located> {
        for sort in &self.sorts {
            match sort {
                Sort::Noop => {}
                Sort::Alphabetic => items.sort_by(|a, b| a.symbol.name.cmp(&b.symbol.name)),
                Sort::Numeric => items.sort_by(|a, b| match (a.symbol.value, b.symbol.value) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }),
                Sort::Reverse => items.reverse(),
            }
        }
        items
    }

    fn apply_displays(&self, items: Vec<Located>) -> Vec<(Located, String)> {
        items
            .into_iter()
            .map(|item| {
                let mut rendered = normal_display(&item.symbol);
                for display in &self.displays {
                    rendered = match display {
                        Display::NormalDisplay => normal_display(&item.symbol),
                        Display::PrependFilename => prepend_filename(&item, &rendered),
                        Display::NameOnly => item.symbol.name.clone(),
                        Display::Demangle => format!("{rendered}\t{}", demangle(&item.symbol)),
                    };
                }
                (item, rendered)
            })
            .collect()
    }
}

/// `"%08x kind name"`, or nine spaces in place of the value when it's null
/// (reference symbols never carry a value).
pub fn normal_display(symbol: &Symbol) -> String {
    let value_field = match symbol.value {
        Some(v) => format!("{v:08x}"),
        None => " ".repeat(9),
    };
    format!("{value_field} {} {}", symbol.kind.letter(symbol.visibility), symbol.name)
}

fn prepend_filename(item: &Located, rendered: &str) -> String {
    match &item.jar_entry {
        Some(entry) => format!("{}({entry}): {rendered}", item.source_file),
        None => format!("{}: {rendered}", item.source_file),
    }
}

/// Demangled expanded form of a symbol's name, used by `-C`/`--demangle`.
/// Idempotent (§8 property 8): applying it to its own output is a no-op
/// because it operates on `Symbol.name`, not on the already-rendered string.
pub fn demangle(symbol: &Symbol) -> String {
    match symbol.kind {
        SymbolKind::Method | SymbolKind::RefMethod => {
            let (owner, member) = match symbol.name.rsplit_once('.') {
                Some((owner, member)) => (owner, member),
                None => return symbol.name.clone(),
            };
            format!("{owner}.{member}(...)") // descriptor isn't carried on Symbol; see render::method_signature for the full form
        }
        SymbolKind::Class | SymbolKind::RefClass => fqcn(&symbol.name),
        _ => symbol.name.clone(),
    }
}

/// Full demangled method signature given an explicit descriptor, used where
/// the descriptor is still in hand (the extraction site, before it's
/// discarded down to a bare `Symbol`).
pub fn method_signature(name: &str, descriptor: &str) -> Result<String, crate::errors::JvmError> {
    let (params, ret) = demangle_method_descriptor(descriptor)?;
    Ok(format!("{ret} {name}({})", params.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(class: &str, kind: SymbolKind, name: &str, value: Option<u64>) -> Located {
        Located {
            source_file: "Test.class".into(),
            jar_entry: None,
            class_name: class.into(),
            symbol: Symbol {
                value,
                kind,
                visibility: Visibility::External,
                name: name.into(),
                expanded_name: None,
            },
        }
    }

    #[test]
    fn resolve_class_drops_self_referencing_references() {
        let items = vec![
            located("p.Main", SymbolKind::Class, "p.Main", Some(10)),
            located("p.Main", SymbolKind::RefClass, "p.Main", None),
            located("p.Main", SymbolKind::RefClass, "p.Other", None),
        ];
        let pipeline = Pipeline::default();
        let out = pipeline.run(items);
        let names: Vec<&str> = out.iter().map(|(l, _)| l.symbol.name.as_str()).collect();
        assert_eq!(names, vec!["p.Main", "p.Other"]);
    }

    #[test]
    fn remove_defined_then_remove_undefined_is_empty() {
        let items = vec![
            located("p.Main", SymbolKind::Class, "p.Main", Some(1)),
            located("p.Main", SymbolKind::RefClass, "p.Other", None),
        ];
        let pipeline = Pipeline {
            filters: vec![Filter::RemoveDefined, Filter::RemoveUndefined],
            ..Default::default()
        };
        assert!(pipeline.run(items).is_empty());
    }

    #[test]
    fn numeric_sort_places_null_values_last() {
        let items = vec![
            located("p.Main", SymbolKind::RefClass, "p.Ref", None),
            located("p.Main", SymbolKind::Class, "p.Main", Some(5)),
        ];
        let pipeline = Pipeline {
            sorts: vec![Sort::Numeric],
            ..Default::default()
        };
        let out = pipeline.run(items);
        assert_eq!(out[0].0.symbol.name, "p.Main");
        assert_eq!(out[1].0.symbol.name, "p.Ref");
    }

    #[test]
    fn normal_display_pads_null_value_with_nine_spaces() {
        let symbol = Symbol {
            value: None,
            kind: SymbolKind::RefClass,
            visibility: Visibility::External,
            name: "p.Other".into(),
            expanded_name: None,
        };
        let rendered = normal_display(&symbol);
        assert!(rendered.starts_with(&" ".repeat(9)));
    }

    #[test]
    fn private_visibility_lowercases_kind_letter() {
        let symbol = Symbol {
            value: Some(1),
            kind: SymbolKind::Method,
            visibility: Visibility::Private,
            name: "p.Main.secret".into(),
            expanded_name: None,
        };
        assert!(is_private(crate::access_flags::ACC_PRIVATE));
        assert_eq!(normal_display(&symbol).chars().nth(9).unwrap(), 't');
    }
}
