//! Cross-view reconciliation of pins that share one electrical node.
//!
//! A microcontroller often exposes the same node (GND, RESET) on several
//! header positions. Each position is its own connector with its own label,
//! but the schematic draws all of them at the canonical pin's anchor and the
//! descriptor ties them together in one bus.

use indexmap::IndexMap;
use partgen_core::Error;
use serde::Serialize;
use tracing::debug;

use crate::catalog::PinCatalog;

/// Canonical pin name -> alias pin names, in catalog order.
pub type AliasMap = IndexMap<String, Vec<String>>;

/// Pins that are electrically the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bus {
    pub id: String,
    pub members: Vec<String>,
}

impl Bus {
    pub fn new(id: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            id: id.into(),
            members,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub aliases: AliasMap,
    pub buses: Vec<Bus>,
}

impl Reconciliation {
    /// Alias names drawn in addition to `canonical`; empty when it has none.
    #[must_use]
    pub fn aliases_of(&self, canonical: &str) -> &[String] {
        self.aliases
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn bus_of(&self, pin: &str) -> Option<&Bus> {
        self.buses.iter().find(|b| b.contains(pin))
    }
}

/// Build the alias map of `catalog` and merge it into the `declared` buses.
///
/// Alias targets must exist and must not be aliases themselves. Declared bus
/// members must name catalog pins. Bus ids, including the canonical-name ids
/// of buses created for alias groups, are unique.
pub fn reconcile(catalog: &PinCatalog, declared: &[Bus]) -> Result<Reconciliation, Error> {
    let mut aliases = AliasMap::new();
    for pin in catalog.pins(crate::catalog::RowSelection::All) {
        let (Some(name), Some(target)) = (pin.name(), pin.alias_target()) else {
            continue;
        };
        let canonical = catalog
            .find_pin(target)
            .ok_or_else(|| Error::UnresolvedAlias {
                from: name.to_string(),
                target: target.to_string(),
            })?;
        if canonical.is_alias() {
            return Err(Error::IllegalAliasChain {
                alias: name.to_string(),
                target: target.to_string(),
            });
        }
        aliases
            .entry(target.to_string())
            .or_default()
            .push(name.to_string());
    }

    for (i, bus) in declared.iter().enumerate() {
        if declared[..i].iter().any(|b| b.id == bus.id) {
            return Err(duplicate_bus(&bus.id));
        }
        if let Some(missing) = bus.members.iter().find(|m| catalog.find_pin(m).is_none()) {
            return Err(Error::UnresolvedAlias {
                from: bus.id.clone(),
                target: missing.clone(),
            });
        }
    }

    let mut buses: Vec<Bus> = declared.to_vec();
    for (canonical, names) in &aliases {
        match buses.iter_mut().find(|b| b.contains(canonical)) {
            Some(bus) => {
                for name in names {
                    if !bus.contains(name) {
                        bus.members.push(name.clone());
                    }
                }
            }
            None => {
                if buses.iter().any(|b| b.id == *canonical) {
                    return Err(duplicate_bus(canonical));
                }
                let mut members = Vec::with_capacity(names.len() + 1);
                members.push(canonical.clone());
                members.extend(names.iter().cloned());
                buses.push(Bus::new(canonical.clone(), members));
            }
        }
    }

    debug!(
        alias_groups = aliases.len(),
        buses = buses.len(),
        "reconciled pin catalog"
    );
    Ok(Reconciliation { aliases, buses })
}

fn duplicate_bus(id: &str) -> Error {
    Error::invalid_input(format!("bus \"{id}\""), "bus id used twice")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PinSpec, RowKind, SchematicSide};

    fn catalog(rows: Vec<(&str, Vec<PinSpec>)>) -> PinCatalog {
        let mut catalog = PinCatalog::new(3);
        for (i, (name, pins)) in rows.into_iter().enumerate() {
            catalog
                .register_row(name, RowKind::Pin, [0.0, i as f64], [1.0, 0.0], pins)
                .unwrap();
        }
        catalog
    }

    #[test]
    fn one_canonical_many_aliases() {
        let catalog = catalog(vec![
            (
                "upper",
                vec![
                    PinSpec::alias("GND-2", "GND"),
                    PinSpec::alias("GND-3", "GND"),
                ],
            ),
            ("lower", vec![PinSpec::at("GND", SchematicSide::Bottom, 5)]),
        ]);
        let rec = reconcile(&catalog, &[]).unwrap();
        assert_eq!(rec.aliases_of("GND"), ["GND-2", "GND-3"]);
        assert_eq!(rec.buses, [Bus::new("GND", vec!["GND".into(), "GND-2".into(), "GND-3".into()])]);
        assert!(rec.aliases_of("GND-2").is_empty());
    }

    #[test]
    fn alias_group_joins_declared_bus() {
        let catalog = catalog(vec![(
            "r",
            vec![
                PinSpec::at("GND", SchematicSide::Bottom, 1),
                PinSpec::at("AGND", SchematicSide::Bottom, 2),
                PinSpec::alias("GND-2", "GND"),
            ],
        )]);
        let declared = [Bus::new("ground", vec!["AGND".into(), "GND".into()])];
        let rec = reconcile(&catalog, &declared).unwrap();
        assert_eq!(rec.buses.len(), 1);
        assert_eq!(rec.buses[0].id, "ground");
        assert_eq!(rec.buses[0].members, ["AGND", "GND", "GND-2"]);
    }

    #[test]
    fn alias_chain_is_rejected() {
        let catalog = catalog(vec![(
            "r",
            vec![
                PinSpec::at("GND", SchematicSide::Bottom, 1),
                PinSpec::alias("GND-2", "GND"),
                PinSpec::alias("GND-3", "GND-2"),
            ],
        )]);
        let err = reconcile(&catalog, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::IllegalAliasChain {
                alias: "GND-3".into(),
                target: "GND-2".into()
            }
        );
    }

    #[test]
    fn declared_bus_with_unknown_member_fails() {
        let catalog = catalog(vec![("r", vec![PinSpec::named("A1")])]);
        let err = reconcile(&catalog, &[Bus::new("b", vec!["A1".into(), "A2".into()])]).unwrap_err();
        assert!(matches!(err, Error::UnresolvedAlias { ref target, .. } if target == "A2"));
    }

    #[test]
    fn duplicate_declared_ids_are_rejected() {
        let catalog = catalog(vec![(
            "r",
            vec![PinSpec::named("A"), PinSpec::named("B"), PinSpec::named("C")],
        )]);
        let declared = [
            Bus::new("x", vec!["A".into(), "B".into()]),
            Bus::new("x", vec!["B".into(), "C".into()]),
        ];
        let err = reconcile(&catalog, &declared).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref what, .. } if what == "bus \"x\""));
    }

    #[test]
    fn alias_bus_cannot_take_a_declared_id() {
        let catalog = catalog(vec![(
            "r",
            vec![
                PinSpec::at("VIN", SchematicSide::Top, 1),
                PinSpec::at("5V", SchematicSide::Top, 2),
                PinSpec::at("GND", SchematicSide::Bottom, 1),
                PinSpec::alias("GND-2", "GND"),
            ],
        )]);
        let declared = [Bus::new("GND", vec!["VIN".into(), "5V".into()])];
        let err = reconcile(&catalog, &declared).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref what, .. } if what == "bus \"GND\""));
    }
}
