//! Named deterministic scenarios

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in projection scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    Conservative,
    #[serde(rename = "Base Case")]
    BaseCase,
    Optimistic,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Conservative,
        ScenarioKind::BaseCase,
        ScenarioKind::Optimistic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Conservative => "Conservative",
            ScenarioKind::BaseCase => "Base Case",
            ScenarioKind::Optimistic => "Optimistic",
        }
    }

    fn index(&self) -> usize {
        match self {
            ScenarioKind::Conservative => 0,
            ScenarioKind::BaseCase => 1,
            ScenarioKind::Optimistic => 2,
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Conservative" => Ok(ScenarioKind::Conservative),
            "Base Case" | "Base" | "BaseCase" => Ok(ScenarioKind::BaseCase),
            "Optimistic" => Ok(ScenarioKind::Optimistic),
            other => Err(format!("Unknown scenario: {}", other)),
        }
    }
}

/// Annual growth and vacancy assumptions for one scenario (all fractions)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssumptions {
    pub rent_growth: f64,
    pub expense_growth: f64,
    pub vacancy_rate: f64,
}

/// One assumption triple per scenario, indexed by `ScenarioKind`
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    entries: [ScenarioAssumptions; 3],
}

impl ScenarioTable {
    pub fn new(
        conservative: ScenarioAssumptions,
        base_case: ScenarioAssumptions,
        optimistic: ScenarioAssumptions,
    ) -> Self {
        Self {
            entries: [conservative, base_case, optimistic],
        }
    }

    pub fn get(&self, kind: ScenarioKind) -> &ScenarioAssumptions {
        &self.entries[kind.index()]
    }

    pub fn set(&mut self, kind: ScenarioKind, assumptions: ScenarioAssumptions) {
        self.entries[kind.index()] = assumptions;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &ScenarioAssumptions)> {
        ScenarioKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

impl Default for ScenarioTable {
    fn default() -> Self {
        Self::new(
            ScenarioAssumptions {
                rent_growth: 0.02,
                expense_growth: 0.04,
                vacancy_rate: 0.08,
            },
            ScenarioAssumptions {
                rent_growth: 0.03,
                expense_growth: 0.03,
                vacancy_rate: 0.05,
            },
            ScenarioAssumptions {
                rent_growth: 0.04,
                expense_growth: 0.025,
                vacancy_rate: 0.03,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_round_trip() {
        for kind in ScenarioKind::ALL {
            assert_eq!(kind.name().parse::<ScenarioKind>().unwrap(), kind);
        }
        assert!("Pessimistic".parse::<ScenarioKind>().is_err());
    }

    #[test]
    fn test_default_triples_are_distinct() {
        let table = ScenarioTable::default();
        let c = table.get(ScenarioKind::Conservative);
        let b = table.get(ScenarioKind::BaseCase);
        let o = table.get(ScenarioKind::Optimistic);

        assert_ne!(c, b);
        assert_ne!(b, o);
        assert!(c.rent_growth < b.rent_growth && b.rent_growth < o.rent_growth);
        assert!(c.vacancy_rate > b.vacancy_rate && b.vacancy_rate > o.vacancy_rate);
        assert_eq!(b.vacancy_rate, 0.05);
    }

    #[test]
    fn test_set_overrides_entry() {
        let mut table = ScenarioTable::default();
        let custom = ScenarioAssumptions {
            rent_growth: 0.0,
            expense_growth: 0.0,
            vacancy_rate: 0.0,
        };
        table.set(ScenarioKind::Optimistic, custom);
        assert_eq!(*table.get(ScenarioKind::Optimistic), custom);
        assert_eq!(table.iter().count(), 3);
    }
}
