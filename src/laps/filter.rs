use std::collections::HashSet;

use super::{Compound, Lap, LapTable};

/// Narrows a lap table by compound and driver. An empty set means "no filter"
/// for that dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LapFilter {
    pub compounds: HashSet<Compound>,
    pub drivers: HashSet<String>,
}

impl LapFilter {
    pub fn new(
        compounds: impl IntoIterator<Item = Compound>,
        drivers: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            compounds: compounds.into_iter().collect(),
            drivers: drivers.into_iter().collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.compounds.is_empty() && self.drivers.is_empty()
    }

    pub fn matches(&self, lap: &Lap) -> bool {
        (self.compounds.is_empty() || self.compounds.contains(&lap.compound))
            && (self.drivers.is_empty() || self.drivers.contains(&lap.driver))
    }

    /// Returns the matching laps in their original order.
    pub fn apply(&self, table: &LapTable) -> LapTable {
        table.laps.iter().filter(|l| self.matches(l)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laps::test_support::lap;
    use proptest::prelude::*;

    fn sample_table() -> LapTable {
        LapTable::new(vec![
            lap("VER", "Red Bull Racing", Compound::Soft, 1, Some(90.)),
            lap("LEC", "Ferrari", Compound::Medium, 1, Some(90.5)),
            lap("VER", "Red Bull Racing", Compound::Medium, 2, Some(91.)),
            lap("LEC", "Ferrari", Compound::Hard, 2, None),
            lap("NOR", "McLaren", Compound::Soft, 1, Some(90.2)),
        ])
    }

    #[test]
    fn test_empty_filter_returns_table_unchanged() {
        let table = sample_table();
        let filter = LapFilter::default();
        assert!(filter.is_noop());
        assert_eq!(filter.apply(&table), table);
    }

    #[test]
    fn test_compound_and_driver_filters_intersect() {
        let filter = LapFilter::new([Compound::Medium], ["VER".to_string(), "LEC".to_string()]);
        let filtered = filter.apply(&sample_table());
        let keys: Vec<_> = filtered
            .iter()
            .map(|l| (l.driver.as_str(), l.lap_number))
            .collect();
        assert_eq!(keys, vec![("LEC", 1), ("VER", 2)]);
    }

    #[test]
    fn test_compound_only_filter_preserves_order() {
        let filter = LapFilter::new([Compound::Soft], Vec::<String>::new());
        let filtered = filter.apply(&sample_table());
        let drivers: Vec<_> = filtered.iter().map(|l| l.driver.as_str()).collect();
        assert_eq!(drivers, vec!["VER", "NOR"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_filter_is_idempotent(
            compound_mask in prop::collection::vec(any::<bool>(), 3),
            driver_mask in prop::collection::vec(any::<bool>(), 3),
        ) {
            let compounds = Compound::DRY
                .iter()
                .zip(&compound_mask)
                .filter(|(_, keep)| **keep)
                .map(|(c, _)| *c);
            let drivers = ["VER", "LEC", "NOR"]
                .iter()
                .zip(&driver_mask)
                .filter(|(_, keep)| **keep)
                .map(|(d, _)| d.to_string());
            let filter = LapFilter::new(compounds, drivers);

            let once = filter.apply(&sample_table());
            let twice = filter.apply(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
