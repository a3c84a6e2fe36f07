//! Named algorithm families and their per-family selectors.

use super::{GuillotineLayouter, LayoutEngine, MaxRectsLayouter, OptimalLayouter, ShelfLayouter};
use crate::config::{AlgorithmFamily, FreeSpaceChooser, SplitStrategy};
use crate::error::{Result, SpriteMapperError};

impl AlgorithmFamily {
    /// Builds the engine for this family: Shelf has a single configuration,
    /// the others become a selector over every chooser (and splitter).
    pub fn layouter(&self) -> LayoutEngine {
        match self {
            AlgorithmFamily::Shelf => ShelfLayouter::new().into(),
            AlgorithmFamily::Guillotine => {
                let mut opt = OptimalLayouter::new();
                for chooser in FreeSpaceChooser::ALL {
                    for splitter in SplitStrategy::ALL {
                        opt.push(GuillotineLayouter::new(chooser, splitter));
                    }
                }
                opt.into()
            }
            AlgorithmFamily::MaxRects => {
                let mut opt = OptimalLayouter::new();
                for chooser in FreeSpaceChooser::ALL {
                    opt.push(MaxRectsLayouter::new(chooser));
                }
                opt.into()
            }
        }
    }
}

impl OptimalLayouter {
    /// Selector over the winners of each family, in the given order.
    pub fn for_families(families: &[AlgorithmFamily]) -> Self {
        let mut opt = Self::new();
        for family in families {
            opt.add_family(*family);
        }
        opt
    }

    /// Selector over all known families.
    pub fn all_families() -> Self {
        Self::for_families(&AlgorithmFamily::ALL)
    }

    pub fn add_family(&mut self, family: AlgorithmFamily) {
        self.push(family.layouter());
    }

    pub fn add_family_by_name(&mut self, name: &str) -> Result<()> {
        let family: AlgorithmFamily = name
            .parse()
            .map_err(|_| SpriteMapperError::UnknownAlgorithm(name.to_string()))?;
        self.add_family(family);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_sizes() {
        let count = |family: AlgorithmFamily| match family.layouter() {
            LayoutEngine::Optimal(o) => o.len(),
            _ => 1,
        };
        assert_eq!(count(AlgorithmFamily::Shelf), 1);
        assert_eq!(count(AlgorithmFamily::Guillotine), 24);
        assert_eq!(count(AlgorithmFamily::MaxRects), 4);
    }

    #[test]
    fn add_by_name_is_case_insensitive() {
        let mut opt = OptimalLayouter::new();
        opt.add_family_by_name("MaxRects").expect("known");
        opt.add_family_by_name("shelf").expect("known");
        assert_eq!(opt.len(), 2);
        let err = opt.add_family_by_name("skyline").unwrap_err();
        assert!(matches!(err, SpriteMapperError::UnknownAlgorithm(ref n) if n == "skyline"));
    }

    #[test]
    fn nested_selectors_carry_no_border() {
        let engine = AlgorithmFamily::Guillotine.layouter();
        let LayoutEngine::Optimal(o) = engine else {
            panic!("guillotine family is a selector");
        };
        assert_eq!(o.border(), 0);
        assert!(!o.power_of_two());
    }
}
