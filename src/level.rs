/// How deeply the user has explored a city. The discriminants are the wire
/// format: the progress record stores them as integers, and ordering
/// comparisons (e.g. "any level above Untouched counts as lit") rely on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TravelLevel {
    #[default]
    Untouched = 0,
    Passed = 1,
    Visited = 2,
    Lived = 3,
}

impl TravelLevel {
    pub const ALL: [TravelLevel; 4] = [
        TravelLevel::Untouched,
        TravelLevel::Passed,
        TravelLevel::Visited,
        TravelLevel::Lived,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of `ordinal`. Out-of-range values come from hand-edited or
    /// corrupted progress records and are rejected here.
    pub fn from_ordinal(ord: u8) -> Option<Self> {
        match ord {
            0 => Some(TravelLevel::Untouched),
            1 => Some(TravelLevel::Passed),
            2 => Some(TravelLevel::Visited),
            3 => Some(TravelLevel::Lived),
            _ => None,
        }
    }

    /// Score weight for the cumulative travel score.
    pub fn score(self) -> u32 {
        match self {
            TravelLevel::Untouched => 0,
            TravelLevel::Passed => 10,
            TravelLevel::Visited => 30,
            TravelLevel::Lived => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TravelLevel::Untouched => "未涉足",
            TravelLevel::Passed => "路过",
            TravelLevel::Visited => "游玩",
            TravelLevel::Lived => "长住",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_round_trip() {
        for level in TravelLevel::ALL {
            assert_eq!(TravelLevel::from_ordinal(level.ordinal()), Some(level));
        }
        assert_eq!(TravelLevel::from_ordinal(4), None);
        assert_eq!(TravelLevel::from_ordinal(255), None);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(TravelLevel::Untouched < TravelLevel::Passed);
        assert!(TravelLevel::Passed < TravelLevel::Visited);
        assert!(TravelLevel::Visited < TravelLevel::Lived);
    }
}
