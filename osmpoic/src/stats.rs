use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub num_categories: usize,
    pub num_failed: usize,
    pub num_extracted: usize,
    pub num_retained: usize,
}

impl Stats {
    pub fn num_dropped(&self) -> usize {
        self.num_extracted - self.num_retained
    }
}

impl AddAssign for Stats {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.num_categories += other.num_categories;
        self.num_failed += other.num_failed;
        self.num_extracted += other.num_extracted;
        self.num_retained += other.num_retained;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            r#"Processed:
  categories:   {} ({} failed)
  nodes:        {} extracted
                {} retained
                {} dropped"#,
            self.num_categories,
            self.num_failed,
            self.num_extracted,
            self.num_retained,
            self.num_dropped()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accumulates_per_category_counts() {
        let mut stats = Stats::default();
        stats += Stats {
            num_categories: 1,
            num_failed: 0,
            num_extracted: 120,
            num_retained: 80,
        };
        stats += Stats {
            num_categories: 1,
            num_failed: 1,
            ..Default::default()
        };
        assert_eq!(stats.num_categories, 2);
        assert_eq!(stats.num_failed, 1);
        assert_eq!(stats.num_dropped(), 40);
    }
}
