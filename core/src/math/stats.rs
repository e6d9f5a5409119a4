pub struct SeriesStats;

impl SeriesStats {
    /// First occurrence of the maximum value, as `(index, value)`.
    pub fn peak(values: &[f64]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, &value) in values.iter().enumerate() {
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((index, value)),
            }
        }
        best
    }
}
