/// Horizontal column offsets shared by every tabular row renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    offsets: Vec<f32>,
    widths: Vec<f32>,
}

impl ColumnLayout {
    /// `count` equal columns spanning `width` from `left`.
    pub fn even(left: f32, width: f32, count: usize) -> Self {
        let count = count.max(1);
        Self::weighted(left, width, &vec![1.0; count])
    }

    /// Columns proportional to `weights`, spanning `width` from `left`.
    pub fn weighted(left: f32, width: f32, weights: &[f32]) -> Self {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return Self {
                offsets: vec![left],
                widths: vec![width],
            };
        }
        let mut offsets = Vec::with_capacity(weights.len());
        let mut widths = Vec::with_capacity(weights.len());
        let mut x = left;
        for w in weights {
            let col_w = width * w.max(0.0) / total;
            offsets.push(x);
            widths.push(col_w);
            x += col_w;
        }
        Self { offsets, widths }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Left edge of column `i`; past the last column this is the right edge.
    pub fn x(&self, i: usize) -> f32 {
        match self.offsets.get(i) {
            Some(&x) => x,
            None => self.right(),
        }
    }

    pub fn width(&self, i: usize) -> f32 {
        self.widths.get(i).copied().unwrap_or(0.0)
    }

    pub fn right(&self) -> f32 {
        match (self.offsets.last(), self.widths.last()) {
            (Some(x), Some(w)) => x + w,
            _ => 0.0,
        }
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_columns_split_width() {
        let cols = ColumnLayout::even(16.0, 178.0, 2);
        assert_eq!(cols.offsets(), &[16.0, 105.0]);
        assert_eq!(cols.right(), 194.0);
    }

    #[test]
    fn weighted_columns_follow_weights() {
        let cols = ColumnLayout::weighted(0.0, 100.0, &[3.0, 1.0]);
        assert_eq!(cols.x(1), 75.0);
        assert_eq!(cols.width(1), 25.0);
        assert_eq!(cols.x(2), 100.0);
    }
}
