/// An item paired with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f32,
}

impl<T> Scored<T> {
    pub fn new(item: T, score: f32) -> Self { Self { item, score } }
}

/// Order by score descending, drop non-positive scores, keep at most `k`.
///
/// The sort is stable: equal scores keep their input (ingestion) order.
pub fn rank<T>(mut scored: Vec<Scored<T>>, k: usize) -> Vec<Scored<T>> {
    scored.retain(|s| s.score.is_finite() && s.score > 0.0);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_input_order() {
        let input = vec![
            Scored::new("a", 1.0),
            Scored::new("b", 2.0),
            Scored::new("c", 1.0),
            Scored::new("d", 0.0),
        ];
        let out: Vec<_> = rank(input, 10).into_iter().map(|s| s.item).collect();
        assert_eq!(out, vec!["b", "a", "c"]);
    }

    #[test]
    fn truncates_to_k() {
        let input = (1..=5).map(|i| Scored::new(i, i as f32)).collect();
        let out: Vec<_> = rank(input, 2).into_iter().map(|s| s.item).collect();
        assert_eq!(out, vec![5, 4]);
        assert!(rank(vec![Scored::new(1, 1.0)], 0).is_empty());
    }
}
