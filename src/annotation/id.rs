//! Per-page annotation IDs

use std::collections::HashSet;

use parking_lot::Mutex;

use super::AnnotationKind;

/// IDs already handed out on one page
///
/// Shared by the page's annotation tasks; check-and-insert happens under one
/// lock so concurrent callers never receive the same ID.
#[derive(Debug, Default)]
pub struct IdRegistry {
    seen: Mutex<HashSet<String>>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `{kind}-p{page}x{x}y{y}`, suffixing `-1`, `-2`, ... on collision
    ///
    /// `page` is 1-based; coordinates are truncated toward zero.
    pub fn assign(&self, kind: AnnotationKind, page: usize, x: f64, y: f64) -> String {
        let base = format!("{}-p{}x{}y{}", kind.as_str(), page, x as i64, y as i64);

        let mut seen = self.seen.lock();
        let mut id = base.clone();
        let mut n = 1;
        while seen.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        seen.insert(id.clone());
        id
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_collisions_get_suffixes_in_order() {
        let registry = IdRegistry::new();
        let ids: Vec<String> = (0..3)
            .map(|_| registry.assign(AnnotationKind::Highlight, 2, 72.9, 700.4))
            .collect();
        assert_eq!(ids, vec!["highlight-p2x72y700", "highlight-p2x72y700-1", "highlight-p2x72y700-2"]);
    }

    #[test]
    fn test_kind_and_page_distinguish() {
        let registry = IdRegistry::new();
        assert_eq!(registry.assign(AnnotationKind::Underline, 1, 10.0, 20.0), "underline-p1x10y20");
        assert_eq!(registry.assign(AnnotationKind::Strike, 1, 10.0, 20.0), "strike-p1x10y20");
        assert_eq!(registry.assign(AnnotationKind::Image, 1, 10.0, 20.0), "image-p1x10y20");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_negative_coordinates_truncate_toward_zero() {
        let registry = IdRegistry::new();
        assert_eq!(registry.assign(AnnotationKind::Text, 1, -3.7, 0.2), "text-p1x-3y0");
    }

    #[test]
    fn test_concurrent_assignment_is_unique() {
        let registry = Arc::new(IdRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| registry.assign(AnnotationKind::Highlight, 1, 1.0, 1.0))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id));
            }
        }
        assert_eq!(all.len(), 200);
        assert_eq!(registry.len(), 200);
    }
}
