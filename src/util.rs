pub fn compare_f64(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

pub trait VecExt
where
    Self: Sized,
{
    fn partition_by_index<F>(&self, predicate: F) -> (Self, Self)
    where
        F: FnMut(usize) -> bool;
}

impl<T: Clone> VecExt for Vec<T> {
    fn partition_by_index<F>(&self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(usize) -> bool,
    {
        let mut left = vec![];
        let mut right = vec![];
        for (i, item) in self.iter().enumerate() {
            if predicate(i) {
                left.push(item.clone());
            } else {
                right.push(item.clone());
            }
        }
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_order() {
        let v = vec!['a', 'b', 'c', 'd', 'e'];
        let (left, right) = v.partition_by_index(|i| i % 2 == 0);
        assert_eq!(left, vec!['a', 'c', 'e']);
        assert_eq!(right, vec!['b', 'd']);
    }

    #[test]
    fn compare_treats_nan_as_equal() {
        use std::cmp::Ordering;
        assert_eq!(compare_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(compare_f64(f64::NAN, 2.0), Ordering::Equal);
    }
}
