/// Indices of every element equal to `target`, in ascending order.
pub fn which<T: PartialEq>(items: &[T], target: &T) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| *item == target)
        .map(|(index, _)| index)
        .collect()
}
