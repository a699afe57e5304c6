//! Fragment generation from a known source sequence.

/// Every window of `size` characters, left to right.
///
/// Returns nothing when `size` is zero or longer than `source`, and when
/// `source` contains any non-ASCII character. Windows are taken over bytes.
pub fn sliding_window(source: &str, size: usize) -> Vec<&str> {
    if size == 0 || size > source.len() || !source.is_ascii() {
        return Vec::new();
    }
    (0..=source.len() - size)
        .map(|start| &source[start..start + size])
        .collect()
}

/// Whether every window of `size` occurs only once in `source`.
///
/// When this holds for `size - 1`, the windows of `size` reassemble
/// `source` exactly.
pub fn windows_are_unique(source: &str, size: usize) -> bool {
    let windows = sliding_window(source, size);
    let mut seen = std::collections::HashSet::with_capacity(windows.len());
    windows.into_iter().all(|window| seen.insert(window))
}
