//! Per-source header registry: column index to stable display name.

/// Ordered column names, grown lazily as wider lines are seen.
///
/// A name is either declared from the header line or generated from the
/// index. Once assigned it never changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderRegistry {
    names: Vec<String>,
}

impl HeaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a header-line name at `index`.
    ///
    /// Unseen positions below `index` get generated names. An empty name is
    /// replaced by the stringified index. A position that already holds a
    /// name keeps it.
    pub fn declare(&mut self, index: usize, name: &str) {
        if index < self.names.len() {
            return;
        }
        self.fill_to(index);
        let name = if name.is_empty() { index.to_string() } else { name.to_string() };
        self.names.push(name);
    }

    /// Name for `index`, generating names for every newly reached position.
    pub fn name_for(&mut self, index: usize) -> &str {
        if index >= self.names.len() {
            self.fill_to(index + 1);
        }
        &self.names[index]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn fill_to(&mut self, len: usize) {
        while self.names.len() < len {
            self.names.push(self.names.len().to_string());
        }
    }
}
