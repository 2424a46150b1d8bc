use crate::error::{CourtError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Longest accepted entrant name, in characters
pub const MAX_NAME_LEN: usize = 20;

/// Trim an entrant name and check it is usable
pub fn normalize_entrant(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CourtError::InvalidEntrant("name is empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CourtError::InvalidEntrant(format!(
            "'{}' is longer than {} characters",
            trimmed, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Challengers waiting for the court, front = next to play
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(transparent)]
pub struct ChallengerQueue(Vec<String>);

impl ChallengerQueue {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from arrival order, keeping the first occurrence of each name
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queue = Self::new();
        for name in names {
            queue.append(name.into());
        }
        queue
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Add a new arrival, refusing names already waiting
    pub fn enqueue(&mut self, name: String) -> Result<()> {
        if self.contains(&name) {
            return Err(CourtError::DuplicateEntrant { name });
        }
        self.0.push(name);
        Ok(())
    }

    /// Send a player to the back of the line; a name already waiting keeps its place
    pub fn append(&mut self, name: String) {
        if name.is_empty() || self.contains(&name) {
            return;
        }
        self.0.push(name);
    }

    pub fn pop_front(&mut self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.remove(0))
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|n| n == name)?;
        Some(self.0.remove(idx))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entrant() {
        assert_eq!(normalize_entrant("  Lakers ").unwrap(), "Lakers");
        assert!(matches!(normalize_entrant("   "), Err(CourtError::InvalidEntrant(_))));
        assert!(normalize_entrant(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(normalize_entrant(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = ChallengerQueue::new();
        queue.enqueue("C".into()).unwrap();
        queue.enqueue("D".into()).unwrap();
        queue.append("E".into());

        assert_eq!(queue.pop_front().as_deref(), Some("C"));
        assert_eq!(queue.pop_front().as_deref(), Some("D"));
        assert_eq!(queue.pop_front().as_deref(), Some("E"));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_no_duplicates() {
        let mut queue = ChallengerQueue::from_names(["A", "B", "A"]);
        assert_eq!(queue.len(), 2);

        let err = queue.enqueue("B".into()).unwrap_err();
        assert!(matches!(err, CourtError::DuplicateEntrant { .. }));

        queue.append("A".into());
        assert_eq!(queue.names(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut queue = ChallengerQueue::from_names(["A", "B", "C"]);
        assert_eq!(queue.remove("B").as_deref(), Some("B"));
        assert_eq!(queue.remove("Z"), None);
        assert_eq!(queue.remove_at(1).as_deref(), Some("C"));
        assert_eq!(queue.remove_at(5), None);
        assert_eq!(queue.names(), &["A".to_string()]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let queue = ChallengerQueue::from_names(["A", "B"]);
        assert_eq!(serde_json::to_string(&queue).unwrap(), r#"["A","B"]"#);
    }
}
