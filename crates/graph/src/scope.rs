use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Category,
    Checkpoint,
}

/// A heading that opens a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMarker {
    pub kind: ScopeKind,
    pub id: String,
    pub line: usize,
    pub level: usize,
}

/// A resolved enclosing scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub id: String,
    pub line: usize,
    pub level: usize,
}

impl From<&ScopeMarker> for ScopeEntry {
    fn from(marker: &ScopeMarker) -> Self {
        Self {
            id: marker.id.clone(),
            line: marker.line,
            level: marker.level,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub category: Option<ScopeEntry>,
    pub checkpoint: Option<ScopeEntry>,
}

/// Category/checkpoint boundaries of one document, in line order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMap {
    markers: Vec<ScopeMarker>,
}

impl ScopeMap {
    pub fn new(mut markers: Vec<ScopeMarker>) -> Self {
        markers.sort_by_key(|m| m.line);
        Self { markers }
    }

    pub fn markers(&self) -> &[ScopeMarker] {
        &self.markers
    }

    /// Nearest category and checkpoint starting at or before `line`.
    ///
    /// A category heading resets the checkpoint scope. Lines before the
    /// first category resolve to no category.
    pub fn resolve(&self, line: usize) -> Scope {
        let mut scope = Scope::default();
        for marker in self.markers.iter().take_while(|m| m.line <= line) {
            match marker.kind {
                ScopeKind::Category => {
                    scope.category = Some(marker.into());
                    scope.checkpoint = None;
                }
                ScopeKind::Checkpoint => scope.checkpoint = Some(marker.into()),
            }
        }
        scope
    }

    /// Like [`ScopeMap::resolve`], but a checkpoint only encloses headings
    /// strictly deeper than itself; same-level siblings are not children.
    pub fn resolve_heading(&self, line: usize, level: usize) -> Scope {
        let mut scope = self.resolve(line);
        if scope
            .checkpoint
            .as_ref()
            .is_some_and(|chk| level <= chk.level)
        {
            scope.checkpoint = None;
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn marker(kind: ScopeKind, id: &str, line: usize, level: usize) -> ScopeMarker {
        ScopeMarker {
            kind,
            id: id.to_string(),
            line,
            level,
        }
    }

    fn sample() -> ScopeMap {
        ScopeMap::new(vec![
            marker(ScopeKind::Checkpoint, "CHK-001-02", 40, 2),
            marker(ScopeKind::Category, "PROJ-001", 3, 1),
            marker(ScopeKind::Checkpoint, "CHK-001-01", 10, 2),
            marker(ScopeKind::Category, "PROJ-002", 60, 1),
        ])
    }

    #[test]
    fn line_before_first_category_has_no_parent() {
        assert_eq!(sample().resolve(1), Scope::default());
    }

    #[test]
    fn resolves_nearest_category_and_checkpoint() {
        let map = sample();
        let scope = map.resolve(20);
        assert_eq!(scope.category.map(|c| c.id), Some("PROJ-001".to_string()));
        assert_eq!(scope.checkpoint.map(|c| c.id), Some("CHK-001-01".to_string()));

        let scope = map.resolve(45);
        assert_eq!(scope.checkpoint.map(|c| c.id), Some("CHK-001-02".to_string()));
    }

    #[test]
    fn between_category_and_first_checkpoint() {
        let scope = sample().resolve(5);
        assert_eq!(scope.category.map(|c| c.id), Some("PROJ-001".to_string()));
        assert_eq!(scope.checkpoint, None);
    }

    #[test]
    fn new_category_resets_checkpoint() {
        let scope = sample().resolve(70);
        assert_eq!(scope.category.map(|c| c.id), Some("PROJ-002".to_string()));
        assert_eq!(scope.checkpoint, None);
    }

    #[test]
    fn boundary_line_belongs_to_new_scope() {
        let scope = sample().resolve(10);
        assert_eq!(scope.checkpoint.map(|c| c.line), Some(10));
    }

    #[test]
    fn sibling_heading_is_not_a_checkpoint_child() {
        let map = sample();
        assert_eq!(map.resolve_heading(20, 2).checkpoint, None);
        assert_eq!(
            map.resolve_heading(20, 3).checkpoint.map(|c| c.id),
            Some("CHK-001-01".to_string())
        );
        assert_eq!(
            map.resolve_heading(20, 2).category.map(|c| c.id),
            Some("PROJ-001".to_string())
        );
    }
}
