use crate::rules::DEPENDENCY_CYCLE;
use backlog_graph::DependencyGraph;
use backlog_indexer::ItemIndex;
use backlog_protocol::{Finding, FindingDetail};

/// Graph over item ids, dependencies resolved through the index.
///
/// Unresolvable references are left out; `valid-depends` reports them.
pub(crate) fn dependency_graph(index: &ItemIndex) -> DependencyGraph {
    let entries = index
        .items()
        .iter()
        .filter(|item| !item.id.is_empty())
        .map(|item| {
            let deps: Vec<&str> = item
                .depends
                .iter()
                .filter_map(|dep| index.resolve(dep))
                .map(|target| target.id.as_str())
                .collect();
            (item.id.as_str(), deps)
        });
    DependencyGraph::from_dependencies(entries)
}

/// One error per cycle that touches an item accepted by `keep`
pub(crate) fn check_cycles(
    index: &ItemIndex,
    keep: impl Fn(&str) -> bool,
    out: &mut Vec<Finding>,
) {
    for cycle in dependency_graph(index).find_cycles() {
        let anchor = cycle
            .members()
            .iter()
            .filter_map(|id| index.item(id))
            .find(|item| keep(&item.file));
        let Some(anchor) = anchor else {
            continue;
        };
        out.push(Finding::Error(
            FindingDetail::new(
                &anchor.file,
                anchor.line,
                DEPENDENCY_CYCLE,
                format!("dependency cycle: {cycle}"),
            )
            .hint("remove one DEPENDS edge to break the cycle")
            .context(cycle.to_string()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_indexer::{BacklogConfig, EntityBuilder};
    use backlog_outline::OutlineParser;
    use pretty_assertions::assert_eq;

    fn index(text: &str) -> ItemIndex {
        let config = BacklogConfig::default();
        let doc = OutlineParser::default().parse_str(text, "projects/a.org");
        let mut index = ItemIndex::default();
        index.add(EntityBuilder::new(&config).unwrap().build(&doc, "projects/a.org"));
        index
    }

    #[test]
    fn qualified_references_become_plain_edges() {
        let index = index(
            "\
* PROJ-001 A
** TODO ITEM-001 a
:PROPERTIES:
:DEPENDS: PROJ-001:ITEM-002, ITEM-999
:END:
** TODO ITEM-002 b
:PROPERTIES:
:DEPENDS: ITEM-001
:END:
",
        );
        let graph = dependency_graph(&index);
        assert_eq!(graph.dependencies("ITEM-001").unwrap(), vec!["ITEM-002"]);

        let mut out = Vec::new();
        check_cycles(&index, |_| true, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].detail().line, 2);
        assert_eq!(
            out[0].detail().context.as_deref(),
            Some("ITEM-001 -> ITEM-002 -> ITEM-001")
        );
    }

    #[test]
    fn filtered_out_files_suppress_cycles() {
        let index = index("* TODO ITEM-001 a\n:PROPERTIES:\n:DEPENDS: ITEM-001\n:END:\n");
        let mut out = Vec::new();
        check_cycles(&index, |file| file == "other.org", &mut out);
        assert!(out.is_empty());
    }
}
