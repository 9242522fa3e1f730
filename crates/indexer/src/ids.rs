use crate::config::BacklogConfig;
use crate::error::{IndexerError, Result};
use crate::index::ItemIndex;
use crate::patterns::{numeric_suffix, IdPatterns};

/// Next free `<PREFIX>-NNN` for a configured category prefix
pub fn next_category_id(index: &ItemIndex, config: &BacklogConfig, prefix: &str) -> Result<String> {
    let prefix = prefix.trim().trim_end_matches('-');
    if !config.category_prefixes.iter().any(|p| p == prefix) {
        return Err(IndexerError::UnknownPrefix(prefix.to_string()));
    }
    let max = index
        .categories()
        .iter()
        .filter_map(|c| numeric_suffix(&c.id, prefix))
        .max()
        .unwrap_or(0);
    let next = successor(max, || format!("{prefix}-{max}"))?;
    Ok(format!("{prefix}-{next:0width$}", width = config.id_width))
}

/// Next free `ITEM-NNN` across the whole index
pub fn next_item_id(index: &ItemIndex, config: &BacklogConfig) -> Result<String> {
    let max = index
        .items()
        .iter()
        .filter_map(|item| numeric_suffix(&item.id, "ITEM"))
        .max()
        .unwrap_or(0);
    let next = successor(max, || format!("ITEM-{max}"))?;
    Ok(format!("ITEM-{next:0width$}", width = config.id_width))
}

/// Next free `CHK-<category number>-NN` inside a category
pub fn next_checkpoint_id(index: &ItemIndex, config: &BacklogConfig, category_id: &str) -> Result<String> {
    let category = index
        .category(category_id.trim())
        .ok_or_else(|| IndexerError::CategoryNotFound(category_id.to_string()))?;
    let number = category
        .id
        .rsplit_once('-')
        .and_then(|(_, n)| n.parse::<u64>().ok())
        .ok_or_else(|| IndexerError::CategoryNotFound(category_id.to_string()))?;

    let max = index
        .checkpoints()
        .iter()
        .filter(|chk| chk.parent_number == Some(number))
        .filter_map(|chk| IdPatterns::checkpoint_sequence(&chk.id))
        .max()
        .unwrap_or(0);
    let next = successor(max, || format!("CHK-{number}-{max}"))?;
    Ok(format!(
        "CHK-{:0width$}-{:02}",
        number,
        next,
        width = config.id_width
    ))
}

fn successor(max: u64, last: impl FnOnce() -> String) -> Result<u64> {
    max.checked_add(1)
        .ok_or_else(|| IndexerError::IdSpaceExhausted(last()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityBuilder;
    use backlog_outline::OutlineParser;
    use pretty_assertions::assert_eq;

    fn index() -> ItemIndex {
        let text = "\
* PROJ-001 Parser
** CHK-001-01 Lexer
*** TODO ITEM-003 a
** CHK-001-04 Grammar
*** TODO ITEM-010-cleanup b
* PROJ-007 Later
* BUG-002 Crash
";
        let config = BacklogConfig::default();
        let doc = OutlineParser::default().parse_str(text, "projects/p.org");
        let mut index = ItemIndex::default();
        index.add(EntityBuilder::new(&config).unwrap().build(&doc, "projects/p.org"));
        index
    }

    #[test]
    fn category_ids() {
        let config = BacklogConfig::default();
        let index = index();
        assert_eq!(next_category_id(&index, &config, "PROJ").unwrap(), "PROJ-008");
        assert_eq!(next_category_id(&index, &config, "BUG-").unwrap(), "BUG-003");
        assert_eq!(next_category_id(&index, &config, "IMP").unwrap(), "IMP-001");
        assert!(matches!(
            next_category_id(&index, &config, "EPIC"),
            Err(IndexerError::UnknownPrefix(p)) if p == "EPIC"
        ));
    }

    #[test]
    fn item_ids_ignore_slugs() {
        let config = BacklogConfig::default();
        assert_eq!(next_item_id(&index(), &config).unwrap(), "ITEM-011");
        assert_eq!(next_item_id(&ItemIndex::default(), &config).unwrap(), "ITEM-001");
    }

    #[test]
    fn exhausted_numbering_is_an_error() {
        let config = BacklogConfig::default();
        let text = "\
* PROJ-18446744073709551615 Last
** CHK-18446744073709551615-18446744073709551615 Final
*** TODO ITEM-18446744073709551615 x
";
        let doc = OutlineParser::default().parse_str(text, "projects/max.org");
        let mut index = ItemIndex::default();
        index.add(EntityBuilder::new(&config).unwrap().build(&doc, "projects/max.org"));

        assert!(matches!(
            next_item_id(&index, &config),
            Err(IndexerError::IdSpaceExhausted(last)) if last == "ITEM-18446744073709551615"
        ));
        assert!(matches!(
            next_category_id(&index, &config, "PROJ"),
            Err(IndexerError::IdSpaceExhausted(_))
        ));
        assert!(matches!(
            next_checkpoint_id(&index, &config, "PROJ-18446744073709551615"),
            Err(IndexerError::IdSpaceExhausted(_))
        ));
    }

    #[test]
    fn checkpoint_ids() {
        let config = BacklogConfig::default();
        let index = index();
        assert_eq!(next_checkpoint_id(&index, &config, "PROJ-001").unwrap(), "CHK-001-05");
        assert_eq!(next_checkpoint_id(&index, &config, "PROJ-007").unwrap(), "CHK-007-01");
        assert!(matches!(
            next_checkpoint_id(&index, &config, "PROJ-099"),
            Err(IndexerError::CategoryNotFound(_))
        ));
    }
}
