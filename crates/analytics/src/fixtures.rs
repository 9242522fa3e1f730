use backlog_indexer::{BacklogConfig, EntityBuilder, ItemIndex};
use backlog_outline::OutlineParser;
use chrono::{NaiveDate, NaiveDateTime};

pub(crate) fn index_of(docs: &[(&str, &str)]) -> ItemIndex {
    let builder = EntityBuilder::new(&BacklogConfig::default()).unwrap();
    let parser = OutlineParser::default();
    let mut index = ItemIndex::default();
    for (file, text) in docs {
        index.add(builder.build(&parser.parse_str(text, file), file));
    }
    index
}

pub(crate) fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap()
}

/// A done item closed on the given day
pub(crate) fn done(id: &str, day: &str, effort: &str) -> String {
    format!(
        "* DONE {id} finished\nCLOSED: [{day} 12:00]\n:PROPERTIES:\n:EFFORT: {effort}\n:END:\n"
    )
}
