use diesel::table;

table! {
    cache_entries (key) {
        key -> Text,
        payload -> Binary,
    }
}
