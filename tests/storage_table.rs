mod common;
use common::temp_dir;

use ddtools::services::db_driver::{DbDriver, SqliteDriver};
use ddtools::services::db_table::{DbTable, TableParams};
use ddtools::services::storage::{
    ItemsAddParams, ItemsDeleteParams, ItemsGetOneParams, ItemsGetParams, ItemsUpdateOneParams,
    ItemsUpdateParams, Storage,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn memory_driver() -> Arc<dyn DbDriver> {
    Arc::new(SqliteDriver::in_memory("test_").expect("driver"))
}

fn people(driver: Arc<dyn DbDriver>) -> DbTable {
    DbTable::new(
        driver,
        TableParams {
            name_alias: "people".to_string(),
            columns: vec![
                json!("name"),
                json!("role"),
                json!({"name": "code", "isComparedCaseSensitive": true}),
                json!({"name": "bio", "isTagsAllowed": true}),
            ],
        },
    )
    .expect("table")
}

fn seed(table: &DbTable) -> Vec<Value> {
    table
        .items_add(ItemsAddParams {
            items: json!([
                {"id": 99, "name": "Ann", "role": "admin", "code": "A1", "extra": "dropped"},
                {"name": "Bob", "role": "user", "code": "b2"},
                {"name": "<i>Cid</i>", "role": "user", "code": "C3", "bio": "<b>hi</b>"},
            ]),
        })
        .expect("add")
}

#[test]
fn add_drops_id_and_unknown_columns() {
    let table = people(memory_driver());
    let added = seed(&table);
    assert_eq!(added.len(), 3);
    assert_eq!(added[0], json!({"name": "Ann", "role": "admin", "code": "A1", "id": 1}));
    assert_eq!(added[2]["name"], "<i>Cid</i>");

    let stored = table
        .items_get_one(ItemsGetOneParams {
            where_clause: json!({"id": 3}),
            ..ItemsGetOneParams::default()
        })
        .unwrap();
    assert_eq!(stored["name"], "Cid");
    assert_eq!(stored["bio"], "<b>hi</b>");
}

#[test]
fn add_skips_items_without_declared_columns() {
    let table = people(memory_driver());
    let added = table
        .items_add(ItemsAddParams {
            items: json!([{"bogus": 1}, {"id": 99}, {"name": "Eve"}]),
        })
        .unwrap();
    assert_eq!(added, vec![json!({"name": "Eve", "id": 1})]);

    let rows = table
        .items_get(ItemsGetParams {
            props_to_return: json!(["id", "name"]),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(rows, json!([{"id": 1, "name": "Eve"}]));
    assert_eq!(table.items_add_one(json!({"extra": true})).unwrap(), None);
}

#[test]
fn where_mapping_and_case_sensitivity() {
    let table = people(memory_driver());
    seed(&table);

    let admins = table
        .items_get(ItemsGetParams {
            where_clause: json!({"role": "ADMIN"}),
            props_to_return: json!("name"),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(admins, json!([{"name": "Ann"}]));

    let exact = table
        .items_get(ItemsGetParams {
            where_clause: json!({"code": "a1"}),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(exact, json!([]));

    let either = table
        .items_get(ItemsGetParams {
            where_clause: json!({"name": ["Ann", "Bob"], "missing": "x"}),
            props_to_return: json!(["id"]),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(either, json!([{"id": 1}, {"id": 2}]));
}

#[test]
fn keyed_results_limit_and_offset() {
    let table = people(memory_driver());
    seed(&table);

    let keyed = table
        .items_get(ItemsGetParams {
            order_by: "\"id\" ASC".to_string(),
            prop_as_result_key: Some("id".to_string()),
            prop_as_result_value: Some("role".to_string()),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(keyed, json!({"1": "admin", "2": "user", "3": "user"}));

    let page = table
        .items_get(ItemsGetParams {
            order_by: "\"id\" ASC".to_string(),
            props_to_return: json!("id"),
            limit: 1,
            offset: 1,
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(page, json!([{"id": 2}]));

    let nothing = table
        .items_get(ItemsGetParams {
            props_to_return: json!("nope"),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(nothing, json!([]));
}

#[test]
fn update_skips_read_only_and_reports_ids() {
    let table = people(memory_driver());
    seed(&table);

    let updated = table
        .items_update(ItemsUpdateParams {
            where_clause: json!({"role": "user"}),
            data: json!({"id": 50, "role": "staff", "junk": 1}),
            ..ItemsUpdateParams::default()
        })
        .unwrap();
    assert_eq!(
        updated,
        vec![json!({"id": 2, "role": "staff"}), json!({"id": 3, "role": "staff"})]
    );

    let only_read_only = table
        .items_update(ItemsUpdateParams {
            data: json!({"id": 7}),
            ..ItemsUpdateParams::default()
        })
        .unwrap();
    assert!(only_read_only.is_empty());
}

#[test]
fn update_one_can_insert_when_missing() {
    let table = people(memory_driver());
    seed(&table);

    let untouched = table
        .items_update_one(ItemsUpdateOneParams {
            where_clause: json!({"name": "Dee"}),
            data: json!({"name": "Dee", "role": "guest"}),
            is_enabled_add_not_found: false,
        })
        .unwrap();
    assert_eq!(untouched, None);

    let inserted = table
        .items_update_one(ItemsUpdateOneParams {
            where_clause: json!({"name": "Dee"}),
            data: json!({"name": "Dee", "role": "guest"}),
            is_enabled_add_not_found: true,
        })
        .unwrap();
    assert_eq!(inserted, Some(json!({"name": "Dee", "role": "guest", "id": 4})));

    let first_user = table
        .items_update_one(ItemsUpdateOneParams {
            where_clause: json!("role = 'user'"),
            data: json!({"role": "lead"}),
            ..ItemsUpdateOneParams::default()
        })
        .unwrap();
    assert_eq!(first_user, Some(json!({"id": 2, "role": "lead"})));
}

#[test]
fn delete_one_and_delete_all() {
    let table = people(memory_driver());
    seed(&table);

    table
        .items_delete_one(ItemsDeleteParams {
            where_clause: json!({"role": "user"}),
            order_by: "\"id\" DESC".to_string(),
            ..ItemsDeleteParams::default()
        })
        .unwrap();
    let names = table
        .items_get(ItemsGetParams {
            props_to_return: json!("name"),
            order_by: "\"id\"".to_string(),
            ..ItemsGetParams::default()
        })
        .unwrap();
    assert_eq!(names, json!([{"name": "Ann"}, {"name": "Bob"}]));

    table.items_delete(ItemsDeleteParams::default()).unwrap();
    let fallback = table
        .items_get_one(ItemsGetOneParams {
            not_found_result: json!("empty"),
            ..ItemsGetOneParams::default()
        })
        .unwrap();
    assert_eq!(fallback, json!("empty"));
}

#[test]
fn reopening_adds_missing_columns() {
    let root = temp_dir("ddtools-table-schema");
    let path = root.join("schema.sqlite");
    {
        let driver: Arc<dyn DbDriver> = Arc::new(SqliteDriver::open(&path, "test_").unwrap());
        let table = DbTable::new(
            driver,
            TableParams {
                name_alias: "notes".to_string(),
                columns: vec![json!("title")],
            },
        )
        .unwrap();
        table.items_add_one(json!({"title": "first"})).unwrap();
    }

    let driver: Arc<dyn DbDriver> = Arc::new(SqliteDriver::open(&path, "test_").unwrap());
    let table = DbTable::new(
        driver.clone(),
        TableParams {
            name_alias: "notes".to_string(),
            columns: vec![json!("title"), json!("body")],
        },
    )
    .unwrap();
    assert_eq!(
        driver.column_names(table.name_full()).unwrap(),
        vec!["id", "title", "body"]
    );
    let note = table
        .items_get_one(ItemsGetOneParams::default())
        .unwrap();
    assert_eq!(note, json!({"id": 1, "title": "first", "body": null}));

    let _ = std::fs::remove_dir_all(root);
}
