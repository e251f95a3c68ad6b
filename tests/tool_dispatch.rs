mod common;
use common::{app_in, temp_dir};

use serde_json::json;

#[test]
fn objects_tool_accepts_camel_case_arguments() {
    let root = temp_dir("ddtools-dispatch-objects");
    let app = app_in(&root);

    let merged = app
        .handle(
            "objects",
            json!({
                "action": "extend",
                "objects": [{"a": {"x": 1}, "keep": "yes"}, {"a": {"y": 2}, "keep": ""}],
                "overwriteWithEmpty": false,
            }),
        )
        .unwrap();
    assert_eq!(merged, json!({"a": {"x": 1, "y": 2}, "keep": "yes"}));

    let exists = app
        .handle(
            "objects",
            json!({"action": "isPropExists", "object": [10, 20], "propName": "1"}),
        )
        .unwrap();
    assert_eq!(exists, json!(true));

    let unfolded = app
        .handle(
            "objects",
            json!({"action": "unfold", "object": {"a": {"b": 1}}, "keyPrefix": "p."}),
        )
        .unwrap();
    assert_eq!(unfolded, json!({"p.a.b": 1}));

    let converted = app
        .handle(
            "objects",
            json!({"action": "convertType", "object": "a=1&b[]=x", "type": "objectStdClass"}),
        )
        .unwrap();
    assert_eq!(converted, json!({"a": "1", "b": ["x"]}));
}

#[test]
fn collection_tool_filters_items() {
    let root = temp_dir("ddtools-dispatch-collection");
    let app = app_in(&root);
    let items = json!([
        {"id": 1, "status": "active", "age": 30},
        {"id": 2, "status": "active", "age": 0},
        {"id": 3, "status": "blocked", "vip": true},
    ]);

    let found = app
        .handle(
            "collection",
            json!({
                "action": "getItems",
                "items": items,
                "filter": "status==active&&age!=0||vip",
                "propAsResultKey": "id",
                "propAsResultValue": "status",
            }),
        )
        .unwrap();
    assert_eq!(found, json!({"1": "active", "3": "blocked"}));

    let count = app
        .handle("collection", json!({"action": "count", "items": items}))
        .unwrap();
    assert_eq!(count, json!(3));

    let remaining = app
        .handle(
            "collection",
            json!({"action": "delete", "items": items, "filter": "status==active", "limit": 1}),
        )
        .unwrap();
    assert_eq!(remaining["affected"], 1);
    assert_eq!(remaining["items"].as_array().unwrap().len(), 2);
}

#[test]
fn response_tool_builds_envelope() {
    let root = temp_dir("ddtools-dispatch-response");
    let app = app_in(&root);

    let built = app
        .handle(
            "response",
            json!({
                "action": "build",
                "meta": {"success": false},
                "message": {"content": "Nope"},
                "data": {"field": "name"},
            }),
        )
        .unwrap();
    assert_eq!(
        built,
        json!({
            "meta": {"success": false, "code": 400, "message": {"content": "Nope"}},
            "data": {"field": "name"},
        })
    );

    let err = app
        .handle("response", json!({"action": "build", "meta": {"code": "x"}}))
        .unwrap_err();
    assert_eq!(err.code, "INVALID_PARAMS");
}

#[test]
fn storage_tool_round_trip_through_registry() {
    let root = temp_dir("ddtools-dispatch-storage");
    let app = app_in(&root);
    let table = json!(["title", {"name": "state", "isComparedCaseSensitive": true}]);

    let added = app
        .handle(
            "storage",
            json!({
                "action": "items_add",
                "table": "posts",
                "columns": table,
                "items": [{"title": "One", "state": "draft"}, {"title": "Two", "state": "live"}],
            }),
        )
        .unwrap();
    assert_eq!(added.as_array().unwrap().len(), 2);
    assert!(root.join("ddtools.sqlite").exists());

    let live = app
        .handle(
            "storage",
            json!({
                "action": "items_getOne",
                "storage": "DB",
                "table": "posts",
                "columns": table,
                "where": {"state": "live"},
                "propsToReturn": "title",
            }),
        )
        .unwrap();
    assert_eq!(live, json!({"title": "Two"}));

    let err = app
        .handle(
            "storage",
            json!({"action": "items_get", "storage": "mongo", "table": "posts"}),
        )
        .unwrap_err();
    assert_eq!(err.message, "Storage “Mongo” not found.");
    assert_eq!(err.details.unwrap()["code"], 500);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn unknown_tool_and_action_are_reported() {
    let root = temp_dir("ddtools-dispatch-unknown");
    let app = app_in(&root);

    let err = app.handle("colection", json!({})).unwrap_err();
    assert_eq!(err.code, "NOT_FOUND");
    assert_eq!(err.details.unwrap()["did_you_mean"][0], "collection");

    let err = app
        .handle("cache", json!({"action": "purge"}))
        .unwrap_err();
    assert_eq!(err.message, "Unknown cache action: purge");

    let err = app.handle("objects", json!("not an object")).unwrap_err();
    assert_eq!(err.code, "INVALID_PARAMS");
}
