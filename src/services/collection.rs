use crate::utils::convert::{convert_type, scalar_to_string, to_json_string, values_of, ConvertType};
use crate::utils::data_path::get_prop_value;
use crate::utils::filter::ItemsFilter;
use crate::utils::merge::{extend, ExtendOptions};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::marker::PhantomData;

/// How a collection stores its items.
///
/// Every read of item data goes through `item_data` and every write through
/// `set_item_data`, so an adapter can keep typed records while the filter,
/// update and delete machinery keeps working on JSON.
pub trait ItemAdapter {
    type Item: Clone;

    fn from_value(value: Value) -> Self::Item;

    fn to_value(item: &Self::Item) -> Value;

    fn item_data(item: &Self::Item) -> Cow<'_, Value>;

    fn set_item_data(item: &mut Self::Item, data: Value);
}

/// Items kept as plain JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainItems;

impl ItemAdapter for PlainItems {
    type Item = Value;

    fn from_value(value: Value) -> Value {
        value
    }

    fn to_value(item: &Value) -> Value {
        item.clone()
    }

    fn item_data(item: &Value) -> Cow<'_, Value> {
        Cow::Borrowed(item)
    }

    fn set_item_data(item: &mut Value, data: Value) {
        *item = data;
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddItemsParams {
    /// Sequence, mapping (values are used) or a string convertible to either.
    pub items: Value,
    pub item_type: Option<ConvertType>,
}

#[derive(Debug, Clone, Default)]
pub struct GetItemsParams {
    pub filter: String,
    /// `0` means no limit.
    pub limit: usize,
    pub prop_as_result_key: Option<String>,
    pub prop_as_result_value: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateItemsParams {
    pub filter: String,
    pub data: Value,
    pub limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteItemsParams {
    pub filter: String,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct ConvertItemsParams {
    pub filter: String,
    pub item_type: ConvertType,
}

impl Default for ConvertItemsParams {
    fn default() -> Self {
        Self {
            filter: String::new(),
            item_type: ConvertType::ObjectStdClass,
        }
    }
}

pub struct ObjectCollection<A: ItemAdapter = PlainItems> {
    items: Vec<A::Item>,
    adapter: PhantomData<A>,
}

impl<A: ItemAdapter> Clone for ObjectCollection<A> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            adapter: PhantomData,
        }
    }
}

impl<A: ItemAdapter> Default for ObjectCollection<A> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            adapter: PhantomData,
        }
    }
}

impl<A: ItemAdapter> ObjectCollection<A> {
    pub fn new(params: AddItemsParams) -> Self {
        let mut collection = Self::default();
        collection.add_items(params);
        collection
    }

    pub fn set_items(&mut self, params: AddItemsParams) {
        self.items.clear();
        self.add_items(params);
    }

    pub fn add_items(&mut self, params: AddItemsParams) {
        if params.items.is_null() {
            return;
        }
        let items = match params.items {
            Value::Array(items) => items,
            other => values_of(convert_type(&other, ConvertType::ObjectArray)),
        };
        for item in items {
            let item = match params.item_type {
                Some(item_type) => convert_type(&item, item_type),
                None => item,
            };
            self.items.push(A::from_value(item));
        }
    }

    pub fn push(&mut self, item: A::Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[A::Item] {
        &self.items
    }

    /// Matching items in sequence order, at most `limit` of them (`0` = all).
    pub fn filtered(&self, filter: &ItemsFilter, limit: usize) -> Vec<&A::Item> {
        let matched = self
            .items
            .iter()
            .filter(|item| filter.matches(&A::item_data(item)));
        if limit > 0 {
            matched.take(limit).collect()
        } else {
            matched.collect()
        }
    }

    pub fn convert_items_type(&mut self, params: ConvertItemsParams) {
        let filter = ItemsFilter::parse(&params.filter);
        for item in self.items.iter_mut() {
            let converted = {
                let data = A::item_data(item);
                if !filter.matches(&data) {
                    continue;
                }
                convert_type(&data, params.item_type)
            };
            A::set_item_data(item, converted);
        }
    }

    /// Shallow-merges `data` into matching items. Returns the affected count.
    pub fn update_items(&mut self, params: UpdateItemsParams) -> usize {
        let filter = ItemsFilter::parse(&params.filter);
        let options = ExtendOptions::default();
        let mut affected = 0;
        for item in self.items.iter_mut() {
            let updated = {
                let data = A::item_data(item);
                if !filter.matches(&data) {
                    continue;
                }
                extend(&[data.into_owned(), params.data.clone()], &options)
            };
            A::set_item_data(item, updated);
            affected += 1;
            if affected == params.limit {
                break;
            }
        }
        affected
    }

    /// Sequence of matching items, or a mapping keyed by `prop_as_result_key`.
    pub fn get_items(&self, params: &GetItemsParams) -> Value {
        let filter = ItemsFilter::parse(&params.filter);
        let mut list = Vec::new();
        let mut keyed = Map::new();

        for item in self.filtered(&filter, params.limit) {
            let data = A::item_data(item);
            let result_item = match params.prop_as_result_value.as_deref() {
                Some(prop) => get_prop_value(&data, prop, None),
                None => A::to_value(item),
            };
            match params.prop_as_result_key.as_deref() {
                Some(prop) => {
                    let key = scalar_to_string(&get_prop_value(&data, prop, None));
                    keyed.insert(key, result_item);
                }
                None => list.push(result_item),
            }
        }

        if params.prop_as_result_key.is_some() {
            Value::Object(keyed)
        } else {
            Value::Array(list)
        }
    }

    pub fn get_one_item(&self, filter: &str, not_found_result: Option<Value>) -> Value {
        let parsed = ItemsFilter::parse(filter);
        match self.filtered(&parsed, 1).first() {
            Some(item) => A::to_value(item),
            None => not_found_result.unwrap_or(Value::Null),
        }
    }

    /// Removes matching items in sequence order. Returns the removed count.
    pub fn delete_items(&mut self, params: DeleteItemsParams) -> usize {
        let filter = ItemsFilter::parse(&params.filter);
        let mut removed = 0;
        self.items.retain(|item| {
            if params.limit > 0 && removed == params.limit {
                return true;
            }
            if filter.matches(&A::item_data(item)) {
                removed += 1;
                return false;
            }
            true
        });
        removed
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn to_array(&self) -> Value {
        Value::Array(self.items.iter().map(A::to_value).collect())
    }

    pub fn to_json(&self) -> String {
        to_json_string(&self.to_array())
    }
}
