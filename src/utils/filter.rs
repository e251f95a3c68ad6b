use crate::utils::data_path::{get_prop_value, is_prop_exists};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Exists,
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub prop_name: String,
    pub prop_value: Option<String>,
}

/// OR-groups of AND-conditions parsed from `a==1&&b!=2||c`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsFilter {
    groups: Vec<Vec<FilterCondition>>,
}

const QUOTES: &[char] = &['"', '\''];

fn clean_token(raw: &str) -> String {
    raw.trim().trim_matches(QUOTES).to_string()
}

impl ItemsFilter {
    pub fn parse(filter: &str) -> Self {
        if filter.is_empty() {
            return Self::default();
        }
        let groups = filter
            .split("||")
            .map(|group| group.split("&&").map(parse_condition).collect())
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<FilterCondition>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn matches(&self, item: &Value) -> bool {
        if self.groups.is_empty() {
            return true;
        }
        self.groups
            .iter()
            .any(|group| group.iter().all(|condition| condition.matches(item)))
    }
}

fn parse_condition(raw: &str) -> FilterCondition {
    let operator = if raw.contains("==") {
        FilterOperator::Equals
    } else if raw.contains("!=") {
        FilterOperator::NotEquals
    } else {
        FilterOperator::Exists
    };

    let separator = match operator {
        FilterOperator::Equals => "==",
        FilterOperator::NotEquals => "!=",
        FilterOperator::Exists => {
            return FilterCondition {
                operator,
                prop_name: clean_token(raw),
                prop_value: None,
            };
        }
    };

    let mut parts = raw.split(separator);
    let name = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default();
    FilterCondition {
        operator,
        prop_name: clean_token(name),
        prop_value: Some(clean_token(value)),
    }
}

impl FilterCondition {
    pub fn matches(&self, item: &Value) -> bool {
        if !is_prop_exists(item, &self.prop_name) {
            return false;
        }
        let expected = self.prop_value.as_deref().unwrap_or_default();
        match self.operator {
            FilterOperator::Exists => true,
            FilterOperator::Equals => loose_eq(&get_prop_value(item, &self.prop_name, None), expected),
            FilterOperator::NotEquals => {
                !loose_eq(&get_prop_value(item, &self.prop_name, None), expected)
            }
        }
    }
}

/// Loose comparison of a stored value against a filter literal.
pub fn loose_eq(value: &Value, literal: &str) -> bool {
    match value {
        Value::String(text) => text == literal,
        Value::Number(number) => match literal.trim().parse::<f64>() {
            Ok(parsed) => number.as_f64() == Some(parsed),
            Err(_) => number.to_string() == literal,
        },
        Value::Bool(flag) => *flag == !(literal.is_empty() || literal == "0"),
        Value::Null => literal.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
