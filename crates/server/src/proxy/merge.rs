//! Merging of heterogeneous upstream response bodies into one array.
//!
//! Partner APIs disagree on where the records live: Shopify wraps them in
//! `products`, `orders` or `shop`, other APIs use `items`, a bare array or a
//! `message`. The shape is sniffed per page; none of it is a stable contract.

use serde_json::{Map, Value, json};

/// Which branch a page body was merged through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    Products,
    Items,
    Array,
    Shop,
    Message,
    Orders,
    Unrecognized,
}

impl PageShape {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Items => "items",
            Self::Array => "array",
            Self::Shop => "shop",
            Self::Message => "message",
            Self::Orders => "orders",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// JavaScript truthiness, which the branch order below was written against.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| is_truthy(v))
}

/// Append `value`'s elements when it is an array, otherwise the value itself.
///
/// A non-array `products`/`items` is kept whole: a string is not split into
/// characters and an object does not fail the call.
fn extend_or_push(acc: &mut Vec<Value>, value: Value) {
    match value {
        Value::Array(items) => acc.extend(items),
        other => acc.push(other),
    }
}

/// Reduce a Shopify order to the fields the dashboard lists.
fn project_order(order: &Value) -> Value {
    json!({
        "id": order.get("id").cloned().unwrap_or(Value::Null),
        "createdAt": order.get("created_at").cloned().unwrap_or(Value::Null),
        "total": order.get("total_price").cloned().unwrap_or(Value::Null),
    })
}

/// Merge one page body into `acc`, returning the branch taken.
///
/// Checked in order: `products`, `items`, top-level array, `shop`, `message`,
/// `orders` (array only). Anything else appends nothing.
pub fn merge_page(acc: &mut Vec<Value>, body: Value) -> PageShape {
    let mut object = match body {
        Value::Array(items) => {
            acc.extend(items);
            return PageShape::Array;
        }
        Value::Object(object) => object,
        _ => return PageShape::Unrecognized,
    };

    if truthy_field(&object, "products").is_some() {
        if let Some(products) = object.remove("products") {
            extend_or_push(acc, products);
        }
        return PageShape::Products;
    }

    if truthy_field(&object, "items").is_some() {
        if let Some(items) = object.remove("items") {
            extend_or_push(acc, items);
        }
        return PageShape::Items;
    }

    if truthy_field(&object, "shop").is_some() {
        if let Some(shop) = object.remove("shop") {
            acc.push(shop);
        }
        return PageShape::Shop;
    }

    if truthy_field(&object, "message").is_some() {
        if let Some(message) = object.remove("message") {
            acc.push(message);
        }
        return PageShape::Message;
    }

    if let Some(Value::Array(orders)) = object.get("orders") {
        acc.extend(orders.iter().map(project_order));
        return PageShape::Orders;
    }

    PageShape::Unrecognized
}
